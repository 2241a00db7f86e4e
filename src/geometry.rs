// Copyright (c) 2026 rezky_nightky

//! Grid layout derived from the surface size and a fixed row count.

/// Ratio of glyph size to cell size.
pub const FONT_SCALE: f32 = 0.85;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    pub size: SurfaceSize,
    pub rows: u16,
    pub cols: u16,
    pub cell_size: u32,
    pub font_size: u32,
    /// Top-left corner of the grid. The extra column makes the grid wider than the
    /// surface, so this is usually negative and the grid overhangs both edges evenly.
    pub origin_x: f32,
    pub origin_y: f32,
}

impl Geometry {
    pub fn new(size: SurfaceSize, rows: u16) -> Self {
        let rows = rows.max(1);
        let cell_size = size.height.div_ceil(rows as u32).max(1);
        let font_size = (cell_size as f32 * FONT_SCALE).round() as u32;
        let cols = (size.width / cell_size)
            .saturating_add(1)
            .min(u16::MAX as u32) as u16;

        let grid_w = cell_size as f32 * cols as f32;
        let grid_h = cell_size as f32 * rows as f32;

        Self {
            size,
            rows,
            cols,
            cell_size,
            font_size,
            origin_x: (size.width as f32 - grid_w) * 0.5,
            origin_y: (size.height as f32 - grid_h) * 0.5,
        }
    }

    /// Centre of the cell at (`col`, `row`) in surface pixels.
    pub fn cell_center(&self, col: u16, row: u16) -> (f32, f32) {
        let cell = self.cell_size as f32;
        (
            self.origin_x + col as f32 * cell + cell * 0.5,
            self.origin_y + row as f32 * cell + cell * 0.5,
        )
    }
}
