// Copyright (c) 2026 rezky_nightky

use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, CellKind};
use crate::geometry::SurfaceSize;
use crate::palette::{Rgb, Rgba};
use crate::surface::{Font, Rect, Surface, SurfaceError};

/// A glyph whose colour is this close to its background has faded out and is erased.
pub const FADE_EPSILON: u8 = 6;

const HALFWIDTH_KATAKANA_FIRST: u32 = 0xFF66;
const HALFWIDTH_KATAKANA_LEN: u32 = 56;

/// Single-cell glyph drawn in place of a double-width one when the font is one cell
/// wide. Always a half-width katakana, picked from the code point.
pub fn narrow_stand_in(glyph: char) -> char {
    let cp = HALFWIDTH_KATAKANA_FIRST + glyph as u32 % HALFWIDTH_KATAKANA_LEN;
    char::from_u32(cp).unwrap_or('0')
}

/// Character-cell surface: every terminal cell is one surface pixel.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    gen: u32,
    cell_gen: Vec<u32>,
    blank: Cell,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Rgb) -> Self {
        let len = width as usize * height as usize;
        let blank = Cell::blank_with_bg(bg);
        let gen = 1u32;
        Self {
            width,
            height,
            cells: vec![blank; len],
            gen,
            cell_gen: vec![gen; len],
            blank,
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    /// Solid repaint. Bumps the generation so every stale cell reads as blank.
    pub fn clear(&mut self, bg: Rgb) {
        self.blank = Cell::blank_with_bg(bg);
        self.gen = self.gen.wrapping_add(1);
        if self.gen == 0 {
            self.cell_gen.fill(0);
            self.gen = 1;
        }
        self.dirty_all = true;
        self.dirty.clear();
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
            self.dirty.clear();
            return;
        }

        for &i in &self.dirty {
            if let Some(v) = self.dirty_map.get_mut(i) {
                *v = false;
            }
        }
        self.dirty.clear();
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[cfg(test)]
    pub fn get(&self, x: u16, y: u16) -> Option<Cell> {
        self.index(x, y).map(|i| self.cell_at_index(i))
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        if self.cell_gen.get(i).copied() == Some(self.gen) {
            self.cells[i]
        } else {
            self.blank
        }
    }

    fn set_index(&mut self, i: usize, cell: Cell) {
        if i >= self.cells.len() || self.cell_at_index(i) == cell {
            return;
        }

        self.cells[i] = cell;
        self.cell_gen[i] = self.gen;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }

    fn erase_index(&mut self, i: usize) {
        let bg = self.cell_at_index(i).bg;
        self.set_index(i, Cell::blank_with_bg(bg));
    }

    /// Erases the other half of a double-width glyph touching (`x`, `y`) so that a
    /// write to this cell never leaves half a glyph behind.
    fn release_partner(&mut self, x: u16, y: u16) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        match self.cell_at_index(i).kind {
            CellKind::Narrow => {}
            CellKind::WideLead => {
                if let Some(j) = self.index(x.saturating_add(1), y) {
                    if self.cell_at_index(j).kind == CellKind::WideTrail {
                        self.erase_index(j);
                    }
                }
            }
            CellKind::WideTrail => {
                if let Some(j) = x.checked_sub(1).and_then(|px| self.index(px, y)) {
                    if self.cell_at_index(j).kind == CellKind::WideLead {
                        self.erase_index(j);
                    }
                }
            }
        }
    }

    /// Clamps a span of surface pixels to whole cells in `0..limit`.
    fn cell_span(start: f32, len: f32, limit: u16) -> Option<(u16, u16)> {
        if !start.is_finite() || !len.is_finite() || len <= 0.0 {
            return None;
        }
        let lo = start.max(0.0).floor();
        let hi = (start + len).min(limit as f32).ceil();
        if hi <= lo {
            return None;
        }
        Some((lo as u16, hi as u16))
    }
}

impl Surface for Frame {
    fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width as u32, self.height as u32)
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) -> Result<(), SurfaceError> {
        if self.size().is_empty() || color.a <= 0.0 {
            return Ok(());
        }
        let (Some((x0, x1)), Some((y0, y1))) = (
            Self::cell_span(rect.x, rect.w, self.width),
            Self::cell_span(rect.y, rect.h, self.height),
        ) else {
            return Ok(());
        };

        let covers_all = x0 == 0 && y0 == 0 && x1 == self.width && y1 == self.height;
        if color.a >= 1.0 && covers_all {
            self.clear(color.rgb);
            return Ok(());
        }

        for y in y0..y1 {
            for x in x0..x1 {
                let Some(i) = self.index(x, y) else {
                    continue;
                };
                let mut cell = self.cell_at_index(i);
                cell.bg = cell.bg.blend(color.rgb, color.a);
                if cell.is_blank() {
                    cell.fg = cell.bg;
                    self.set_index(i, cell);
                    continue;
                }

                cell.fg = cell.fg.blend(color.rgb, color.a);
                if cell.fg.max_channel_distance(cell.bg) <= FADE_EPSILON {
                    self.release_partner(x, y);
                    self.set_index(i, Cell::blank_with_bg(cell.bg));
                } else {
                    self.set_index(i, cell);
                }
            }
        }

        if covers_all {
            self.blank = Cell::blank_with_bg(self.blank.bg.blend(color.rgb, color.a));
        }
        Ok(())
    }

    fn fill_text(
        &mut self,
        glyph: char,
        x: f32,
        y: f32,
        font: &Font,
        color: Rgba,
    ) -> Result<(), SurfaceError> {
        font.validate()?;
        if self.size().is_empty() {
            return Ok(());
        }

        let (glyph, w): (char, u16) = match glyph.width() {
            Some(2) if font.size_px < 2 => (narrow_stand_in(glyph), 1),
            Some(2) => (glyph, 2),
            _ => (glyph, 1),
        };
        let lead = (x - w as f32 * 0.5 + 0.5).floor();
        let row = y.floor();
        if !lead.is_finite() || !row.is_finite() || lead < 0.0 || row < 0.0 {
            return Ok(());
        }
        if lead + w as f32 > self.width as f32 || row >= self.height as f32 {
            return Ok(());
        }
        let (lx, ly) = (lead as u16, row as u16);

        self.release_partner(lx, ly);
        if w == 2 {
            self.release_partner(lx + 1, ly);
        }

        let Some(i) = self.index(lx, ly) else {
            return Ok(());
        };
        let bg = self.cell_at_index(i).bg;
        let fg = bg.blend(color.rgb, color.a);
        let kind = if w == 2 {
            CellKind::WideLead
        } else {
            CellKind::Narrow
        };
        self.set_index(
            i,
            Cell {
                ch: glyph,
                fg,
                bg,
                bold: font.bold,
                kind,
            },
        );

        if w == 2 {
            if let Some(j) = self.index(lx + 1, ly) {
                self.set_index(
                    j,
                    Cell {
                        ch: ' ',
                        fg,
                        bg,
                        bold: font.bold,
                        kind: CellKind::WideTrail,
                    },
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Rgb = Rgb::new(12, 25, 0);
    const TEXT: Rgb = Rgb::new(128, 255, 0);

    fn font() -> Font {
        Font::bold("Arial", 1)
    }

    fn wide_font() -> Font {
        Font::bold("Arial", 2)
    }

    #[test]
    fn clear_makes_cells_effectively_blank() {
        let mut f = Frame::new(2, 2, BG);
        f.fill_text('x', 0.5, 0.5, &font(), TEXT.with_alpha(1.0))
            .unwrap();
        assert_eq!(f.get(0, 0).unwrap().ch, 'x');
        f.clear(BG);
        assert_eq!(f.get(0, 0).unwrap().ch, ' ');
    }

    #[test]
    fn glyph_lands_in_cell_containing_centre() {
        let mut f = Frame::new(4, 4, BG);
        f.fill_text('Q', 2.5, 1.5, &font(), TEXT.with_alpha(0.8))
            .unwrap();
        let c = f.get(2, 1).unwrap();
        assert_eq!(c.ch, 'Q');
        assert!(c.bold);
        assert_eq!(c.fg, BG.blend(TEXT, 0.8));
    }

    #[test]
    fn glyphs_outside_surface_are_clipped() {
        let mut f = Frame::new(4, 4, BG);
        f.clear_dirty();
        f.fill_text('Q', -3.0, 1.5, &font(), TEXT.with_alpha(0.8))
            .unwrap();
        f.fill_text('Q', 1.5, 9.5, &font(), TEXT.with_alpha(0.8))
            .unwrap();
        assert!(f.dirty_indices().is_empty());
    }

    #[test]
    fn translucent_fill_fades_glyph_until_erased() {
        let mut f = Frame::new(3, 3, BG);
        f.fill_text('Z', 1.5, 1.5, &font(), TEXT.with_alpha(0.8))
            .unwrap();
        let full = Rect::covering(f.size());

        f.fill_rect(full, BG.with_alpha(0.2)).unwrap();
        let once = f.get(1, 1).unwrap();
        assert_eq!(once.ch, 'Z');
        assert!(once.fg.max_channel_distance(BG) < BG.blend(TEXT, 0.8).max_channel_distance(BG));

        for _ in 0..40 {
            f.fill_rect(full, BG.with_alpha(0.2)).unwrap();
        }
        assert!(f.get(1, 1).unwrap().is_blank());
    }

    #[test]
    fn opaque_fill_erases_everything() {
        let mut f = Frame::new(3, 3, BG);
        f.fill_text('Z', 1.5, 1.5, &font(), TEXT.with_alpha(0.8))
            .unwrap();
        f.clear_dirty();
        f.fill_rect(Rect::covering(f.size()), Rgba::opaque(BG))
            .unwrap();
        assert!(f.is_dirty_all());
        assert!(f.get(1, 1).unwrap().is_blank());
    }

    #[test]
    fn wide_glyph_occupies_two_cells_and_breaks_cleanly() {
        let mut f = Frame::new(4, 1, BG);
        f.fill_text('ア', 2.0, 0.5, &wide_font(), TEXT.with_alpha(0.8))
            .unwrap();
        assert_eq!(f.get(1, 0).unwrap().kind, CellKind::WideLead);
        assert_eq!(f.get(2, 0).unwrap().kind, CellKind::WideTrail);

        f.fill_text('x', 2.5, 0.5, &font(), TEXT.with_alpha(0.8))
            .unwrap();
        assert!(f.get(1, 0).unwrap().is_blank());
        assert_eq!(f.get(2, 0).unwrap().ch, 'x');
    }

    #[test]
    fn wide_glyph_at_right_edge_is_clipped() {
        let mut f = Frame::new(2, 1, BG);
        f.fill_text('ア', 2.0, 0.5, &wide_font(), TEXT.with_alpha(0.8))
            .unwrap();
        assert!(f.get(1, 0).unwrap().is_blank());
    }

    #[test]
    fn one_cell_font_keeps_wide_glyphs_in_their_own_column() {
        let mut f = Frame::new(10, 24, BG);
        for x in [0.5, 3.5, 4.5] {
            f.fill_text('ア', x, 10.5, &font(), TEXT.with_alpha(0.8))
                .unwrap();
        }
        for x in [0, 3, 4] {
            let c = f.get(x, 10).unwrap();
            assert_eq!(c.kind, CellKind::Narrow);
            assert_eq!(c.ch, narrow_stand_in('ア'));
            assert_eq!(c.ch.width(), Some(1));
        }
        assert!(f.get(1, 10).unwrap().is_blank());
        assert!(f.get(5, 10).unwrap().is_blank());
    }

    #[test]
    fn empty_surface_ignores_paint() {
        let mut empty = Frame::new(0, 0, BG);
        assert_eq!(
            empty.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), BG.with_alpha(0.2)),
            Ok(())
        );
        assert_eq!(
            empty.fill_text('a', 0.5, 0.5, &font(), TEXT.with_alpha(1.0)),
            Ok(())
        );
        assert!(empty.dirty_indices().is_empty());
    }

    #[test]
    fn invalid_font_is_an_error() {
        let mut f = Frame::new(2, 2, BG);
        let bad = Font {
            family: String::new(),
            size_px: 9,
            bold: true,
        };
        assert!(matches!(
            f.fill_text('a', 0.5, 0.5, &bad, TEXT.with_alpha(1.0)),
            Err(SurfaceError::InvalidFont(_))
        ));
    }

    #[test]
    fn only_changed_cells_are_marked_dirty() {
        let mut f = Frame::new(4, 4, BG);
        f.clear_dirty();
        f.fill_text('a', 0.5, 0.5, &font(), TEXT.with_alpha(0.8))
            .unwrap();
        assert_eq!(f.dirty_indices(), &[0]);
        f.clear_dirty();
        f.fill_text('a', 0.5, 0.5, &font(), TEXT.with_alpha(0.8))
            .unwrap();
        assert!(f.dirty_indices().is_empty());
    }
}
