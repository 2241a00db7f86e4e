// Copyright (c) 2026 rezky_nightky

//! Falling-glyph rain field.
//!
//! The field owns the grid geometry, one or more drop positions per column and the
//! enabled flag. Each [`RainField::step`] paints a translucent background over the
//! whole surface (which is what leaves the fading trail behind), draws one random
//! glyph at every drop and moves every drop down by 0, 1 or 2 rows, wrapping to the
//! top once it falls off the last row.

use std::fmt;

use rand::{rngs::StdRng, Rng};
use tracing::{debug, trace};

use crate::charset::Alphabet;
use crate::geometry::{Geometry, SurfaceSize};
use crate::palette::{RainStyle, Rgba};
use crate::runtime::RunState;
use crate::surface::{Font, Rect, Surface, SurfaceError};

pub const DEFAULT_ROWS: u16 = 32;
pub const FONT_FAMILY: &str = "Arial";
pub const MAX_DROPS_PER_COLUMN: u8 = 8;

/// Drop positions of a single column. Every entry is a row index in `0..rows`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnState {
    pub drops: Vec<u16>,
}

impl ColumnState {
    fn seeded<R: Rng>(rng: &mut R, rows: u16, drops: u8) -> Self {
        Self {
            drops: (0..drops.max(1))
                .map(|_| rng.random_range(0..rows.max(1)))
                .collect(),
        }
    }
}

/// Row increment for one frame: `round(u * 2)` for uniform `u`, so 1 is twice as likely as 0 or 2.
pub fn sample_increment<R: Rng>(rng: &mut R) -> u16 {
    (rng.random::<f64>() * 2.0).round() as u16
}

/// Moves a drop down by `increment` rows, wrapping to row 0 past the bottom.
pub fn advance_drop(row: u16, increment: u16, rows: u16) -> u16 {
    let next = row.saturating_add(increment);
    if next >= rows {
        0
    } else {
        next
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Drawn,
    /// The field is stopped; nothing was painted and no drop moved.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// The surface refused a paint operation. Drops up to and including the failing
    /// column have already advanced.
    Surface {
        column: Option<u16>,
        source: SurfaceError,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Surface {
                column: Some(col),
                source,
            } => write!(f, "rain step failed at column {col}: {source}"),
            Self::Surface {
                column: None,
                source,
            } => write!(f, "rain step failed painting the trail: {source}"),
        }
    }
}

impl std::error::Error for StepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Surface { source, .. } => Some(source),
        }
    }
}

pub struct RainField<R: Rng = StdRng> {
    geometry: Geometry,
    columns: Vec<ColumnState>,
    rows: u16,
    drops_per_column: u8,
    enabled: bool,
    alphabet: Alphabet,
    style: RainStyle,
    rng: R,
}

impl<R: Rng> RainField<R> {
    /// Builds a running field sized for `surface` and paints the surface solid background.
    pub fn new<S: Surface + ?Sized>(
        surface: &mut S,
        rows: u16,
        drops_per_column: u8,
        alphabet: Alphabet,
        style: RainStyle,
        rng: R,
    ) -> Result<Self, SurfaceError> {
        let rows = rows.max(1);
        let drops_per_column = drops_per_column.clamp(1, MAX_DROPS_PER_COLUMN);
        let mut field = Self {
            geometry: Geometry::new(surface.size(), rows),
            columns: Vec::new(),
            rows,
            drops_per_column,
            enabled: true,
            alphabet,
            style,
            rng,
        };
        field.initialize(surface)?;
        Ok(field)
    }

    /// Recomputes geometry from the surface, reseeds every column and clears the surface.
    pub fn initialize<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<(), SurfaceError> {
        let size = surface.size();
        self.reseed(size);
        debug!(
            width = size.width,
            height = size.height,
            rows = self.geometry.rows,
            cols = self.geometry.cols,
            cell_size = self.geometry.cell_size,
            font_size = self.geometry.font_size,
            "rain field initialized"
        );
        surface.fill_rect(Rect::covering(size), Rgba::opaque(self.style.bg))
    }

    /// Same as [`initialize`](Self::initialize): drop progress is not carried across a resize.
    pub fn resize<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<(), SurfaceError> {
        self.initialize(surface)
    }

    fn reseed(&mut self, size: SurfaceSize) {
        self.geometry = Geometry::new(size, self.rows);
        let (rows, drops) = (self.geometry.rows, self.drops_per_column);
        let rng = &mut self.rng;
        self.columns = (0..self.geometry.cols)
            .map(|_| ColumnState::seeded(rng, rows, drops))
            .collect();
    }

    /// Flips the enabled flag and returns the new value. `true` means the caller must
    /// re-arm its frame loop; a `false` loop winds down on its own at the next step.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        debug!(enabled = self.enabled, "rain toggled");
        self.enabled
    }

    pub fn state(&self) -> RunState {
        if self.enabled {
            RunState::Running
        } else {
            RunState::Stopped
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn columns(&self) -> &[ColumnState] {
        &self.columns
    }

    pub fn style(&self) -> &RainStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: RainStyle) {
        self.style = style;
    }

    /// Paints one frame and advances every drop.
    pub fn step<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<StepOutcome, StepError> {
        if !self.enabled {
            return Ok(StepOutcome::Skipped);
        }

        let geometry = self.geometry;
        surface
            .fill_rect(Rect::covering(geometry.size), self.style.trail())
            .map_err(|source| StepError::Surface {
                column: None,
                source,
            })?;

        let font = Font::bold(FONT_FAMILY, geometry.font_size);
        let color = self.style.glyph();

        for (col, column) in self.columns.iter_mut().enumerate() {
            let col = col as u16;
            for drop in column.drops.iter_mut() {
                let row = *drop;
                *drop = advance_drop(row, sample_increment(&mut self.rng), geometry.rows);

                let glyph = self.alphabet.pick(&mut self.rng);
                let (x, y) = geometry.cell_center(col, row);
                surface
                    .fill_text(glyph, x, y, &font, color)
                    .map_err(|source| StepError::Surface {
                        column: Some(col),
                        source,
                    })?;
            }
        }

        trace!(cols = geometry.cols, "rain step drawn");
        Ok(StepOutcome::Drawn)
    }
}
