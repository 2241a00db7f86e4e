// Copyright (c) 2026 rezky_nightky

//! The drawing surface the rain paints onto.
//!
//! Coordinates are in surface pixels with the origin at the top-left corner.
//! For the terminal host one pixel is one character cell.

use std::fmt;

use crate::geometry::SurfaceSize;
use crate::palette::Rgba;

pub const DEFAULT_FONT_PX: u32 = 16;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn covering(size: SurfaceSize) -> Self {
        Self::new(0.0, 0.0, size.width as f32, size.height as f32)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Font {
    pub family: String,
    pub size_px: u32,
    pub bold: bool,
}

impl Font {
    /// Bold font at `size_px`, substituting the default size when the cell is too small to round up to one.
    pub fn bold(family: &str, size_px: u32) -> Self {
        Self {
            family: family.to_string(),
            size_px: if size_px == 0 {
                DEFAULT_FONT_PX
            } else {
                size_px
            },
            bold: true,
        }
    }

    pub fn validate(&self) -> Result<(), SurfaceError> {
        if self.size_px == 0 {
            return Err(SurfaceError::InvalidFont(format!(
                "{}: size must be at least 1px",
                self.family
            )));
        }
        if self.family.trim().is_empty() {
            return Err(SurfaceError::InvalidFont("empty font family".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// Font description the surface cannot render with.
    InvalidFont(String),
    /// The surface no longer has backing storage to draw into. A zero-sized cell
    /// frame is still attached and never reports this.
    #[allow(dead_code)]
    Detached,
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFont(msg) => write!(f, "invalid font: {msg}"),
            Self::Detached => write!(f, "drawing surface is detached"),
        }
    }
}

impl std::error::Error for SurfaceError {}

pub trait Surface {
    fn size(&self) -> SurfaceSize;

    fn fill_rect(&mut self, rect: Rect, color: Rgba) -> Result<(), SurfaceError>;

    /// Draws `glyph` centred horizontally and vertically on `(x, y)`.
    fn fill_text(
        &mut self,
        glyph: char,
        x: f32,
        y: f32,
        font: &Font,
        color: Rgba,
    ) -> Result<(), SurfaceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_font_size_falls_back_to_default() {
        assert_eq!(Font::bold("Arial", 0).size_px, DEFAULT_FONT_PX);
        assert_eq!(Font::bold("Arial", 9).size_px, 9);
    }

    #[test]
    fn validate_rejects_blank_family() {
        let f = Font::bold("  ", 9);
        assert!(matches!(f.validate(), Err(SurfaceError::InvalidFont(_))));
        assert!(Font::bold("Arial", 9).validate().is_ok());
    }
}
