// Copyright (c) 2026 rezky_nightky

use crate::palette::Rgb;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    Narrow,
    /// First column of a double-width glyph.
    WideLead,
    /// Second column of a double-width glyph; never printed.
    WideTrail,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
    pub bold: bool,
    pub kind: CellKind,
}

impl Cell {
    pub fn blank_with_bg(bg: Rgb) -> Self {
        Self {
            ch: ' ',
            fg: bg,
            bg,
            bold: false,
            kind: CellKind::Narrow,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.ch == ' ' && self.kind == CellKind::Narrow
    }
}
