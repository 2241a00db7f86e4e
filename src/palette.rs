// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::runtime::ColorMode;

pub const TRAIL_ALPHA: f32 = 0.2;
pub const GLYPH_ALPHA: f32 = 0.8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Background tint for a text colour: each channel scaled by 0.1 and floored.
    pub fn dimmed(self) -> Self {
        let f = |c: u8| (c as u16 / 10) as u8;
        Self::new(f(self.r), f(self.g), f(self.b))
    }

    /// Source-over composite of `top` at `alpha` onto `self`.
    pub fn blend(self, top: Rgb, alpha: f32) -> Self {
        let a = alpha.clamp(0.0, 1.0);
        let mix = |below: u8, above: u8| {
            let v = below as f32 + (above as f32 - below as f32) * a;
            v.round().clamp(0.0, 255.0) as u8
        };
        Self::new(mix(self.r, top.r), mix(self.g, top.g), mix(self.b, top.b))
    }

    pub fn max_channel_distance(self, other: Rgb) -> u8 {
        let d = |a: u8, b: u8| a.abs_diff(b);
        d(self.r, other.r).max(d(self.g, other.g)).max(d(self.b, other.b))
    }

    pub fn with_alpha(self, a: f32) -> Rgba {
        Rgba { rgb: self, a }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub a: f32,
}

impl Rgba {
    pub fn opaque(rgb: Rgb) -> Self {
        Self { rgb, a: 1.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Green,
    Lime,
    Cyan,
    Blue,
    Red,
    Orange,
    Gold,
    Purple,
    Neon,
    Gray,
    Snow,
}

impl Theme {
    pub const ALL: [Theme; 11] = [
        Theme::Green,
        Theme::Lime,
        Theme::Cyan,
        Theme::Blue,
        Theme::Red,
        Theme::Orange,
        Theme::Gold,
        Theme::Purple,
        Theme::Neon,
        Theme::Gray,
        Theme::Snow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Theme::Green => "green",
            Theme::Lime => "lime",
            Theme::Cyan => "cyan",
            Theme::Blue => "blue",
            Theme::Red => "red",
            Theme::Orange => "orange",
            Theme::Gold => "gold",
            Theme::Purple => "purple",
            Theme::Neon => "neon",
            Theme::Gray => "gray",
            Theme::Snow => "snow",
        }
    }

    pub fn text(self) -> Rgb {
        match self {
            Theme::Green => Rgb::new(128, 255, 0),
            Theme::Lime => Rgb::new(0, 255, 70),
            Theme::Cyan => Rgb::new(0, 255, 255),
            Theme::Blue => Rgb::new(80, 140, 255),
            Theme::Red => Rgb::new(255, 60, 40),
            Theme::Orange => Rgb::new(255, 150, 0),
            Theme::Gold => Rgb::new(255, 210, 60),
            Theme::Purple => Rgb::new(190, 90, 255),
            Theme::Neon => Rgb::new(255, 60, 200),
            Theme::Gray => Rgb::new(200, 200, 200),
            Theme::Snow => Rgb::new(230, 245, 255),
        }
    }

    /// Theme bound to a number hot key (`1`..=`9`).
    pub fn from_digit(d: char) -> Option<Theme> {
        let i = d.to_digit(10)? as usize;
        if i == 0 {
            return None;
        }
        Theme::ALL.get(i - 1).copied()
    }
}

pub fn parse_theme(s: &str) -> Result<Theme, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "green" | "matrix" => Ok(Theme::Green),
        "lime" | "green2" => Ok(Theme::Lime),
        "cyan" => Ok(Theme::Cyan),
        "blue" => Ok(Theme::Blue),
        "red" => Ok(Theme::Red),
        "orange" => Ok(Theme::Orange),
        "gold" | "yellow" => Ok(Theme::Gold),
        "purple" => Ok(Theme::Purple),
        "neon" | "synthwave" => Ok(Theme::Neon),
        "gray" | "grey" => Ok(Theme::Gray),
        "snow" => Ok(Theme::Snow),
        _ => Err(format!("invalid color: {} (see --list-colors)", s)),
    }
}

/// Colours used by one rain field: glyph colour plus the dark tint the trail fades into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RainStyle {
    pub text: Rgb,
    pub bg: Rgb,
    pub trail_alpha: f32,
    pub glyph_alpha: f32,
}

impl RainStyle {
    pub fn from_theme(theme: Theme) -> Self {
        let text = theme.text();
        Self {
            text,
            bg: text.dimmed(),
            trail_alpha: TRAIL_ALPHA,
            glyph_alpha: GLYPH_ALPHA,
        }
    }

    pub fn trail(&self) -> Rgba {
        self.bg.with_alpha(self.trail_alpha)
    }

    pub fn glyph(&self) -> Rgba {
        self.text.with_alpha(self.glyph_alpha)
    }
}

impl Default for RainStyle {
    fn default() -> Self {
        Self::from_theme(Theme::Green)
    }
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let r6 = ((r as u16 * 5) + 127) / 255;
    let g6 = ((g as u16 * 5) + 127) / 255;
    let b6 = ((b as u16 * 5) + 127) / 255;

    let cube = |i: u16| CUBE_LEVELS[i as usize];
    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(r, g, b, cube(r6), cube(g6), cube(b6));

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let gray_idx = match avg {
        0..=7 => 16,
        239..=255 => 231,
        _ => 232 + ((avg - 8) / 10).min(23),
    };
    let gray = match gray_idx {
        16 => 0,
        231 => 255,
        i => 8 + 10 * (i - 232),
    };
    let gray_dist = dist2(r, g, b, gray, gray, gray);

    if gray_dist < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    let mut best = Color::White;
    let mut best_d = i32::MAX;
    for (c, (cr, cg, cb)) in TABLE {
        let d = dist2(r, g, b, cr, cg, cb);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

/// Maps a composited colour onto what the terminal can show. `None` means "terminal default".
pub fn quantize(c: Rgb, mode: ColorMode) -> Option<Color> {
    match mode {
        ColorMode::Mono => None,
        ColorMode::TrueColor => Some(Color::Rgb {
            r: c.r,
            g: c.g,
            b: c.b,
        }),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(c.r, c.g, c.b))),
        ColorMode::Color16 => Some(rgb_to_color16(c.r, c.g, c.b)),
    }
}
