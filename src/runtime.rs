// Copyright (c) 2025 rezk_nightky

use std::env;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

impl ColorMode {
    /// Guess from `COLORTERM` and `TERM`. Anything unrecognised gets the 256 palette.
    pub fn detect() -> Self {
        let colorterm = env::var("COLORTERM").unwrap_or_default();
        let term = env::var("TERM").unwrap_or_default();
        Self::from_env_values(&colorterm, &term)
    }

    fn from_env_values(colorterm: &str, term: &str) -> Self {
        let colorterm = colorterm.to_ascii_lowercase();
        if colorterm.contains("truecolor") || colorterm.contains("24bit") {
            return ColorMode::TrueColor;
        }
        match term.to_ascii_lowercase().as_str() {
            "dumb" => ColorMode::Mono,
            t if t == "linux" || t == "vt100" => ColorMode::Color16,
            _ => ColorMode::Color256,
        }
    }

    /// Parses the `--colormode` bit depth.
    pub fn from_bits(bits: u16) -> Result<Self, String> {
        match bits {
            0 => Ok(ColorMode::Mono),
            16 => Ok(ColorMode::Color16),
            8 | 256 => Ok(ColorMode::Color256),
            24 | 32 => Ok(ColorMode::TrueColor),
            _ => Err(format!(
                "invalid --colormode: {} (allowed: 0,16,8/256,24/32)",
                bits
            )),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorMode::TrueColor => "24-bit truecolor",
            ColorMode::Color256 => "8-bit (256-color)",
            ColorMode::Color16 => "16-color",
            ColorMode::Mono => "mono",
        }
    }
}

/// Animation state of a rain field. There is no terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colorterm_wins_over_term() {
        assert_eq!(
            ColorMode::from_env_values("truecolor", "dumb"),
            ColorMode::TrueColor
        );
        assert_eq!(ColorMode::from_env_values("", "dumb"), ColorMode::Mono);
        assert_eq!(ColorMode::from_env_values("", "linux"), ColorMode::Color16);
        assert_eq!(
            ColorMode::from_env_values("", "xterm-256color"),
            ColorMode::Color256
        );
    }

    #[test]
    fn bit_depths_map_to_modes() {
        assert_eq!(ColorMode::from_bits(8), Ok(ColorMode::Color256));
        assert_eq!(ColorMode::from_bits(32), Ok(ColorMode::TrueColor));
        assert!(ColorMode::from_bits(7).is_err());
    }
}
