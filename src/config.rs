// Copyright (c) 2026 rezky_nightky

use std::env;
use std::fmt;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::charset::{build_chars, charset_from_str, parse_user_hex_chars, Alphabet};
use crate::palette::{parse_theme, Theme};
use crate::rain::{DEFAULT_ROWS, MAX_DROPS_PER_COLUMN};
use crate::runtime::ColorMode;
use crate::scheduler::DEFAULT_REFRESH_RATE;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  glyphrain --rows 32 --drops 1 --fps 20 --color green --color-bg theme --charset auto";

pub const KEYS_USAGE: &str = "KEYS:\n  space / mouse click   pause or resume the rain\n  1..9                  switch color theme\n  q / esc / ctrl-c      quit";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_usage(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    for chunk in text.split_inclusive('\n') {
        let (line, nl) = chunk
            .strip_suffix('\n')
            .map(|l| (l, "\n"))
            .unwrap_or((chunk, ""));

        let is_heading =
            !line.starts_with(' ') && line.ends_with(':') && line == line.to_ascii_uppercase();

        if is_heading {
            out.push_str("\x1b[1;36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else if let Some(rest) = line.strip_prefix("  glyphrain") {
            out.push_str("  \x1b[1;34mglyphrain\x1b[0m");
            out.push_str(rest);
        } else {
            out.push_str(line);
        }
        out.push_str(nl);
    }
    out
}

pub fn usage_for_help() -> String {
    let text = format!("{}\n\n{}", DEFAULT_PARAMS_USAGE, KEYS_USAGE);
    if color_enabled_stdout() {
        colorize_usage(&text)
    } else {
        text
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    /// Dark tint of the theme colour, the surface the trail fades into.
    #[value(name = "theme")]
    Theme,
    #[value(name = "black")]
    Black,
    #[value(name = "transparent")]
    Transparent,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "glyphrain", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'r',
        long = "rows",
        default_value_t = DEFAULT_ROWS,
        help_heading = "GRID",
        help = "Fixed number of glyph rows; cell size follows the terminal height (min 1 max 512)"
    )]
    pub rows: u16,

    #[arg(
        short = 'd',
        long = "drops",
        default_value_t = 1,
        help_heading = "GRID",
        help = "Independent drops per column (min 1 max 8)"
    )]
    pub drops: u8,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = DEFAULT_REFRESH_RATE,
        help_heading = "PERFORMANCE",
        help = "Frame rate ceiling (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "seed",
        help_heading = "GRID",
        help = "Seed the random source for a reproducible rain"
    )]
    pub seed: Option<u64>,

    #[arg(
        short = 'c',
        long = "color",
        default_value = "green",
        help_heading = "APPEARANCE",
        help = "Color theme (see --list-colors)"
    )]
    pub color: String,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Theme,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (theme, black, transparent)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "charset",
        default_value = "auto",
        help_heading = "CHARSET",
        help = "Charset preset (see --list-charsets)"
    )]
    pub charset: String,

    #[arg(
        long = "chars",
        help_heading = "CHARSET",
        help = "Extra glyph ranges as hex code point pairs: LOW,HIGH[,LOW,HIGH...]"
    )]
    pub chars: Option<String>,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "log-file",
        help_heading = "GENERAL",
        help = "Append diagnostics to this file (filter with GLYPHRAIN_LOG, default info)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "list-charsets",
        help_heading = "HELP",
        help = "List available charset presets and exit"
    )]
    pub list_charsets: bool,

    #[arg(
        long = "list-colors",
        help_heading = "HELP",
        help = "List available color themes and exit"
    )]
    pub list_colors: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

fn print_list_heading(title: &str, flag: &str) {
    if color_enabled_stdout() {
        println!("\x1b[1;36m{}\x1b[0m", title);
        println!(
            "\x1b[2mNOTE: Use only the VALUE (left side) with {}.\x1b[0m",
            flag
        );
    } else {
        println!("{}", title);
        println!("NOTE: Use only the VALUE (left side) with {}.", flag);
    }
    println!();
    println!("VALUE        DESCRIPTION");
}

pub fn print_list_charsets() {
    print_list_heading("AVAILABLE CHARSET PRESETS:", "--charset");
    println!("auto         rain, or ascii-safe letters + digits when LANG is not UTF-8");
    println!("rain         Both katakana syllabaries + A-Z + digits + symbols (alias: matrix)");
    println!("classic      Katakana, symbols, letters and digits of the classic web rain");
    println!("ascii        Letters + digits + punctuation");
    println!("katakana     Full-width and half-width katakana");
    println!("halfwidth    Half-width katakana only (alias: hankaku)");
    println!("digits       Digits only (aliases: dec, decimal)");
    println!("binary       0 and 1 (aliases: bin, 01)");
    println!("hex          0-9 and A-F (alias: hexadecimal)");
    println!("greek        Greek letters");
    println!("braille      Braille patterns");
}

pub fn print_list_colors() {
    print_list_heading("AVAILABLE COLOR THEMES:", "--color");
    for (i, theme) in Theme::ALL.iter().enumerate() {
        let t = theme.text();
        let key = if i < 9 {
            format!("key {}", i + 1)
        } else {
            String::new()
        };
        println!(
            "{:<12} #{:02x}{:02x}{:02x}  {}",
            theme.name(),
            t.r,
            t.g,
            t.b,
            key
        );
    }
}

pub fn print_bitcolor_check(forced: Option<u16>) -> Result<(), String> {
    let show = |v: String| if v.is_empty() { "(unset)".to_string() } else { v };
    let auto = ColorMode::detect();
    let effective = match forced {
        Some(bits) => ColorMode::from_bits(bits)?,
        None => auto,
    };

    println!("BITCOLOR CHECK:");
    println!("  COLORTERM: {}", show(env::var("COLORTERM").unwrap_or_default()));
    println!("  TERM: {}", show(env::var("TERM").unwrap_or_default()));
    println!("  auto_detected: {}", auto.label());
    if forced.is_some() {
        println!("  forced: {}", effective.label());
    }
    println!("  effective: {}", effective.label());
    Ok(())
}

fn require_range<T>(name: &str, v: T, min: T, max: T) -> Result<T, String>
where
    T: PartialOrd + fmt::Display + Copy,
{
    if v < min || v > max {
        return Err(format!(
            "failed to apply {} {} (min {} max {})",
            name, v, min, max
        ));
    }
    Ok(v)
}

fn require_finite(name: &str, v: f64) -> Result<f64, String> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!(
            "failed to apply {} {} (must be a finite number)",
            name, v
        ))
    }
}

/// `true` when `LANG` does not advertise UTF-8, in which case `--charset auto` stays ASCII.
pub fn lang_is_ascii_only() -> bool {
    let lang = env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

fn parse_user_ranges(spec: &str) -> Result<Vec<(char, char)>, String> {
    let list = parse_user_hex_chars(spec)?;
    if list.len() % 2 != 0 {
        return Err("--chars: odd number of unicode chars given (must be even)".to_string());
    }
    Ok(list.chunks(2).map(|pair| (pair[0], pair[1])).collect())
}

/// Validated settings for one run of the rain.
#[derive(Debug)]
pub struct RunConfig {
    pub rows: u16,
    pub drops: u8,
    pub fps: f64,
    pub end_after: Option<Duration>,
    pub seed: Option<u64>,
    pub theme: Theme,
    pub alphabet: Alphabet,
    pub color_mode: ColorMode,
    pub color_bg: ColorBg,
    pub screensaver: bool,
}

impl RunConfig {
    pub fn from_args(args: &Args, ascii_only: bool) -> Result<Self, String> {
        let rows = require_range("--rows", args.rows, 1, 512)?;
        let drops = require_range("--drops", args.drops, 1, MAX_DROPS_PER_COLUMN)?;
        let fps = require_range("--fps", require_finite("--fps", args.fps)?, 1.0, 240.0)?;
        let end_after = match args.duration {
            Some(s) if require_finite("--duration", s)? > 0.0 => Some(Duration::from_secs_f64(
                require_range("--duration", s, 0.1, 86400.0)?,
            )),
            _ => None,
        };

        let theme = parse_theme(&args.color)?;
        let user_ranges = match &args.chars {
            Some(spec) => parse_user_ranges(spec)?,
            None => Vec::new(),
        };
        let charset = charset_from_str(&args.charset, ascii_only)?;
        let alphabet = Alphabet::new(build_chars(charset, &user_ranges));

        let color_mode = match args.colormode {
            Some(bits) => ColorMode::from_bits(bits)?,
            None => ColorMode::detect(),
        };

        Ok(Self {
            rows,
            drops,
            fps,
            end_after,
            seed: args.seed,
            theme,
            alphabet,
            color_mode,
            color_bg: args.color_bg,
            screensaver: args.screensaver,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn args_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_match_classic_rain() {
        let args = Args::try_parse_from(["glyphrain"]).unwrap();
        assert_eq!(args.rows, 32);
        assert_eq!(args.drops, 1);
        assert_eq!(args.fps, 20.0);
        assert_eq!(args.color_bg, ColorBg::Theme);
        assert!(args.seed.is_none());
    }

    #[test]
    fn parses_short_flags() {
        let args = Args::try_parse_from(["glyphrain", "-r", "64", "-d", "3", "--seed", "9"]).unwrap();
        assert_eq!(args.rows, 64);
        assert_eq!(args.drops, 3);
        assert_eq!(args.seed, Some(9));
    }

    fn parse(argv: &[&str]) -> Result<RunConfig, String> {
        let args = Args::try_parse_from(argv).unwrap();
        RunConfig::from_args(&args, false)
    }

    #[test]
    fn run_config_validates_ranges() {
        let cfg = parse(&["glyphrain", "--colormode", "24", "--duration", "2.5"]).unwrap();
        assert_eq!(cfg.color_mode, ColorMode::TrueColor);
        assert_eq!(cfg.end_after, Some(Duration::from_millis(2500)));
        assert_eq!(cfg.theme, Theme::Green);

        let err = parse(&["glyphrain", "--rows", "0"]).unwrap_err();
        assert_eq!(err, "failed to apply --rows 0 (min 1 max 512)");
        assert!(parse(&["glyphrain", "--drops", "9"]).is_err());
        assert!(parse(&["glyphrain", "--fps", "NaN"]).is_err());
        assert!(parse(&["glyphrain", "--color", "mauve"]).is_err());
    }

    #[test]
    fn non_positive_duration_disables_timer() {
        let cfg = parse(&["glyphrain", "--colormode", "0", "--duration", "0"]).unwrap();
        assert_eq!(cfg.end_after, None);
    }

    #[test]
    fn user_ranges_pair_up() {
        assert_eq!(
            parse_user_ranges("41,43,30,31").unwrap(),
            vec![('A', 'C'), ('0', '1')]
        );
        assert!(parse_user_ranges("41").is_err());
    }

    #[test]
    fn colorize_wraps_headings() {
        let out = colorize_usage("KEYS:\n  q quit");
        assert!(out.starts_with("\x1b[1;36mKEYS:\x1b[0m\n"));
        assert!(out.ends_with("  q quit"));
    }
}
