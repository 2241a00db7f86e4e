// Copyright (c) 2026 rezky_nightky

use std::char;

use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Charset(u32);

impl Charset {
    pub const NONE: Charset = Charset(0);
    pub const LATIN_UPPER: Charset = Charset(0x1);
    pub const LATIN_LOWER: Charset = Charset(0x2);
    pub const DIGITS: Charset = Charset(0x4);
    pub const PUNCTUATION: Charset = Charset(0x8);
    pub const HALFWIDTH_KATAKANA: Charset = Charset(0x10);
    pub const FULLWIDTH_KATAKANA: Charset = Charset(0x20);
    pub const RAIN_SYMBOLS: Charset = Charset(0x40);
    pub const GREEK: Charset = Charset(0x80);
    pub const BINARY: Charset = Charset(0x100);
    pub const HEX: Charset = Charset(0x200);
    pub const BRAILLE: Charset = Charset(0x400);

    pub const ASCII_SAFE: Charset = Charset(0x7);
    pub const KATAKANA: Charset = Charset(0x30);
    pub const RAIN: Charset = Charset(0x75);

    pub const fn union(self, other: Charset) -> Charset {
        Charset(self.0 | other.0)
    }

    pub fn contains(self, other: Charset) -> bool {
        (self.0 & other.0) != 0
    }
}

/// Full-width katakana syllabary, without the small forms.
const FULLWIDTH_KATAKANA: &str =
    "アイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワヲン";
const RAIN_SYMBOLS: &str = "<>#$%&|()=≈^*;";
/// The alphabet of the classic canvas rain, duplicates removed.
const CLASSIC: &str = "アイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワヲン<>#$%&|()=≈^*;ABCDEFGHIJKLMOPQRSTUVXYZ0123456789";

pub fn parse_user_hex_chars(s: &str) -> Result<Vec<char>, String> {
    let mut out = Vec::new();
    for (i, part) in s.split(',').enumerate() {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let v = u32::from_str_radix(part, 16)
            .map_err(|_| format!("invalid hex char at index {}", i + 1))?;
        let ch = char::from_u32(v)
            .ok_or_else(|| format!("invalid unicode scalar at index {}", i + 1))?;
        out.push(ch);
    }
    Ok(out)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharsetChoice {
    Flags(Charset),
    Classic,
}

pub fn charset_from_str(spec: &str, default_to_ascii: bool) -> Result<CharsetChoice, String> {
    let spec = spec.trim().to_ascii_lowercase();
    let flags = match spec.as_str() {
        "auto" => {
            if default_to_ascii {
                Charset::ASCII_SAFE
            } else {
                Charset::RAIN
            }
        }
        "rain" | "matrix" => Charset::RAIN,
        "classic" => return Ok(CharsetChoice::Classic),
        "ascii" => Charset::ASCII_SAFE.union(Charset::PUNCTUATION),
        "katakana" => Charset::KATAKANA,
        "halfwidth" | "hankaku" => Charset::HALFWIDTH_KATAKANA,
        "digits" | "dec" | "decimal" => Charset::DIGITS,
        "bin" | "binary" | "01" => Charset::BINARY,
        "hex" | "hexadecimal" => Charset::HEX,
        "greek" => Charset::GREEK,
        "braille" => Charset::BRAILLE,
        _ => {
            return Err(format!(
                "unsupported charset: {} (see --list-charsets)",
                spec
            ))
        }
    };
    Ok(CharsetChoice::Flags(flags))
}

fn push_range(out: &mut Vec<char>, start: u32, end: u32) {
    for v in start..=end {
        if let Some(ch) = char::from_u32(v) {
            out.push(ch);
        }
    }
}

pub fn build_chars(choice: CharsetChoice, user_ranges: &[(char, char)]) -> Vec<char> {
    let mut out: Vec<char> = Vec::new();

    match choice {
        CharsetChoice::Classic => out.extend(CLASSIC.chars()),
        CharsetChoice::Flags(charset) => {
            if charset.contains(Charset::FULLWIDTH_KATAKANA) {
                out.extend(FULLWIDTH_KATAKANA.chars());
            }
            if charset.contains(Charset::HALFWIDTH_KATAKANA) {
                push_range(&mut out, 0xFF66, 0xFF9D);
            }
            if charset.contains(Charset::LATIN_UPPER) {
                push_range(&mut out, 0x41, 0x5A);
            }
            if charset.contains(Charset::LATIN_LOWER) {
                push_range(&mut out, 0x61, 0x7A);
            }
            if charset.contains(Charset::DIGITS) {
                push_range(&mut out, 0x30, 0x39);
            }
            if charset.contains(Charset::PUNCTUATION) {
                push_range(&mut out, 0x21, 0x2F);
                push_range(&mut out, 0x3A, 0x40);
                push_range(&mut out, 0x5B, 0x60);
                push_range(&mut out, 0x7B, 0x7E);
            }
            if charset.contains(Charset::RAIN_SYMBOLS) {
                out.extend(RAIN_SYMBOLS.chars());
            }
            if charset.contains(Charset::BINARY) {
                push_range(&mut out, 0x30, 0x31);
            }
            if charset.contains(Charset::HEX) {
                push_range(&mut out, 0x30, 0x39);
                push_range(&mut out, 0x41, 0x46);
            }
            if charset.contains(Charset::GREEK) {
                push_range(&mut out, 0x0391, 0x03A1);
                push_range(&mut out, 0x03A3, 0x03C9);
            }
            if charset.contains(Charset::BRAILLE) {
                push_range(&mut out, 0x2801, 0x28FF);
            }
        }
    }

    for &(a, b) in user_ranges {
        push_range(&mut out, a as u32, b as u32);
    }

    out.retain(|c| !c.is_control() && !c.is_whitespace());
    if out.is_empty() {
        out.push('0');
        out.push('1');
    }

    out
}

/// Non-empty set of glyphs the rain draws from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    pub fn new(chars: Vec<char>) -> Self {
        if chars.is_empty() {
            return Self::default();
        }
        Self { chars }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[cfg(test)]
    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    pub fn pick<R: Rng>(&self, rng: &mut R) -> char {
        self.chars[rng.random_range(0..self.chars.len())]
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self {
            chars: build_chars(CharsetChoice::Flags(Charset::RAIN), &[]),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn parse_user_hex_chars_parses_hex_codepoints() {
        let v = parse_user_hex_chars("30,31").unwrap();
        assert_eq!(v, vec!['0', '1']);
        assert!(parse_user_hex_chars("zz").is_err());
    }

    #[test]
    fn charset_auto_selects_ascii_safe_when_non_utf() {
        let cs = charset_from_str("auto", true).unwrap();
        assert_eq!(cs, CharsetChoice::Flags(Charset::ASCII_SAFE));
        let cs = charset_from_str("auto", false).unwrap();
        assert_eq!(cs, CharsetChoice::Flags(Charset::RAIN));
    }

    #[test]
    fn rain_mixes_both_katakana_latin_digits_and_symbols() {
        let out = build_chars(CharsetChoice::Flags(Charset::RAIN), &[]);
        for c in ['ア', 'ｱ', 'Z', '7', '≈'] {
            assert!(out.contains(&c), "missing {c}");
        }
        assert!(!out.contains(&'a'));
    }

    #[test]
    fn classic_has_no_duplicates() {
        let out = build_chars(CharsetChoice::Classic, &[]);
        let mut sorted = out.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), out.len());
    }

    #[test]
    fn user_ranges_extend_and_empty_falls_back_to_binary() {
        let out = build_chars(CharsetChoice::Flags(Charset::NONE), &[('a', 'c')]);
        assert_eq!(out, vec!['a', 'b', 'c']);
        let out = build_chars(CharsetChoice::Flags(Charset::NONE), &[]);
        assert_eq!(out, vec!['0', '1']);
    }

    #[test]
    fn pick_only_returns_alphabet_members() {
        let alphabet = Alphabet::new(vec!['x', 'y', 'z']);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert!(alphabet.contains(alphabet.pick(&mut rng)));
        }
    }
}
