//! Color parsing for style arguments.

use serde::{Deserialize, Serialize};

/// A straight (non-premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a `#RRGGBB` or `#RRGGBBAA` hex string.
    ///
    /// Any other length, a missing `#` or a non-hex digit yields `None`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        match digits.len() {
            6 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, 255)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// Channels as fractions in `0.0..=1.0`.
    pub fn to_f32_array(&self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rgb() {
        assert_eq!(Color::from_hex("#ff0000"), Some(Color::rgba(255, 0, 0, 255)));
        assert_eq!(Color::from_hex("#00FF7f"), Some(Color::rgba(0, 255, 127, 255)));
    }

    #[test]
    fn test_parse_rgba() {
        assert_eq!(
            Color::from_hex("#11223344"),
            Some(Color::rgba(0x11, 0x22, 0x33, 0x44))
        );
        assert_eq!(Color::from_hex("#000000ff"), Some(Color::BLACK));
    }

    #[test]
    fn test_reject_other_lengths() {
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("#ff00000"), None);
        assert_eq!(Color::from_hex("#ff0000ff00"), None);
        assert_eq!(Color::from_hex("ff0000"), None);
        assert_eq!(Color::from_hex(""), None);
    }

    #[test]
    fn test_reject_bad_digits() {
        assert_eq!(Color::from_hex("#gg0000"), None);
        assert_eq!(Color::from_hex("#ff00é0"), None);
        assert_eq!(Color::from_hex("#+f+f+f"), None);
        assert_eq!(Color::from_hex("#+f+f+f+f"), None);
        assert_eq!(Color::from_hex("#-10000"), None);
    }
}
