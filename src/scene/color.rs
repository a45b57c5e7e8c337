use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Swatches offered by the color picker.
pub const PALETTE: [Color; 10] = [
    Color::rgb(0xf4, 0x43, 0x36),
    Color::rgb(0xff, 0x98, 0x00),
    Color::rgb(0xff, 0xeb, 0x3b),
    Color::rgb(0x4c, 0xaf, 0x50),
    Color::rgb(0x21, 0x96, 0xf3),
    Color::rgb(0x3f, 0x51, 0xb5),
    Color::rgb(0x9c, 0x27, 0xb0),
    Color::rgb(0x8b, 0x45, 0x13),
    Color::rgb(0xff, 0xff, 0xff),
    Color::rgb(0x00, 0x00, 0x00),
];

/// A flat sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb`, `rrggbb`, `#rgb` or `rgb`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidColor`] for anything else.
    pub fn from_hex(s: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidColor(s.to_string());
        let hex = s.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        match hex.len() {
            6 => Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            3 => {
                let short = |i: usize| channel(i..i + 1).map(|v| v * 17);
                Ok(Self::rgb(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(invalid()),
        }
    }

    /// Channels scaled to `[0, 1]`.
    #[must_use]
    pub fn to_rgb_f32(self) -> [f32; 3] {
        [self.r, self.g, self.b].map(|c| f32::from(c) / 255.0)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
