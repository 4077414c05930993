// src/color.rs

//! RGB colors for the bar chart and the fixed palette of bar roles.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("expected six hex digits, got {0:?}")]
    InvalidHex(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parses `#rrggbb` or `rrggbb`.
    pub fn from_hex(src: &str) -> Result<Self, ColorError> {
        let digits = src.trim_start_matches('#');
        let invalid = || ColorError::InvalidHex(src.to_string());
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |at: usize| u8::from_str_radix(&digits[at..at + 2], 16).map_err(|_| invalid());
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Channel-wise interpolation towards `other`, truncated.
    pub fn lerp(self, other: Rgb, alpha: f64) -> Rgb {
        let mix = |a: u8, b: u8| ((1.0 - alpha) * a as f64 + b as f64 * alpha) as u8;
        Rgb(
            mix(self.0, other.0),
            mix(self.1, other.1),
            mix(self.2, other.2),
        )
    }
}

pub const SWAPPING: Rgb = Rgb(80, 255, 80);
pub const GREATER: Rgb = Rgb(255, 80, 80);
pub const LESSER: Rgb = Rgb(80, 80, 255);
pub const HIGHLIGHT: Rgb = Rgb(255, 255, 255);
/// `#c4c8db`
pub const DEFAULT: Rgb = Rgb(0xc4, 0xc8, 0xdb);
pub const PIVOT: Rgb = Rgb(255, 160, 80);
/// How far a compared bar is pulled towards `HIGHLIGHT`.
pub const HIGHLIGHT_STRENGTH: f64 = 0.75;
