//! Display colors for cells.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Elevation at which a cell renders its unmodified base color
pub const BASE_HEIGHT: i32 = 10;

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` or `rrggbb` hex string
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }

    /// Shade each channel by the cell's elevation relative to [`BASE_HEIGHT`].
    ///
    /// Channels scale by `1 + (height - BASE_HEIGHT) / 100`, clamped to the
    /// valid channel range, so a cell at the base height renders its base
    /// color exactly.
    pub fn shade(self, height: i32) -> Self {
        let factor = 1.0 + (height - BASE_HEIGHT) as f32 / 100.0;
        let scale = |channel: u8| ((channel as f32 * factor).round()).clamp(0.0, 255.0) as u8;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
