//! Key color (transparency) policy.
//!
//! A pixel is skipped by the sprite encoder when its alpha is zero **or** its
//! RGB equals the reserved key color. Artists can mark holes either way, so
//! assets exported without an alpha channel still encode transparency.
//! Sources without alpha are expanded to alpha 255 before classification.

use std::fmt;
use std::str::FromStr;

use image::Rgba;
use rgbpack_common::Rgb565;

use crate::error::ExportError;

/// Reserved lime background (#8BE308), RGB565 `0x8F01`.
pub const DEFAULT_KEY_COLOR: KeyColor = KeyColor::new(0x8B, 0xE3, 0x08);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Why a pixel is (or is not) kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelClass {
    Opaque,
    /// Alpha channel is zero, whatever the color
    AlphaZero,
    /// Fully or partly opaque, but painted with the key color
    KeyColored,
}

impl PixelClass {
    pub fn is_transparent(self) -> bool {
        self != Self::Opaque
    }
}

impl KeyColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn to_rgb565(self) -> Rgb565 {
        Rgb565::from_rgb888(self.r, self.g, self.b)
    }

    #[inline]
    pub fn classify(&self, pixel: Rgba<u8>) -> PixelClass {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            PixelClass::AlphaZero
        } else if r == self.r && g == self.g && b == self.b {
            PixelClass::KeyColored
        } else {
            PixelClass::Opaque
        }
    }

    #[inline]
    pub fn is_transparent(&self, pixel: Rgba<u8>) -> bool {
        self.classify(pixel).is_transparent()
    }

    /// Decimal tuple form used in metadata sidecars, e.g. `(139, 227, 8)`.
    pub fn rgb_tuple(&self) -> String {
        format!("({}, {}, {})", self.r, self.g, self.b)
    }
}

impl Default for KeyColor {
    fn default() -> Self {
        DEFAULT_KEY_COLOR
    }
}

impl fmt::Display for KeyColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for KeyColor {
    type Err = ExportError;

    /// Accepts `RRGGBB`, `#RRGGBB` or `0xRRGGBB`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ExportError::config(format!(
                "key color must be 6 hex digits (RRGGBB), got {s:?}"
            )));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| ExportError::config(format!("key color {s:?}: {e}")))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}
