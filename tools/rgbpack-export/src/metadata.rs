//! Human-readable sprite metadata sidecar (`_sprite.meta.txt`).
//!
//! Diagnostic only; nothing reads it back.

use std::fmt;

use crate::key_color::KeyColor;

#[derive(Debug, Clone, PartialEq)]
pub struct AssetMetadata {
    pub source: String,
    pub width: u32,
    pub height: u32,
    pub key: KeyColor,
    pub full_raw_bytes: usize,
    pub full_compressed_bytes: Option<usize>,
    pub rle_bytes: Option<usize>,
    pub opaque_pixels: usize,
}

impl AssetMetadata {
    pub fn total_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Fraction of pixels kept as opaque, 0.0 for an empty image.
    pub fn opaque_fraction(&self) -> f64 {
        match self.total_pixels() {
            0 => 0.0,
            total => self.opaque_pixels as f64 / total as f64,
        }
    }
}

impl fmt::Display for AssetMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Source: {}", self.source)?;
        writeln!(f, "Size: {}x{}", self.width, self.height)?;
        writeln!(f, "Key RGB: {}", self.key.rgb_tuple())?;
        writeln!(f, "Key RGB565: 0x{:04X}", self.key.to_rgb565().0)?;
        writeln!(f, "Full raw: {} bytes", self.full_raw_bytes)?;
        if let Some(bytes) = self.full_compressed_bytes {
            writeln!(f, "Full zlib: {bytes} bytes")?;
        }
        if let Some(bytes) = self.rle_bytes {
            writeln!(f, "RLE size: {bytes} bytes")?;
        }
        writeln!(
            f,
            "Opaque kept: {}/{} ({:.2}%)",
            self.opaque_pixels,
            self.total_pixels(),
            self.opaque_fraction() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_color::DEFAULT_KEY_COLOR;

    fn sample() -> AssetMetadata {
        AssetMetadata {
            source: "alien.png".into(),
            width: 4,
            height: 2,
            key: DEFAULT_KEY_COLOR,
            full_raw_bytes: 16,
            full_compressed_bytes: Some(12),
            rle_bytes: Some(30),
            opaque_pixels: 3,
        }
    }

    #[test]
    fn test_sidecar_text() {
        assert_eq!(
            sample().to_string(),
            "Source: alien.png\n\
             Size: 4x2\n\
             Key RGB: (139, 227, 8)\n\
             Key RGB565: 0x8F01\n\
             Full raw: 16 bytes\n\
             Full zlib: 12 bytes\n\
             RLE size: 30 bytes\n\
             Opaque kept: 3/8 (37.50%)\n"
        );
    }

    #[test]
    fn test_optional_fields_omitted() {
        let meta = AssetMetadata {
            full_compressed_bytes: None,
            rle_bytes: None,
            ..sample()
        };
        let text = meta.to_string();
        assert!(!text.contains("Full zlib"));
        assert!(!text.contains("RLE size"));
    }

    #[test]
    fn test_empty_image_fraction() {
        let meta = AssetMetadata {
            width: 0,
            height: 0,
            opaque_pixels: 0,
            ..sample()
        };
        assert_eq!(meta.opaque_fraction(), 0.0);
    }
}
