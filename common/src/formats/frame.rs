//! Dense RGB565 frames (`_full.rgb565.be.zlib`, `_<W>x<H>_rgb565_be.raw`)
//!
//! Headerless: `width × height` big-endian RGB565 values, row-major. The
//! dimensions travel out of band (sprite header, file name or caller).

use crate::error::FormatError;
use crate::rgb565::Rgb565;

/// Largest width or height accepted for resized raw exports.
pub const MAX_RAW_DIMENSION: u32 = 4096;

/// Byte size of a dense frame, or `None` when it overflows `usize`.
pub const fn full_frame_size(width: u32, height: u32) -> Option<usize> {
    match (width as usize).checked_mul(height as usize) {
        Some(pixels) => pixels.checked_mul(Rgb565::SIZE),
        None => None,
    }
}

/// Decode a dense frame, checking its length against the dimensions.
pub fn decode_full_frame(bytes: &[u8], width: u32, height: u32) -> Result<Vec<Rgb565>, FormatError> {
    let expected = full_frame_size(width, height).ok_or(FormatError::FrameTooLarge { width, height })?;
    if bytes.len() != expected {
        return Err(FormatError::FrameSize {
            actual: bytes.len(),
            expected,
            width,
            height,
        });
    }
    Ok(bytes
        .chunks_exact(Rgb565::SIZE)
        .map(|px| Rgb565::from_be_bytes([px[0], px[1]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_frame_size() {
        assert_eq!(full_frame_size(240, 240), Some(115_200));
        assert_eq!(full_frame_size(0, 10), Some(0));
    }

    #[test]
    fn test_full_frame_size_overflow() {
        assert_eq!(full_frame_size(u32::MAX, u32::MAX), None);
        assert_eq!(
            decode_full_frame(&[0u8; 4], u32::MAX, u32::MAX).unwrap_err(),
            FormatError::FrameTooLarge {
                width: u32::MAX,
                height: u32::MAX,
            }
        );
    }

    #[test]
    fn test_decode_full_frame() {
        let bytes = [0xF8, 0x00, 0x07, 0xE0];
        let pixels = decode_full_frame(&bytes, 2, 1).unwrap();
        assert_eq!(pixels, vec![Rgb565(0xF800), Rgb565(0x07E0)]);
    }

    #[test]
    fn test_decode_full_frame_wrong_size() {
        let err = decode_full_frame(&[0u8; 31], 4, 4).unwrap_err();
        assert_eq!(
            err,
            FormatError::FrameSize {
                actual: 31,
                expected: 32,
                width: 4,
                height: 4,
            }
        );
    }
}
