//! Artifact naming conventions.
//!
//! Raw dense exports carry their dimensions in the file name
//! (`alien1_240x240_rgb565_be.raw`); the compression stage recovers them from
//! there to validate the buffer length.

/// Suffix of raw dense exports, after the `_<W>x<H>` dimension tag.
pub const RAW_SUFFIX: &str = "_rgb565_be.raw";
/// Extension appended to compressed artifacts.
pub const ZLIB_EXTENSION: &str = "zlib";
/// Compressed full-frame companion of a sprite.
pub const FULL_FRAME_SUFFIX: &str = "_full.rgb565.be.zlib";
/// Sprite run-length buffer.
pub const SPRITE_SUFFIX: &str = "_sprite.rle.bin";
/// Human-readable sprite metadata sidecar.
pub const META_SUFFIX: &str = "_sprite.meta.txt";

/// Build `<stem>_<W>x<H>_rgb565_be.raw`.
pub fn raw_file_name(stem: &str, width: u32, height: u32) -> String {
    format!("{stem}_{width}x{height}{RAW_SUFFIX}")
}

/// Recover `(width, height)` from a raw export file name.
///
/// Matching is case-insensitive. Returns `None` for names that do not end
/// with `_<W>x<H>_rgb565_be.raw`.
pub fn parse_raw_dimensions(file_name: &str) -> Option<(u32, u32)> {
    let lower = file_name.to_ascii_lowercase();
    let rest = lower.strip_suffix(RAW_SUFFIX)?;
    let (_, dims) = rest.rsplit_once('_')?;
    let (w, h) = dims.split_once('x')?;
    Some((parse_digits(w)?, parse_digits(h)?))
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_file_name() {
        assert_eq!(raw_file_name("alien1", 240, 240), "alien1_240x240_rgb565_be.raw");
    }

    #[test]
    fn test_parse_raw_dimensions() {
        assert_eq!(parse_raw_dimensions("alien1_240x240_rgb565_be.raw"), Some((240, 240)));
        assert_eq!(parse_raw_dimensions("foo_4x4_rgb565_be.raw"), Some((4, 4)));
        assert_eq!(parse_raw_dimensions("Face_466X233_RGB565_BE.RAW"), Some((466, 233)));
        // Underscores in the stem are fine
        assert_eq!(parse_raw_dimensions("a_b_c_10x2_rgb565_be.raw"), Some((10, 2)));
    }

    #[test]
    fn test_parse_raw_dimensions_rejects() {
        assert_eq!(parse_raw_dimensions("alien1.raw"), None);
        assert_eq!(parse_raw_dimensions("alien1_240x_rgb565_be.raw"), None);
        assert_eq!(parse_raw_dimensions("alien1_ax2_rgb565_be.raw"), None);
        assert_eq!(parse_raw_dimensions("240x240_rgb565_be.raw"), None);
        assert_eq!(parse_raw_dimensions("alien1_240x240_rgb565_be.raw.zlib"), None);
        assert_eq!(parse_raw_dimensions("big_99999999999x1_rgb565_be.raw"), None);
    }

    #[test]
    fn test_roundtrip_name() {
        let name = raw_file_name("bg", 320, 170);
        assert_eq!(parse_raw_dimensions(&name), Some((320, 170)));
    }
}
