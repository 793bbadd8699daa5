//! Test asset generators for integration tests

use image::{Rgba, RgbaImage};
use std::path::Path;

/// Key color used by the exporter when none is given
pub const KEY: Rgba<u8> = Rgba([0x8B, 0xE3, 0x08, 255]);

/// 4x2 image: left half key color, right half opaque blue
pub fn generate_half_key_png(path: &Path) -> image::ImageResult<()> {
    RgbaImage::from_fn(4, 2, |x, _| {
        if x < 2 { KEY } else { Rgba([0, 0, 255, 255]) }
    })
    .save(path)
}

/// 8x8 checkerboard with a fully transparent border
pub fn generate_framed_checkerboard_png(path: &Path) -> image::ImageResult<()> {
    RgbaImage::from_fn(8, 8, |x, y| {
        if x == 0 || y == 0 || x == 7 || y == 7 {
            Rgba([0, 0, 0, 0])
        } else if (x + y) % 2 == 0 {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([255, 0, 0, 255])
        }
    })
    .save(path)
}

/// Raw export named `<stem>_<W>x<H>_rgb565_be.raw` holding `len` bytes
pub fn generate_raw(dir: &Path, stem: &str, width: u32, height: u32, len: usize) -> std::io::Result<std::path::PathBuf> {
    let path = dir.join(format!("{stem}_{width}x{height}_rgb565_be.raw"));
    let bytes: Vec<u8> = (0..len).map(|i| (i * 7) as u8).collect();
    std::fs::write(&path, bytes)?;
    Ok(path)
}
