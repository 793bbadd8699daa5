//! Dense RGB565 encoding.

use image::{ImageBuffer, Pixel, RgbaImage};
use rgbpack_common::{encode_rgb565_be, full_frame_size};

/// Encode every pixel of any 8-bit image, row-major, big-endian.
///
/// Alpha (if any) is ignored; key-colored pixels are written like any other.
pub fn encode_dense<P>(img: &ImageBuffer<P, Vec<u8>>) -> Vec<u8>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = img.dimensions();
    let mut out = Vec::with_capacity(full_frame_size(width, height).unwrap_or(0));
    for px in img.pixels() {
        let [r, g, b] = px.to_rgb().0;
        out.extend_from_slice(&encode_rgb565_be(r, g, b));
    }
    out
}

/// Full-frame buffer for a decoded RGBA image: `width * height * 2` bytes.
pub fn encode_full_frame(img: &RgbaImage) -> Vec<u8> {
    encode_dense(img)
}
