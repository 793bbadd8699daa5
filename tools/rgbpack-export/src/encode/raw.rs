//! Resize-and-export path for headerless dense buffers.

use image::DynamicImage;
use image::imageops::{self, FilterType};
use rgbpack_common::MAX_RAW_DIMENSION;

use super::full_frame::encode_dense;
use crate::error::{ExportError, Result};

/// Check target dimensions before any work is done.
pub fn validate_raw_dimensions(width: u32, height: u32) -> Result<()> {
    for (label, value) in [("width", width), ("height", height)] {
        if value == 0 || value > MAX_RAW_DIMENSION {
            return Err(ExportError::config(format!(
                "target {label} must be 1..={MAX_RAW_DIMENSION}, got {value}"
            )));
        }
    }
    Ok(())
}

/// Stretch `img` to exactly `width × height` (Lanczos3, aspect ratio not
/// preserved), drop alpha and encode densely.
///
/// The result is always `width * height * 2` bytes.
pub fn resize_and_encode(img: &DynamicImage, width: u32, height: u32) -> Result<Vec<u8>> {
    validate_raw_dimensions(width, height)?;

    let rgb = img.to_rgb8();
    let resized = if rgb.dimensions() == (width, height) {
        rgb
    } else {
        tracing::debug!(
            "Resizing {}x{} -> {}x{}",
            rgb.width(),
            rgb.height(),
            width,
            height
        );
        imageops::resize(&rgb, width, height, FilterType::Lanczos3)
    };

    Ok(encode_dense(&resized))
}
