//! Sprite run-length encoder.
//!
//! Each row is scanned left to right for maximal runs of non-transparent
//! pixels (see [`KeyColor::is_transparent`]). Only run pixels are stored; the
//! layout is documented in `rgbpack_common::formats::sprite`.

use std::ops::Range;

use image::{Rgba, RgbaImage};
use rgbpack_common::{Rgb565, SpriteHeader, SpriteWriter};

use crate::error::{ExportError, Result};
use crate::key_color::KeyColor;

/// Result of encoding one sprite.
#[derive(Debug, Clone)]
pub struct SpriteEncoding {
    pub header: SpriteHeader,
    pub bytes: Vec<u8>,
    /// Pixels kept in runs
    pub opaque_pixels: usize,
    pub run_count: usize,
}

/// Collect the maximal non-transparent runs of one row into `runs`.
///
/// `runs` is cleared first so the caller can reuse the allocation.
pub fn find_runs(line: &[Rgba<u8>], key: &KeyColor, runs: &mut Vec<Range<usize>>) {
    runs.clear();
    let mut x = 0;
    while x < line.len() {
        if key.is_transparent(line[x]) {
            x += 1;
            continue;
        }
        let start = x;
        while x < line.len() && !key.is_transparent(line[x]) {
            x += 1;
        }
        runs.push(start..x);
    }
}

/// Encode an RGBA image as a sprite run-length buffer.
///
/// Fails with a configuration error when a dimension does not fit the 16-bit
/// header fields.
pub fn encode_sprite(img: &RgbaImage, key: &KeyColor) -> Result<SpriteEncoding> {
    let (width, height) = img.dimensions();
    let w16 = u16::try_from(width).map_err(|_| {
        ExportError::config(format!("sprite width {width} exceeds {}", u16::MAX))
    })?;
    let h16 = u16::try_from(height).map_err(|_| {
        ExportError::config(format!("sprite height {height} exceeds {}", u16::MAX))
    })?;

    let header = SpriteHeader::new(w16, h16, key.to_rgb565());
    let mut writer = SpriteWriter::new(header);
    let mut line: Vec<Rgba<u8>> = Vec::with_capacity(width as usize);
    let mut runs = Vec::new();
    let mut opaque_pixels = 0;
    let mut run_count = 0;

    for row in img.rows() {
        line.clear();
        line.extend(row.copied());
        find_runs(&line, key, &mut runs);

        writer.begin_row(runs.len())?;
        for run in &runs {
            let pixels = line[run.clone()].iter().map(|px| {
                let [r, g, b, _] = px.0;
                Rgb565::from_rgb888(r, g, b)
            });
            writer.push_run(run.start as u16, pixels)?;
            opaque_pixels += run.len();
        }
        run_count += runs.len();
    }

    Ok(SpriteEncoding {
        header,
        bytes: writer.finish()?,
        opaque_pixels,
        run_count,
    })
}
