//! Read a sprite buffer back and summarize it.

use std::io::Read;
use std::path::Path;

use rgbpack_common::{SpriteFrame, SpriteHeader, decode_sprite};
use rgbpack_shared::read_file_with_limit;

use crate::error::{ExportError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteStats {
    pub header: SpriteHeader,
    pub file_bytes: usize,
    pub runs: usize,
    pub opaque_pixels: usize,
    pub empty_rows: usize,
    pub longest_run: usize,
}

impl SpriteStats {
    pub fn from_frame(frame: &SpriteFrame, file_bytes: usize) -> Self {
        let longest_run = frame
            .rows
            .iter()
            .flat_map(|row| row.runs.iter())
            .map(|run| run.pixels.len())
            .max()
            .unwrap_or(0);

        Self {
            header: frame.header,
            file_bytes,
            runs: frame.run_count(),
            opaque_pixels: frame.opaque_pixels(),
            empty_rows: frame.rows.iter().filter(|row| row.runs.is_empty()).count(),
            longest_run,
        }
    }

    /// Bytes a dense frame of the same size would take.
    pub fn dense_bytes(&self) -> usize {
        self.header.pixel_count() * 2
    }
}

/// Decode and validate a `_sprite.rle.bin` file.
///
/// The read cap comes from the file's own header
/// ([`SpriteHeader::max_encoded_size`]), so any sprite the encoder can
/// produce is accepted and larger files are rejected before loading.
pub fn inspect_sprite_file(path: &Path) -> Result<SpriteStats> {
    let name = path.display().to_string();
    let limit = read_size_limit(path).map_err(|source| ExportError::Io {
        context: format!("failed to read header of {name}"),
        source,
    })?;
    let bytes = read_file_with_limit(path, limit).map_err(|e| ExportError::read(&name, e))?;
    let frame = decode_sprite(&bytes).map_err(|source| ExportError::Format { name, source })?;
    Ok(SpriteStats::from_frame(&frame, bytes.len()))
}

fn read_size_limit(path: &Path) -> std::io::Result<u64> {
    let mut head = Vec::with_capacity(SpriteHeader::SIZE);
    std::fs::File::open(path)?
        .take(SpriteHeader::SIZE as u64)
        .read_to_end(&mut head)?;
    // A short file is reported as truncated by the decoder
    Ok(SpriteHeader::from_bytes(&head)
        .map_or(SpriteHeader::SIZE as u64, |header| header.max_encoded_size()))
}
