//! Compression stage: zlib-compress raw RGB565 exports.
//!
//! Raw files carry their dimensions in the name
//! (`alien1_240x240_rgb565_be.raw`). Before compressing, the byte length is
//! checked against `W * H * 2` so truncated or mislabeled exports never reach
//! the firmware image.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use rgbpack_common::{FormatError, ZLIB_EXTENSION, full_frame_size, parse_raw_dimensions};
use rgbpack_shared::{MAX_RAW_BYTES, read_file_with_limit, write_atomic};

use crate::error::{ExportError, Result};

/// zlib level, 0 (store) ..= 9 (best).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionLevel(u32);

impl CompressionLevel {
    pub const MAX: u32 = 9;
    pub const BEST: Self = Self(9);

    pub fn new(level: u32) -> Result<Self> {
        if level > Self::MAX {
            return Err(ExportError::config(format!(
                "compression level must be 0..={}, got {level}",
                Self::MAX
            )));
        }
        Ok(Self(level))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::BEST
    }
}

/// Compress a buffer with zlib.
pub fn compress(data: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(data.len() / 2 + 64),
        Compression::new(level.get()),
    );
    encoder.write_all(data).map_err(|source| ExportError::Io {
        context: "zlib compression failed".into(),
        source,
    })?;
    encoder.finish().map_err(|source| ExportError::Io {
        context: "zlib compression failed".into(),
        source,
    })
}

/// Inflate a zlib stream.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|source| ExportError::Io {
            context: "zlib decompression failed".into(),
            source,
        })?;
    Ok(out)
}

/// `foo_4x4_rgb565_be.raw` → `foo_4x4_rgb565_be.raw.zlib`
pub fn compressed_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(ZLIB_EXTENSION);
    PathBuf::from(name)
}

/// Compressed size as a fraction of the raw size.
pub fn compression_ratio(raw_bytes: usize, compressed_bytes: usize) -> f64 {
    if raw_bytes == 0 {
        1.0
    } else {
        compressed_bytes as f64 / raw_bytes as f64
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompressOptions {
    pub level: CompressionLevel,
    /// Skip the `W * H * 2` size check
    pub force: bool,
    /// Replace an existing `.zlib` artifact
    pub overwrite: bool,
    /// Inflate the result and compare before writing
    pub verify: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// File name carries no `_<W>x<H>_rgb565_be.raw` tag
    NameMismatch,
    /// Output exists and overwrite was not requested
    AlreadyExists(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressOutcome {
    Compressed {
        output: PathBuf,
        raw_bytes: usize,
        compressed_bytes: usize,
    },
    Skipped(SkipReason),
}

/// Compress one raw export next to itself as `<name>.zlib`.
pub fn compress_raw_file(path: &Path, options: &CompressOptions) -> Result<CompressOutcome> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let Some((width, height)) = parse_raw_dimensions(&name) else {
        tracing::warn!("skip: {} (name must end with _<W>x<H>_rgb565_be.raw)", name);
        return Ok(CompressOutcome::Skipped(SkipReason::NameMismatch));
    };

    let Some(expected) = full_frame_size(width, height) else {
        return Err(ExportError::Format {
            name,
            source: FormatError::FrameTooLarge { width, height },
        });
    };
    let limit = MAX_RAW_BYTES.max(expected as u64);
    let data = read_file_with_limit(path, limit).map_err(|e| ExportError::read(&name, e))?;

    if data.len() != expected {
        if !options.force {
            return Err(ExportError::SizeMismatch {
                name,
                actual: data.len(),
                expected,
                width,
                height,
            });
        }
        tracing::warn!(
            "{}: size {} != {} (W={}, H={}), compressing anyway (--force)",
            name,
            data.len(),
            expected,
            width,
            height
        );
    }

    let output = compressed_path(path);
    if output.exists() && !options.overwrite {
        tracing::info!(
            "skip: {} already exists (use --overwrite to replace)",
            output.display()
        );
        return Ok(CompressOutcome::Skipped(SkipReason::AlreadyExists(output)));
    }

    let compressed = compress(&data, options.level)?;
    if options.verify && decompress(&compressed)? != data {
        return Err(ExportError::Verify { name });
    }

    write_atomic(&output, &compressed).map_err(|e| ExportError::write(&output, e))?;

    tracing::info!(
        "ok: {} -> {}  {} -> {} bytes ({:.2}%)",
        name,
        output.file_name().unwrap_or_default().to_string_lossy(),
        data.len(),
        compressed.len(),
        compression_ratio(data.len(), compressed.len()) * 100.0
    );

    Ok(CompressOutcome::Compressed {
        output,
        raw_bytes: data.len(),
        compressed_bytes: compressed.len(),
    })
}
