//! Per-image export jobs.
//!
//! Each job decodes one source, composes every artifact in memory, then
//! writes each file once via [`write_atomic`].

use std::path::{Path, PathBuf};

use image::DynamicImage;
use rgbpack_common::{
    FULL_FRAME_SUFFIX, META_SUFFIX, SPRITE_SUFFIX, full_frame_size, raw_file_name,
};
use rgbpack_shared::write_atomic;

use crate::compress::{CompressionLevel, compress};
use crate::encode::{encode_full_frame, encode_sprite, resize_and_encode};
use crate::error::{ExportError, Result};
use crate::key_color::KeyColor;
use crate::metadata::AssetMetadata;
use crate::source::{ImageSource, load_image};

#[derive(Debug, Clone, Default)]
pub struct SpriteOptions {
    pub key: KeyColor,
    pub level: CompressionLevel,
    /// Output directory; defaults to the source's directory
    pub out_dir: Option<PathBuf>,
}

/// In-memory result of the sprite job, before anything is written.
#[derive(Debug, Clone)]
pub struct SpriteBundle {
    pub full_compressed: Vec<u8>,
    pub rle: Vec<u8>,
    pub metadata: AssetMetadata,
}

#[derive(Debug, Clone)]
pub struct SpriteArtifacts {
    pub full: PathBuf,
    pub sprite: PathBuf,
    pub meta: PathBuf,
    pub metadata: AssetMetadata,
}

#[derive(Debug, Clone)]
pub struct RawArtifact {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
}

/// Encode the full frame, sprite buffer and metadata for one image.
pub fn build_sprite_bundle(
    img: &DynamicImage,
    source_name: &str,
    key: &KeyColor,
    level: CompressionLevel,
) -> Result<SpriteBundle> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let full_raw = encode_full_frame(&rgba);
    let full_compressed = compress(&full_raw, level)?;
    let sprite = encode_sprite(&rgba, key)?;

    let metadata = AssetMetadata {
        source: source_name.to_string(),
        width,
        height,
        key: *key,
        full_raw_bytes: full_raw.len(),
        full_compressed_bytes: Some(full_compressed.len()),
        rle_bytes: Some(sprite.bytes.len()),
        opaque_pixels: sprite.opaque_pixels,
    };

    Ok(SpriteBundle {
        full_compressed,
        rle: sprite.bytes,
        metadata,
    })
}

/// Write `<stem>_full.rgb565.be.zlib`, `<stem>_sprite.rle.bin` and
/// `<stem>_sprite.meta.txt` for one source.
pub fn export_sprite(source: &dyn ImageSource, options: &SpriteOptions) -> Result<SpriteArtifacts> {
    let (dir, stem) = output_base(source, options.out_dir.as_deref())?;
    let img = load_image(source)?;
    let bundle = build_sprite_bundle(&img, source.name(), &options.key, options.level)?;

    let full = dir.join(format!("{stem}{FULL_FRAME_SUFFIX}"));
    let sprite = dir.join(format!("{stem}{SPRITE_SUFFIX}"));
    let meta = dir.join(format!("{stem}{META_SUFFIX}"));

    write_output(&full, &bundle.full_compressed)?;
    write_output(&sprite, &bundle.rle)?;
    write_output(&meta, bundle.metadata.to_string().as_bytes())?;

    tracing::info!(
        "[OK] {} -> {} ({} bytes RLE, {:.2}% opaque)",
        source.name(),
        sprite.file_name().unwrap_or_default().to_string_lossy(),
        bundle.rle.len(),
        bundle.metadata.opaque_fraction() * 100.0
    );

    Ok(SpriteArtifacts {
        full,
        sprite,
        meta,
        metadata: bundle.metadata,
    })
}

/// Resize to `width × height` and write `<stem>_<W>x<H>_rgb565_be.raw`.
pub fn export_raw(
    source: &dyn ImageSource,
    width: u32,
    height: u32,
    out_dir: Option<&Path>,
) -> Result<RawArtifact> {
    crate::encode::validate_raw_dimensions(width, height)?;
    let (dir, stem) = output_base(source, out_dir)?;
    let img = load_image(source)?;

    let bytes = resize_and_encode(&img, width, height)?;
    let expected = full_frame_size(width, height).ok_or_else(|| {
        ExportError::config(format!("{width}x{height} frame does not fit in memory"))
    })?;
    if bytes.len() != expected {
        return Err(ExportError::SizeMismatch {
            name: source.name().to_string(),
            actual: bytes.len(),
            expected,
            width,
            height,
        });
    }

    let path = dir.join(raw_file_name(&stem, width, height));
    write_output(&path, &bytes)?;

    tracing::info!(
        "Saved {} ({} bytes, expected {})",
        path.display(),
        bytes.len(),
        expected
    );

    Ok(RawArtifact {
        path,
        width,
        height,
        bytes: bytes.len(),
    })
}

/// Directory and file stem that outputs for `source` are named after.
pub(crate) fn output_base(source: &dyn ImageSource, out_dir: Option<&Path>) -> Result<(PathBuf, String)> {
    let stem = Path::new(source.name())
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            ExportError::config(format!("cannot derive an output name from {:?}", source.name()))
        })?;

    let dir = match (out_dir, source.path()) {
        (Some(dir), _) => dir.to_path_buf(),
        (None, Some(path)) => path.parent().map(Path::to_path_buf).unwrap_or_default(),
        (None, None) => {
            return Err(ExportError::config(format!(
                "{} has no location on disk; an output directory is required",
                source.name()
            )));
        }
    };

    Ok((dir, stem))
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            context: format!("creating {}", parent.display()),
            source,
        })?;
    }
    write_atomic(path, bytes).map_err(|e| ExportError::write(path, e))
}
