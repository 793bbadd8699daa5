//! Error kinds for the export pipeline.
//!
//! Skips (existing output, names without a dimension tag) are not errors;
//! see [`crate::compress::SkipReason`].

use std::path::PathBuf;

use rgbpack_common::FormatError;

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Source unreadable as an image or in an unsupported format
    #[error("failed to decode image {name}: {source}")]
    ImageDecode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    /// Raw buffer length disagrees with the dimensions in its name
    #[error("{name}: size {actual} != {expected} (W={width}, H={height}); use --force to override")]
    SizeMismatch {
        name: String,
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },

    /// Invalid parameter, raised before any file is touched
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to read {name}: {reason}")]
    Read { name: String, reason: String },

    #[error("failed to write {}: {reason}", .path.display())]
    Write { path: PathBuf, reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{name}: {source}")]
    Format {
        name: String,
        #[source]
        source: FormatError,
    },

    /// Encoder produced a field that does not fit the sprite layout
    #[error("sprite encoding failed: {0}")]
    Encode(#[from] FormatError),

    /// Two sources would write the same artifacts
    #[error("{name}: outputs {} already claimed by {}", .base.display(), .other.display())]
    OutputCollision {
        name: String,
        base: PathBuf,
        other: PathBuf,
    },

    #[error("{name}: compressed stream does not decompress to the original bytes")]
    Verify { name: String },
}

impl ExportError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn write(path: impl Into<PathBuf>, err: anyhow::Error) -> Self {
        Self::Write {
            path: path.into(),
            reason: format!("{err:#}"),
        }
    }

    pub fn read(name: impl Into<String>, err: anyhow::Error) -> Self {
        Self::Read {
            name: name.into(),
            reason: format!("{err:#}"),
        }
    }

    /// Configuration errors abort a run before any file is processed.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
