//! Image sources.
//!
//! The pipeline never opens files itself: callers hand it an [`ImageSource`]
//! (a file on disk, or bytes already in memory) and it decodes from there.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use rgbpack_shared::{MAX_IMAGE_BYTES, read_file_with_limit};

use crate::error::{ExportError, Result};

/// Something that can provide encoded image bytes.
pub trait ImageSource {
    /// Display name, also used to derive output file names.
    fn name(&self) -> &str;

    /// Location on disk, if any. Outputs default to this directory.
    fn path(&self) -> Option<&Path> {
        None
    }

    fn read_bytes(&self) -> Result<Vec<u8>>;
}

/// An image file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }
}

impl ImageSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        read_file_with_limit(&self.path, MAX_IMAGE_BYTES).map_err(|e| ExportError::read(&self.name, e))
    }
}

/// Encoded image bytes already in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    bytes: Vec<u8>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

impl ImageSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

/// Read and decode a source image.
pub fn load_image(source: &dyn ImageSource) -> Result<DynamicImage> {
    let bytes = source.read_bytes()?;
    image::load_from_memory(&bytes).map_err(|e| ExportError::ImageDecode {
        name: source.name().to_string(),
        source: e,
    })
}
