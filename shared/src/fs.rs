//! Filesystem helpers shared across rgbpack tools.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};

/// Maximum allowed source image size for reading into memory.
pub const MAX_IMAGE_BYTES: u64 = 64 * 1024 * 1024; // 64 MiB
/// Maximum allowed raw RGB565 buffer size (4096 × 4096 × 2 bytes).
pub const MAX_RAW_BYTES: u64 = 4096 * 4096 * 2;

/// Read a file into memory with a size cap.
pub fn read_file_with_limit(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;
    let len = metadata.len();
    if len > max_bytes {
        anyhow::bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            len,
            max_bytes
        );
    }
    std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write a fully composed buffer to `path` without ever exposing a partial file.
///
/// The bytes go to a hidden sibling file first, which is then renamed over the
/// destination. A failure at any point leaves the previous destination (if any)
/// untouched and removes the temporary file. Concurrent writers to the same
/// destination each use their own temporary file, so the last rename wins and
/// the contents are never interleaved.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = temp_sibling(path);

    let result = (|| -> Result<()> {
        let mut file = std::fs::File::create(&tmp)
            .with_context(|| format!("Failed to create file: {}", tmp.display()))?;
        file.write_all(bytes)
            .with_context(|| format!("Failed to write file: {}", tmp.display()))?;
        file.sync_all()
            .with_context(|| format!("Failed to flush file: {}", tmp.display()))?;
        drop(file);
        std::fs::rename(&tmp, path).with_context(|| {
            format!("Failed to move {} into place at {}", tmp.display(), path.display())
        })
    })();

    if result.is_err() && tmp.exists() {
        if let Err(e) = std::fs::remove_file(&tmp) {
            tracing::warn!("Failed to clean up {}: {}", tmp.display(), e);
        }
    }

    result
}

fn temp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{}.{}.{}.tmp", file_name, std::process::id(), seq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_file_with_limit_rejects_large_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.bin");
        std::fs::write(&path, vec![0u8; 16]).unwrap();

        assert!(read_file_with_limit(&path, 8).is_err());
        assert_eq!(read_file_with_limit(&path, 16).unwrap().len(), 16);
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.bin");
        std::fs::write(&path, b"old contents").unwrap();

        write_atomic(&path, b"new").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"new");
        // No temporary file left behind
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_write_atomic_missing_directory_fails_cleanly() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.bin");

        assert!(write_atomic(&path, b"data").is_err());
        assert!(!path.exists());
    }
}
