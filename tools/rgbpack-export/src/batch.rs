//! Batch discovery and execution.
//!
//! Files are independent, so a batch runs on a rayon pool. One failing file
//! never stops the others; the returned [`BatchSummary`] tells the caller
//! whether everything succeeded.

use std::collections::HashMap;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::compress::{CompressOptions, CompressOutcome, compress_raw_file};
use crate::error::{ExportError, Result};
use crate::export::{SpriteOptions, export_sprite, output_base};
use crate::source::FileSource;

/// Default extensions picked up by sprite batches.
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["png"];
/// Extension picked up by compression batches.
pub const RAW_EXTENSION: &str = "raw";

/// Outcome of a single successful file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Done,
    /// Nothing to do (existing output, name without dimensions, ...)
    Skipped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }

    /// Skips count as success.
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, result: &Result<FileStatus>) {
        match result {
            Ok(FileStatus::Done) => self.succeeded += 1,
            Ok(FileStatus::Skipped) => self.skipped += 1,
            Err(_) => self.failed += 1,
        }
    }
}

impl AddAssign for BatchSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.succeeded += rhs.succeeded;
        self.skipped += rhs.skipped;
        self.failed += rhs.failed;
    }
}

/// Find files under `root` whose extension matches one of `extensions`
/// (case-insensitive, without the dot). A file `root` is returned as-is.
pub fn discover_files(root: &Path, extensions: &[String], recursive: bool) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.is_dir() {
        return Err(ExportError::Read {
            name: root.display().to_string(),
            reason: "no such file or directory".into(),
        });
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| has_extension(path, extensions))
        .collect();

    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|want| want.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
}

/// Run `job` over every file, in parallel, and summarize.
///
/// Duplicate paths are dropped first so no two workers ever produce the same
/// artifact. `jobs = None` uses rayon's default thread count.
pub fn run_batch<F>(files: Vec<PathBuf>, jobs: Option<usize>, job: F) -> Result<BatchSummary>
where
    F: Fn(&Path) -> Result<FileStatus> + Sync,
{
    let files = dedup_paths(files);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.unwrap_or(0))
        .build()
        .map_err(|e| ExportError::config(format!("failed to start worker pool: {e}")))?;

    let results: Vec<(PathBuf, Result<FileStatus>)> = pool.install(|| {
        files
            .into_par_iter()
            .map(|path| {
                let result = job(&path);
                (path, result)
            })
            .collect()
    });

    let mut summary = BatchSummary::default();
    for (path, result) in &results {
        match result {
            Ok(FileStatus::Done) => tracing::debug!("done: {}", path.display()),
            Ok(FileStatus::Skipped) => tracing::debug!("skipped: {}", path.display()),
            Err(e) => tracing::error!("fail: {}: {}", path.display(), e),
        }
        summary.record(result);
    }

    Ok(summary)
}

/// Export every image found under `inputs` as a sprite.
///
/// Returns `Ok(None)` when no input file was found.
pub fn sprite_batch(
    inputs: &[PathBuf],
    extensions: &[String],
    recursive: bool,
    options: &SpriteOptions,
    jobs: Option<usize>,
) -> Result<Option<BatchSummary>> {
    let mut files = Vec::new();
    for input in inputs {
        files.extend(discover_files(input, extensions, recursive)?);
    }
    if files.is_empty() {
        tracing::warn!("No images found (extensions: {})", extensions.join(", "));
        return Ok(None);
    }

    let (files, collisions) = claim_sprite_outputs(dedup_paths(files), options);

    tracing::info!("Exporting {} sprite(s)", files.len());
    let mut summary = run_batch(files, jobs, |path| {
        export_sprite(&FileSource::new(path), options).map(|_| FileStatus::Done)
    })?;
    for err in &collisions {
        tracing::error!("fail: {}", err);
    }
    summary.failed += collisions.len();
    Ok(Some(summary))
}

/// Assign each output base (directory + stem) to the first file that maps to
/// it. Later files with the same base become per-file errors instead of
/// racing on, or silently replacing, the same three artifacts.
///
/// Stems are compared case-insensitively so `A.png` and `a.bmp` collide on
/// case-insensitive filesystems too.
fn claim_sprite_outputs(
    files: Vec<PathBuf>,
    options: &SpriteOptions,
) -> (Vec<PathBuf>, Vec<ExportError>) {
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
    let mut unique = Vec::with_capacity(files.len());
    let mut collisions = Vec::new();

    for path in files {
        // Files without a usable base fail inside the job with their own error
        let Ok((dir, stem)) = output_base(&FileSource::new(&path), options.out_dir.as_deref()) else {
            unique.push(path);
            continue;
        };
        let base = dir.join(stem.to_lowercase());
        match claimed.get(&base) {
            Some(first) => collisions.push(ExportError::OutputCollision {
                name: path.display().to_string(),
                base: dir.join(&stem),
                other: first.clone(),
            }),
            None => {
                claimed.insert(base, path.clone());
                unique.push(path);
            }
        }
    }

    (unique, collisions)
}

/// Compress every `*.raw` export under `root`.
///
/// Returns `Ok(None)` when no raw file was found.
pub fn compress_batch(
    root: &Path,
    recursive: bool,
    options: &CompressOptions,
    jobs: Option<usize>,
) -> Result<Option<BatchSummary>> {
    let files = discover_files(root, &[RAW_EXTENSION.to_string()], recursive)?;
    if files.is_empty() {
        tracing::warn!("No *.{} files found in {}", RAW_EXTENSION, root.display());
        return Ok(None);
    }

    let summary = run_batch(files, jobs, |path| {
        compress_raw_file(path, options).map(|outcome| match outcome {
            CompressOutcome::Compressed { .. } => FileStatus::Done,
            CompressOutcome::Skipped(_) => FileStatus::Skipped,
        })
    })?;
    tracing::info!(
        "done: {}/{} files processed.",
        summary.succeeded + summary.skipped,
        summary.total()
    );
    Ok(Some(summary))
}

fn dedup_paths(files: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut keyed: Vec<(PathBuf, PathBuf)> = files
        .into_iter()
        .map(|p| (std::fs::canonicalize(&p).unwrap_or_else(|_| p.clone()), p))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.dedup_by(|a, b| a.0 == b.0);
    keyed.into_iter().map(|(_, p)| p).collect()
}
