//! rgbpack.toml build manifest
//!
//! Lists every export job of a project so a single `rgbpack build` refreshes
//! all artifacts. Paths are relative to the manifest's directory.
//!
//! ```toml
//! [defaults]
//! key_color = "#8BE308"
//! level = 9
//! out_dir = "build"
//!
//! [[sprites]]
//! path = "art/alien.png"
//!
//! [[raw]]
//! path = "art/bg.png"
//! width = 240
//! height = 240
//! compress = true
//!
//! [[compress]]
//! path = "assets"
//! recursive = true
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::batch::{self, BatchSummary, DEFAULT_IMAGE_EXTENSIONS};
use crate::compress::{CompressOptions, CompressOutcome, CompressionLevel, compress_raw_file};
use crate::encode::validate_raw_dimensions;
use crate::error::ExportError;
use crate::export::{SpriteOptions, export_raw};
use crate::key_color::KeyColor;
use crate::source::FileSource;

/// Default manifest file name
pub const MANIFEST_FILE: &str = "rgbpack.toml";

/// rgbpack.toml manifest structure
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildManifest {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub sprites: Vec<SpriteEntry>,
    #[serde(default)]
    pub raw: Vec<RawEntry>,
    #[serde(default)]
    pub compress: Vec<CompressEntry>,
}

/// Values applied to every job unless the job overrides them
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    /// Key color as RRGGBB hex. Default: #8BE308
    pub key_color: Option<String>,
    /// zlib level 0-9. Default: 9
    pub level: Option<u32>,
    /// Output directory. Default: next to each source
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpriteEntry {
    /// Image file or directory
    pub path: PathBuf,
    #[serde(default)]
    pub recursive: bool,
    pub key_color: Option<String>,
    /// Extensions scanned in directories. Default: ["png"]
    pub extensions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawEntry {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Also write `<name>.raw.zlib`
    #[serde(default)]
    pub compress: bool,
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompressEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default)]
    pub verify: bool,
    pub level: Option<u32>,
}

impl BuildManifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse rgbpack.toml")
    }

    pub fn job_count(&self) -> usize {
        self.sprites.len() + self.raw.len() + self.compress.len()
    }
}

/// Manifest plus the directory its paths are relative to
#[derive(Debug)]
pub struct ManifestContext {
    pub manifest: BuildManifest,
    pub project_dir: PathBuf,
}

pub fn load_manifest(manifest_path: &Path) -> Result<ManifestContext> {
    let manifest = BuildManifest::load(manifest_path)?;
    let project_dir = manifest_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    Ok(ManifestContext {
        manifest,
        project_dir,
    })
}

#[derive(Debug, Clone)]
pub struct SpriteJob {
    pub path: PathBuf,
    pub recursive: bool,
    pub extensions: Vec<String>,
    pub options: SpriteOptions,
}

#[derive(Debug, Clone)]
pub struct RawJob {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub out_dir: Option<PathBuf>,
    /// Compress the export afterwards at this level
    pub compress: Option<CompressionLevel>,
}

#[derive(Debug, Clone)]
pub struct CompressJob {
    pub path: PathBuf,
    pub recursive: bool,
    pub options: CompressOptions,
}

/// Fully validated jobs with absolute-or-project-relative paths
#[derive(Debug, Clone, Default)]
pub struct BuildPlan {
    pub sprites: Vec<SpriteJob>,
    pub raw: Vec<RawJob>,
    pub compress: Vec<CompressJob>,
}

impl ManifestContext {
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }

    /// Validate every job and resolve defaults. Nothing is read or written.
    pub fn plan(&self) -> Result<BuildPlan, ExportError> {
        let defaults = &self.manifest.defaults;
        let default_key = parse_key(defaults.key_color.as_deref())?;
        let default_level = parse_level(defaults.level)?;
        let default_out = defaults.out_dir.as_deref().map(|p| self.resolve_path(p));

        let sprites = self
            .manifest
            .sprites
            .iter()
            .map(|entry| -> Result<SpriteJob, ExportError> {
                let key = match entry.key_color.as_deref() {
                    Some(text) => text.parse::<KeyColor>()?,
                    None => default_key,
                };
                Ok(SpriteJob {
                    path: self.resolve_path(&entry.path),
                    recursive: entry.recursive,
                    extensions: entry.extensions.clone().unwrap_or_else(|| {
                        DEFAULT_IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect()
                    }),
                    options: SpriteOptions {
                        key,
                        level: default_level,
                        out_dir: default_out.clone(),
                    },
                })
            })
            .collect::<Result<Vec<_>, ExportError>>()?;

        let raw = self
            .manifest
            .raw
            .iter()
            .map(|entry| -> Result<RawJob, ExportError> {
                validate_raw_dimensions(entry.width, entry.height)?;
                Ok(RawJob {
                    path: self.resolve_path(&entry.path),
                    width: entry.width,
                    height: entry.height,
                    out_dir: entry
                        .out_dir
                        .as_deref()
                        .map(|p| self.resolve_path(p))
                        .or_else(|| default_out.clone()),
                    compress: entry.compress.then_some(default_level),
                })
            })
            .collect::<Result<Vec<_>, ExportError>>()?;

        let compress = self
            .manifest
            .compress
            .iter()
            .map(|entry| -> Result<CompressJob, ExportError> {
                let level = match entry.level {
                    Some(level) => CompressionLevel::new(level)?,
                    None => default_level,
                };
                Ok(CompressJob {
                    path: self.resolve_path(&entry.path),
                    recursive: entry.recursive,
                    options: CompressOptions {
                        level,
                        force: entry.force,
                        overwrite: entry.overwrite,
                        verify: entry.verify,
                    },
                })
            })
            .collect::<Result<Vec<_>, ExportError>>()?;

        Ok(BuildPlan {
            sprites,
            raw,
            compress,
        })
    }
}

fn parse_key(text: Option<&str>) -> Result<KeyColor, ExportError> {
    text.map_or(Ok(KeyColor::default()), str::parse)
}

fn parse_level(level: Option<u32>) -> Result<CompressionLevel, ExportError> {
    level.map_or(Ok(CompressionLevel::default()), CompressionLevel::new)
}

/// Run every job of a plan: sprites, then raw exports, then compression.
///
/// Per-file failures are counted, not propagated; only discovery and
/// configuration problems abort the build.
pub fn build_all(plan: &BuildPlan, jobs: Option<usize>) -> Result<BatchSummary, ExportError> {
    let mut summary = BatchSummary::default();

    for job in &plan.sprites {
        let paths = std::slice::from_ref(&job.path);
        if let Some(s) = batch::sprite_batch(paths, &job.extensions, job.recursive, &job.options, jobs)? {
            summary += s;
        }
    }

    // Raw entries are independent jobs: one source may be listed at several sizes
    for job in &plan.raw {
        match run_raw_job(job) {
            Ok(_) => summary.succeeded += 1,
            Err(e) => {
                tracing::error!("fail: {}: {}", job.path.display(), e);
                summary.failed += 1;
            }
        }
    }

    for job in &plan.compress {
        if let Some(s) = batch::compress_batch(&job.path, job.recursive, &job.options, jobs)? {
            summary += s;
        }
    }

    Ok(summary)
}

fn run_raw_job(job: &RawJob) -> Result<(), ExportError> {
    let artifact = export_raw(
        &FileSource::new(&job.path),
        job.width,
        job.height,
        job.out_dir.as_deref(),
    )?;

    if let Some(level) = job.compress {
        let options = CompressOptions {
            level,
            overwrite: true,
            verify: true,
            ..Default::default()
        };
        if let CompressOutcome::Skipped(reason) = compress_raw_file(&artifact.path, &options)? {
            tracing::warn!("{}: compression skipped ({:?})", artifact.path.display(), reason);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    #[test]
    fn test_manifest_parsing() {
        let manifest = BuildManifest::parse(
            r##"
[defaults]
key_color = "#FF00FF"
level = 6
out_dir = "build"

[[sprites]]
path = "art"
recursive = true
extensions = ["png", "bmp"]

[[raw]]
path = "art/bg.png"
width = 240
height = 240
compress = true

[[compress]]
path = "assets"
force = true
"##,
        )
        .unwrap();

        assert_eq!(manifest.job_count(), 3);
        assert_eq!(manifest.defaults.level, Some(6));
        assert_eq!(manifest.sprites[0].extensions.as_ref().unwrap().len(), 2);
        assert!(manifest.raw[0].compress);
        assert!(manifest.compress[0].force);
        assert!(!manifest.compress[0].overwrite);
    }

    #[test]
    fn test_manifest_minimal() {
        let manifest = BuildManifest::parse("").unwrap();
        assert_eq!(manifest.job_count(), 0);
        assert!(manifest.defaults.key_color.is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(BuildManifest::parse("[defaults]\nlevl = 3\n").is_err());
    }

    #[test]
    fn test_plan_resolves_defaults() {
        let ctx = ManifestContext {
            manifest: BuildManifest::parse(
                r##"
[defaults]
key_color = "FF00FF"
out_dir = "out"

[[sprites]]
path = "a.png"

[[sprites]]
path = "b.png"
key_color = "#000000"

[[compress]]
path = "/abs/raw"
level = 1
"##,
            )
            .unwrap(),
            project_dir: PathBuf::from("/project"),
        };

        let plan = ctx.plan().unwrap();
        assert_eq!(plan.sprites[0].path, PathBuf::from("/project/a.png"));
        assert_eq!(plan.sprites[0].options.key, KeyColor::new(255, 0, 255));
        assert_eq!(plan.sprites[0].options.out_dir, Some(PathBuf::from("/project/out")));
        assert_eq!(plan.sprites[0].extensions, vec!["png".to_string()]);
        assert_eq!(plan.sprites[1].options.key, KeyColor::new(0, 0, 0));
        assert_eq!(plan.sprites[1].options.level.get(), 9);
        assert_eq!(plan.compress[0].path, PathBuf::from("/abs/raw"));
        assert_eq!(plan.compress[0].options.level.get(), 1);
    }

    #[test]
    fn test_plan_rejects_bad_values() {
        let cases = [
            "[defaults]\nlevel = 10\n",
            "[defaults]\nkey_color = \"lime\"\n",
            "[[raw]]\npath = \"x.png\"\nwidth = 0\nheight = 10\n",
            "[[raw]]\npath = \"x.png\"\nwidth = 10\nheight = 5000\n",
            "[[compress]]\npath = \"x\"\nlevel = 12\n",
        ];
        for case in cases {
            let ctx = ManifestContext {
                manifest: BuildManifest::parse(case).unwrap(),
                project_dir: PathBuf::from("."),
            };
            let err = ctx.plan().unwrap_err();
            assert!(err.is_config(), "{case:?} should be a config error, got {err}");
        }
    }

    #[test]
    fn test_build_all() {
        let dir = tempdir().unwrap();
        let art = dir.path().join("art");
        std::fs::create_dir_all(&art).unwrap();
        RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]))
            .save(art.join("ship.png"))
            .unwrap();

        let manifest_path = dir.path().join(MANIFEST_FILE);
        std::fs::write(
            &manifest_path,
            r#"
[[sprites]]
path = "art"

[[raw]]
path = "art/ship.png"
width = 2
height = 3
compress = true
"#,
        )
        .unwrap();

        let ctx = load_manifest(&manifest_path).unwrap();
        let plan = ctx.plan().unwrap();
        let summary = build_all(&plan, Some(2)).unwrap();

        assert!(summary.all_succeeded());
        assert_eq!(summary.succeeded, 2);
        assert!(art.join("ship_sprite.rle.bin").exists());
        assert!(art.join("ship_full.rgb565.be.zlib").exists());
        assert!(art.join("ship_sprite.meta.txt").exists());
        assert_eq!(std::fs::read(art.join("ship_2x3_rgb565_be.raw")).unwrap().len(), 12);
        assert!(art.join("ship_2x3_rgb565_be.raw.zlib").exists());
    }
}
