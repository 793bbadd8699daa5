//! rgbpack - RGB565 asset export tool
//!
//! Converts images (PNG, JPG, BMP, ...) to big-endian RGB565 buffers for
//! embedded displays: sprite run-length files, dense full frames and resized
//! raw exports, plus zlib compression of raw exports.
//!
//! # Exit status
//!
//! - `0` every file succeeded (skips count as success)
//! - `1` at least one file failed, or nothing was found to process
//! - `2` invalid arguments or manifest values; nothing was touched

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use rgbpack_export::batch::{self, BatchSummary, DEFAULT_IMAGE_EXTENSIONS};
use rgbpack_export::inspect::inspect_sprite_file;
use rgbpack_export::manifest::{self, MANIFEST_FILE};
use rgbpack_export::{
    CompressOptions, CompressionLevel, ExportError, FileSource, KeyColor, SpriteOptions,
    export_raw,
};

#[derive(Parser)]
#[command(name = "rgbpack")]
#[command(about = "RGB565 asset export tool for embedded displays")]
#[command(version)]
struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Worker threads for batches (default: one per core)
    #[arg(short, long, global = true)]
    jobs: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export sprites: full frame (zlib), run-length sprite and metadata per image
    Sprite {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Transparent key color (RRGGBB)
        #[arg(short, long, default_value = "8BE308")]
        key: String,

        /// zlib level for the full frame (0-9)
        #[arg(short, long, default_value_t = 9)]
        level: u32,

        /// Output directory (default: next to each image)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Recurse into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Extensions scanned in directories
        #[arg(long = "ext", value_delimiter = ',')]
        extensions: Vec<String>,
    },

    /// Resize one image and export it as <name>_<W>x<H>_rgb565_be.raw
    Raw {
        /// Input image
        input: PathBuf,

        /// Output width in pixels (1-4096)
        #[arg(short = 'W', long)]
        width: u32,

        /// Output height in pixels (1-4096)
        #[arg(short = 'H', long)]
        height: u32,

        /// Output directory (default: next to the image)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// zlib-compress *_<W>x<H>_rgb565_be.raw files to .raw.zlib
    Compress {
        /// Directory (or single file) to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Compression level 0-9
        #[arg(short, long, default_value_t = 9)]
        level: u32,

        /// Ignore the W*H*2 size check derived from the file name
        #[arg(short, long)]
        force: bool,

        /// Overwrite existing .zlib files
        #[arg(short, long)]
        overwrite: bool,

        /// Recurse into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Decompress and compare before writing
        #[arg(long)]
        verify: bool,
    },

    /// Run every job of a manifest file
    Build {
        /// Path to rgbpack.toml manifest
        #[arg(default_value = MANIFEST_FILE)]
        manifest: PathBuf,
    },

    /// Decode a sprite run-length file and print its statistics
    Inspect {
        /// Input _sprite.rle.bin file
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            let config = e
                .downcast_ref::<ExportError>()
                .is_some_and(ExportError::is_config);
            tracing::error!("{:#}", e);
            if config {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let jobs = cli.jobs;

    match cli.command {
        Commands::Sprite {
            inputs,
            key,
            level,
            out_dir,
            recursive,
            extensions,
        } => {
            let options = SpriteOptions {
                key: key.parse::<KeyColor>()?,
                level: CompressionLevel::new(level)?,
                out_dir,
            };
            let extensions = if extensions.is_empty() {
                DEFAULT_IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect()
            } else {
                extensions
            };
            tracing::debug!("Key color {} ({})", options.key, options.key.to_rgb565());

            let summary = batch::sprite_batch(&inputs, &extensions, recursive, &options, jobs)?;
            Ok(exit_code(summary))
        }

        Commands::Raw {
            input,
            width,
            height,
            out_dir,
        } => {
            tracing::info!("Converting {:?} -> {}x{}", input, width, height);
            export_raw(&FileSource::new(&input), width, height, out_dir.as_deref())?;
            tracing::info!("Done!");
            Ok(ExitCode::SUCCESS)
        }

        Commands::Compress {
            path,
            level,
            force,
            overwrite,
            recursive,
            verify,
        } => {
            let options = CompressOptions {
                level: CompressionLevel::new(level)?,
                force,
                overwrite,
                verify,
            };
            let summary = batch::compress_batch(&path, recursive, &options, jobs)?;
            Ok(exit_code(summary))
        }

        Commands::Build { manifest } => {
            tracing::info!("Building assets from {:?}", manifest);
            let ctx = manifest::load_manifest(&manifest)
                .map_err(|e| ExportError::config(format!("{e:#}")))?;
            let plan = ctx.plan()?;
            if ctx.manifest.job_count() == 0 {
                tracing::warn!("Manifest has no jobs");
                return Ok(ExitCode::SUCCESS);
            }
            let summary = manifest::build_all(&plan, jobs)?;
            Ok(exit_code(Some(summary)))
        }

        Commands::Inspect { input } => {
            let stats = inspect_sprite_file(&input)?;
            let header = &stats.header;
            println!("{}", input.display());
            println!("  Size: {}x{}", header.width, header.height);
            println!("  Key RGB565: {}", header.key_color);
            println!("  File: {} bytes (dense: {} bytes)", stats.file_bytes, stats.dense_bytes());
            println!("  Runs: {} (longest {} px)", stats.runs, stats.longest_run);
            println!("  Empty rows: {}/{}", stats.empty_rows, header.height);
            println!(
                "  Opaque kept: {}/{}",
                stats.opaque_pixels,
                header.pixel_count()
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(summary: Option<BatchSummary>) -> ExitCode {
    match summary {
        Some(summary) => {
            tracing::info!(
                "{} succeeded, {} skipped, {} failed",
                summary.succeeded,
                summary.skipped,
                summary.failed
            );
            if summary.all_succeeded() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        None => ExitCode::FAILURE,
    }
}
