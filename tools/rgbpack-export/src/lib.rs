//! rgbpack-export library
//!
//! Image → RGB565 asset conversion for embedded displays. The `rgbpack`
//! binary is a thin CLI over these functions.
//!
//! # Pipeline
//!
//! ```text
//! ImageSource → decode → (resize) → RGB565 → dense / sprite RLE → (zlib) → file + meta
//! ```

pub mod batch;
pub mod compress;
pub mod encode;
pub mod error;
pub mod export;
pub mod inspect;
pub mod key_color;
pub mod manifest;
pub mod metadata;
pub mod source;

pub use error::{ExportError, Result};

// Re-export the pieces most callers need
pub use batch::{BatchSummary, FileStatus, discover_files, run_batch};
pub use compress::{
    CompressOptions, CompressOutcome, CompressionLevel, SkipReason, compress, compress_raw_file,
    decompress,
};
pub use encode::{
    SpriteEncoding, encode_full_frame, encode_sprite, find_runs, resize_and_encode,
    validate_raw_dimensions,
};
pub use export::{
    RawArtifact, SpriteArtifacts, SpriteBundle, SpriteOptions, build_sprite_bundle, export_raw,
    export_sprite,
};
pub use key_color::{DEFAULT_KEY_COLOR, KeyColor, PixelClass};
pub use metadata::AssetMetadata;
pub use source::{FileSource, ImageSource, MemorySource, load_image};
