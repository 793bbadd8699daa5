//! Shared pixel codec and binary formats for rgbpack
//!
//! This crate is pure: no filesystem access and no image decoding. It is
//! shared between:
//! - `rgbpack-export` (asset pipeline and `rgbpack` CLI)
//! - firmware-side tooling that needs to read the artifacts back
//!
//! # Modules
//!
//! - [`rgb565`] - RGB888 → RGB565 conversion and big-endian serialization
//! - [`formats`] - sprite run-length, full-frame and raw naming conventions
//! - [`error`] - decode errors for the binary formats

pub mod error;
pub mod formats;
pub mod rgb565;

pub use error::FormatError;
pub use rgb565::{Rgb565, encode_rgb565_be};

// Re-export commonly used format items
pub use formats::{
    BinarySerializable,
    // Artifact suffixes
    FULL_FRAME_SUFFIX,
    // Limits
    MAX_RAW_DIMENSION,
    META_SUFFIX,
    RAW_SUFFIX,
    RunHeader,
    SPRITE_SUFFIX,
    SpriteFrame,
    SpriteHeader,
    SpriteRow,
    SpriteRun,
    SpriteWriter,
    ZLIB_EXTENSION,
    decode_full_frame,
    decode_sprite,
    full_frame_size,
    parse_raw_dimensions,
    raw_file_name,
};
