//! Shared helpers for rgbpack tools.
//!
//! Everything here is format-agnostic: the codecs live in `rgbpack-common`
//! and the image pipeline in `rgbpack-export`.

mod fs;

pub use fs::{MAX_IMAGE_BYTES, MAX_RAW_BYTES, read_file_with_limit, write_atomic};
