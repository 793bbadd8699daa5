//! Pixel-buffer encoders.
//!
//! - [`full_frame`] - dense row-major RGB565, every pixel written
//! - [`sprite`] - run-length sprite buffer skipping transparent spans
//! - [`raw`] - resize to exact dimensions, then dense encode

pub mod full_frame;
pub mod raw;
pub mod sprite;

pub use full_frame::{encode_dense, encode_full_frame};
pub use raw::{resize_and_encode, validate_raw_dimensions};
pub use sprite::{SpriteEncoding, encode_sprite, find_runs};
