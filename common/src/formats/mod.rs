//! rgbpack binary asset formats
//!
//! POD formats for embedded displays: every multi-byte field is a big-endian
//! `u16`, there are no magic bytes and no padding. The format is determined by
//! the artifact suffix (see [`naming`]).

pub mod frame;
pub mod naming;
mod serialization;
pub mod sprite;

pub use frame::*;
pub use naming::*;
pub use serialization::BinarySerializable;
pub use sprite::*;
