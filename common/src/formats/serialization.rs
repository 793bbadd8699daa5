//! Binary serialization trait for format headers.
//!
//! Each header keeps its type-specific `to_bytes()` returning a fixed-size
//! array; this trait gives generic readers a uniform entry point.

/// Trait for binary-serializable format headers.
pub trait BinarySerializable: Sized {
    /// Size of the serialized header in bytes.
    const SIZE: usize;

    /// Serialize to bytes.
    fn serialize(&self) -> Vec<u8>;

    /// Deserialize from bytes.
    ///
    /// Returns `None` if the byte slice is too short.
    fn deserialize(bytes: &[u8]) -> Option<Self>;
}

impl BinarySerializable for super::SpriteHeader {
    const SIZE: usize = Self::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}

impl BinarySerializable for super::RunHeader {
    const SIZE: usize = Self::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}
