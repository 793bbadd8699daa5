//! RGB565 pixel codec.
//!
//! # Layout
//! ```text
//! bit 15        11 10          5 4         0
//!     R R R R R    G G G G G G    B B B B B
//! ```
//!
//! Values are always serialized big-endian (high byte first), which is what
//! SPI display controllers and `embedded-graphics` `ImageRaw<Rgb565>` expect.

/// A packed 5/6/5-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    /// Serialized size in bytes.
    pub const SIZE: usize = 2;

    /// Pack 8-bit channels by truncating to the top 5/6/5 bits.
    #[inline]
    pub const fn from_rgb888(r: u8, g: u8, b: u8) -> Self {
        Self((((r & 0xF8) as u16) << 8) | (((g & 0xFC) as u16) << 3) | ((b >> 3) as u16))
    }

    #[inline]
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    #[inline]
    pub const fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }

    #[inline]
    pub const fn r5(self) -> u8 {
        (self.0 >> 11) as u8
    }

    #[inline]
    pub const fn g6(self) -> u8 {
        ((self.0 >> 5) & 0x3F) as u8
    }

    #[inline]
    pub const fn b5(self) -> u8 {
        (self.0 & 0x1F) as u8
    }

    /// Expand back to 8-bit channels with bit replication, so pure white and
    /// black survive the round trip exactly.
    #[inline]
    pub const fn to_rgb888(self) -> (u8, u8, u8) {
        let r = self.r5();
        let g = self.g6();
        let b = self.b5();
        ((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
    }
}

impl From<Rgb565> for u16 {
    fn from(value: Rgb565) -> Self {
        value.0
    }
}

impl std::fmt::Display for Rgb565 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

/// Convert one pixel straight to its two big-endian bytes.
#[inline]
pub const fn encode_rgb565_be(r: u8, g: u8, b: u8) -> [u8; 2] {
    Rgb565::from_rgb888(r, g, b).to_be_bytes()
}
