//! Sprite run-length format (`_sprite.rle.bin`)
//!
//! Stores only the visible pixels of a sprite. Transparent spans (key-colored
//! or alpha-zero pixels at encode time) are implicit gaps between runs.
//!
//! # Layout
//! ```text
//! 0x00: width u16 BE
//! 0x02: height u16 BE
//! 0x04: key_color u16 BE (RGB565)
//! 0x06: rows[height]
//!
//! row:
//!   run_count u16 BE
//!   runs[run_count]
//!
//! run:
//!   start_x u16 BE
//!   length u16 BE
//!   pixels[length] (u16 BE RGB565 each)
//! ```
//!
//! There is no per-row length field: a reader tracks its own row index and
//! stops after `run_count` runs.

use crate::error::FormatError;
use crate::formats::BinarySerializable;
use crate::rgb565::Rgb565;

/// Sprite header (6 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteHeader {
    pub width: u16,
    pub height: u16,
    pub key_color: Rgb565,
}

impl SpriteHeader {
    pub const SIZE: usize = 6;

    pub fn new(width: u16, height: u16, key_color: Rgb565) -> Self {
        Self {
            width,
            height,
            key_color,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Upper bound on the encoded size of a sprite with this header.
    ///
    /// Per row: the run count, at most `ceil(width / 2)` run headers and at
    /// most `width` pixels.
    pub fn max_encoded_size(&self) -> u64 {
        let width = self.width as u64;
        let row = 2 + width.div_ceil(2) * RunHeader::SIZE as u64 + width * Rgb565::SIZE as u64;
        Self::SIZE as u64 + self.height as u64 * row
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..2].copy_from_slice(&self.width.to_be_bytes());
        bytes[2..4].copy_from_slice(&self.height.to_be_bytes());
        bytes[4..6].copy_from_slice(&self.key_color.to_be_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            width: u16::from_be_bytes([bytes[0], bytes[1]]),
            height: u16::from_be_bytes([bytes[2], bytes[3]]),
            key_color: Rgb565::from_be_bytes([bytes[4], bytes[5]]),
        })
    }
}

/// Per-run header (4 bytes), followed by `len` pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunHeader {
    pub start: u16,
    pub len: u16,
}

impl RunHeader {
    pub const SIZE: usize = 4;

    pub fn new(start: u16, len: u16) -> Self {
        Self { start, len }
    }

    /// First column after the run
    pub fn end(&self) -> u32 {
        self.start as u32 + self.len as u32
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..2].copy_from_slice(&self.start.to_be_bytes());
        bytes[2..4].copy_from_slice(&self.len.to_be_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            start: u16::from_be_bytes([bytes[0], bytes[1]]),
            len: u16::from_be_bytes([bytes[2], bytes[3]]),
        })
    }
}

/// Incremental writer for the sprite layout.
///
/// Rows must be written in order; each `begin_row` declares how many runs
/// follow. Counts and lengths that do not fit their u16 fields are errors.
#[derive(Debug)]
pub struct SpriteWriter {
    header: SpriteHeader,
    buf: Vec<u8>,
    rows: u16,
    /// Runs declared / pushed for the current row
    declared: usize,
    pushed: usize,
    prev_end: u32,
}

impl SpriteWriter {
    pub fn new(header: SpriteHeader) -> Self {
        let mut buf = Vec::with_capacity(SpriteHeader::SIZE + header.height as usize * 2);
        buf.extend_from_slice(&header.to_bytes());
        Self {
            header,
            buf,
            rows: 0,
            declared: 0,
            pushed: 0,
            prev_end: 0,
        }
    }

    pub fn header(&self) -> &SpriteHeader {
        &self.header
    }

    pub fn begin_row(&mut self, run_count: usize) -> Result<(), FormatError> {
        self.check_row_complete()?;
        if self.rows >= self.header.height {
            return Err(FormatError::RowCount {
                expected: self.header.height,
                written: self.rows as usize + 1,
            });
        }
        let row = self.rows as usize;
        let count = u16::try_from(run_count).map_err(|_| FormatError::TooManyRuns {
            row,
            count: run_count,
        })?;
        self.buf.extend_from_slice(&count.to_be_bytes());
        self.rows += 1;
        self.declared = run_count;
        self.pushed = 0;
        self.prev_end = 0;
        Ok(())
    }

    pub fn push_run<I>(&mut self, start: u16, pixels: I) -> Result<(), FormatError>
    where
        I: ExactSizeIterator<Item = Rgb565>,
    {
        let row = (self.rows as usize).saturating_sub(1);
        if self.rows == 0 || self.pushed >= self.declared {
            return Err(FormatError::TooManyRuns {
                row,
                count: self.pushed + 1,
            });
        }
        let len = pixels.len();
        if len == 0 {
            return Err(FormatError::EmptyRun {
                row,
                run: self.pushed,
            });
        }
        let len16 = u16::try_from(len).map_err(|_| FormatError::RunTooLong { row, len })?;
        let run = RunHeader::new(start, len16);
        if run.end() > self.header.width as u32 {
            return Err(FormatError::RunOutOfBounds {
                row,
                start,
                len: len16,
                width: self.header.width,
            });
        }
        if self.pushed > 0 && (start as u32) < self.prev_end {
            return Err(FormatError::RunOrder {
                row,
                start,
                prev_end: self.prev_end,
            });
        }

        self.buf.extend_from_slice(&run.to_bytes());
        self.buf.reserve(len * Rgb565::SIZE);
        for px in pixels {
            self.buf.extend_from_slice(&px.to_be_bytes());
        }
        self.pushed += 1;
        self.prev_end = run.end();
        Ok(())
    }

    pub fn rows_written(&self) -> u16 {
        self.rows
    }

    pub fn finish(self) -> Result<Vec<u8>, FormatError> {
        self.check_row_complete()?;
        if self.rows != self.header.height {
            return Err(FormatError::RowCount {
                expected: self.header.height,
                written: self.rows as usize,
            });
        }
        Ok(self.buf)
    }

    fn check_row_complete(&self) -> Result<(), FormatError> {
        if self.rows > 0 && self.pushed != self.declared {
            return Err(FormatError::RunCount {
                row: self.rows as usize - 1,
                declared: self.declared,
                written: self.pushed,
            });
        }
        Ok(())
    }
}

/// One decoded run: start column plus its pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteRun {
    pub start: u16,
    pub pixels: Vec<Rgb565>,
}

impl SpriteRun {
    pub fn end(&self) -> usize {
        self.start as usize + self.pixels.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpriteRow {
    pub runs: Vec<SpriteRun>,
}

/// A fully decoded sprite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteFrame {
    pub header: SpriteHeader,
    pub rows: Vec<SpriteRow>,
}

impl SpriteFrame {
    /// Number of pixels carried in runs.
    pub fn opaque_pixels(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.runs.iter())
            .map(|run| run.pixels.len())
            .sum()
    }

    pub fn run_count(&self) -> usize {
        self.rows.iter().map(|row| row.runs.len()).sum()
    }

    /// Paint run pixels over a row-major `width × height` background.
    ///
    /// Gaps between runs are left untouched.
    pub fn composite(&self, target: &mut [Rgb565]) -> Result<(), FormatError> {
        let width = self.header.width as usize;
        let expected = self.header.pixel_count();
        if target.len() != expected {
            return Err(FormatError::FrameSize {
                actual: target.len() * Rgb565::SIZE,
                expected: expected * Rgb565::SIZE,
                width: self.header.width as u32,
                height: self.header.height as u32,
            });
        }

        if self.rows.len() > self.header.height as usize {
            return Err(FormatError::RowCount {
                expected: self.header.height,
                written: self.rows.len(),
            });
        }

        for (y, row) in self.rows.iter().enumerate() {
            let line = &mut target[y * width..(y + 1) * width];
            for run in &row.runs {
                if run.end() > width {
                    return Err(FormatError::RunOutOfBounds {
                        row: y,
                        start: run.start,
                        len: u16::try_from(run.pixels.len()).unwrap_or(u16::MAX),
                        width: self.header.width,
                    });
                }
                line[run.start as usize..run.end()].copy_from_slice(&run.pixels);
            }
        }
        Ok(())
    }

    /// Re-encode into the on-disk layout.
    ///
    /// Hand-built frames are checked like decoded ones: row count, run count
    /// and run length must fit the header and their u16 fields.
    pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
        if self.rows.len() != self.header.height as usize {
            return Err(FormatError::RowCount {
                expected: self.header.height,
                written: self.rows.len(),
            });
        }
        let mut writer = SpriteWriter::new(self.header);
        for row in &self.rows {
            writer.begin_row(row.runs.len())?;
            for run in &row.runs {
                writer.push_run(run.start, run.pixels.iter().copied())?;
            }
        }
        writer.finish()
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], FormatError> {
        let remaining = self.bytes.len() - self.offset;
        if remaining < len {
            return Err(FormatError::Truncated {
                offset: self.offset,
                needed: len - remaining,
            });
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn read<T: BinarySerializable>(&mut self) -> Result<T, FormatError> {
        let offset = self.offset;
        let bytes = self.take(T::SIZE)?;
        T::deserialize(bytes).ok_or(FormatError::Truncated {
            offset,
            needed: T::SIZE,
        })
    }

    fn read_u16(&mut self) -> Result<u16, FormatError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }
}

/// Decode and validate a sprite buffer.
///
/// Rejects truncated input, trailing bytes, zero-length runs, runs past the
/// row end and runs that overlap or go backwards.
pub fn decode_sprite(bytes: &[u8]) -> Result<SpriteFrame, FormatError> {
    let mut cursor = Cursor { bytes, offset: 0 };
    let header: SpriteHeader = cursor.read()?;

    let mut rows = Vec::with_capacity(header.height as usize);
    for y in 0..header.height as usize {
        let run_count = cursor.read_u16()? as usize;
        let mut runs = Vec::with_capacity(run_count);
        let mut prev_end = 0u32;

        for i in 0..run_count {
            let run: RunHeader = cursor.read()?;
            if run.len == 0 {
                return Err(FormatError::EmptyRun { row: y, run: i });
            }
            if run.end() > header.width as u32 {
                return Err(FormatError::RunOutOfBounds {
                    row: y,
                    start: run.start,
                    len: run.len,
                    width: header.width,
                });
            }
            if i > 0 && (run.start as u32) < prev_end {
                return Err(FormatError::RunOrder {
                    row: y,
                    start: run.start,
                    prev_end,
                });
            }
            prev_end = run.end();

            let payload = cursor.take(run.len as usize * Rgb565::SIZE)?;
            let pixels = payload
                .chunks_exact(Rgb565::SIZE)
                .map(|px| Rgb565::from_be_bytes([px[0], px[1]]))
                .collect();
            runs.push(SpriteRun {
                start: run.start,
                pixels,
            });
        }
        rows.push(SpriteRow { runs });
    }

    let trailing = bytes.len() - cursor.offset;
    if trailing != 0 {
        return Err(FormatError::TrailingBytes { count: trailing });
    }

    Ok(SpriteFrame { header, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: Rgb565 = Rgb565(0x8F01);

    #[test]
    fn test_header_size() {
        assert_eq!(SpriteHeader::SIZE, 6);
        assert_eq!(RunHeader::SIZE, 4);
    }

    #[test]
    fn test_header_is_big_endian() {
        let header = SpriteHeader::new(466, 240, KEY);
        assert_eq!(header.to_bytes(), [0x01, 0xD2, 0x00, 0xF0, 0x8F, 0x01]);
    }

    #[test]
    fn test_writer_layout() {
        let mut writer = SpriteWriter::new(SpriteHeader::new(4, 2, KEY));
        writer.begin_row(1).unwrap();
        writer.push_run(1, [Rgb565(0xF800), Rgb565(0x07E0)].into_iter()).unwrap();
        writer.begin_row(0).unwrap();
        let bytes = writer.finish().unwrap();

        assert_eq!(
            bytes,
            vec![
                0x00, 0x04, 0x00, 0x02, 0x8F, 0x01, // header
                0x00, 0x01, // row 0: 1 run
                0x00, 0x01, 0x00, 0x02, // start 1, len 2
                0xF8, 0x00, 0x07, 0xE0, // pixels
                0x00, 0x00, // row 1: no runs
            ]
        );
    }

    #[test]
    fn test_decode_and_reencode() {
        let mut writer = SpriteWriter::new(SpriteHeader::new(8, 3, KEY));
        writer.begin_row(2).unwrap();
        writer.push_run(0, [Rgb565(1), Rgb565(2)].into_iter()).unwrap();
        writer.push_run(5, [Rgb565(3)].into_iter()).unwrap();
        writer.begin_row(0).unwrap();
        writer.begin_row(1).unwrap();
        writer.push_run(0, std::iter::repeat_n(Rgb565(9), 8)).unwrap();
        let bytes = writer.finish().unwrap();

        let frame = decode_sprite(&bytes).unwrap();
        assert_eq!(frame.header.width, 8);
        assert_eq!(frame.rows.len(), 3);
        assert_eq!(frame.rows[0].runs.len(), 2);
        assert!(frame.rows[1].runs.is_empty());
        assert_eq!(frame.opaque_pixels(), 11);
        assert_eq!(frame.run_count(), 3);
        assert_eq!(frame.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_composite_leaves_gaps() {
        let mut writer = SpriteWriter::new(SpriteHeader::new(3, 1, KEY));
        writer.begin_row(1).unwrap();
        writer.push_run(1, [Rgb565(0xF800)].into_iter()).unwrap();
        let frame = decode_sprite(&writer.finish().unwrap()).unwrap();

        let mut target = vec![Rgb565(0x1234); 3];
        frame.composite(&mut target).unwrap();
        assert_eq!(target, vec![Rgb565(0x1234), Rgb565(0xF800), Rgb565(0x1234)]);

        let mut wrong = vec![Rgb565(0); 2];
        assert!(frame.composite(&mut wrong).is_err());
    }

    #[test]
    fn test_decode_truncated() {
        let mut writer = SpriteWriter::new(SpriteHeader::new(2, 1, KEY));
        writer.begin_row(1).unwrap();
        writer.push_run(0, [Rgb565(1), Rgb565(2)].into_iter()).unwrap();
        let bytes = writer.finish().unwrap();

        let err = decode_sprite(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, FormatError::Truncated { .. }));
        assert!(matches!(
            decode_sprite(&[0, 1]).unwrap_err(),
            FormatError::Truncated { offset: 0, .. }
        ));
    }

    #[test]
    fn test_decode_trailing_bytes() {
        let mut bytes = SpriteHeader::new(1, 1, KEY).to_bytes().to_vec();
        bytes.extend_from_slice(&[0, 0, 0xAA]);
        assert_eq!(
            decode_sprite(&bytes).unwrap_err(),
            FormatError::TrailingBytes { count: 1 }
        );
    }

    #[test]
    fn test_decode_rejects_bad_runs() {
        let base = SpriteHeader::new(4, 1, KEY).to_bytes().to_vec();

        // Zero-length run
        let mut bytes = base.clone();
        bytes.extend_from_slice(&[0, 1, 0, 0, 0, 0]);
        assert!(matches!(
            decode_sprite(&bytes).unwrap_err(),
            FormatError::EmptyRun { row: 0, run: 0 }
        ));

        // Run past the row end
        let mut bytes = base.clone();
        bytes.extend_from_slice(&[0, 1, 0, 3, 0, 2, 0, 0, 0, 0]);
        assert!(matches!(
            decode_sprite(&bytes).unwrap_err(),
            FormatError::RunOutOfBounds { .. }
        ));

        // Overlapping runs
        let mut bytes = base;
        bytes.extend_from_slice(&[0, 2]);
        bytes.extend_from_slice(&[0, 0, 0, 2, 0, 0, 0, 0]);
        bytes.extend_from_slice(&[0, 1, 0, 1, 0, 0]);
        assert!(matches!(
            decode_sprite(&bytes).unwrap_err(),
            FormatError::RunOrder { .. }
        ));
    }

    #[test]
    fn test_writer_rejects_oversized_fields() {
        let mut writer = SpriteWriter::new(SpriteHeader::new(u16::MAX, 1, KEY));
        assert_eq!(
            writer.begin_row(70_000).unwrap_err(),
            FormatError::TooManyRuns { row: 0, count: 70_000 }
        );
        writer.begin_row(1).unwrap();
        assert_eq!(
            writer
                .push_run(0, std::iter::repeat_n(Rgb565(0), 70_000))
                .unwrap_err(),
            FormatError::RunTooLong { row: 0, len: 70_000 }
        );
    }

    #[test]
    fn test_writer_rejects_inconsistent_rows() {
        let mut writer = SpriteWriter::new(SpriteHeader::new(4, 2, KEY));
        writer.begin_row(2).unwrap();
        writer.push_run(0, [Rgb565(1)].into_iter()).unwrap();
        assert!(matches!(
            writer.push_run(0, [Rgb565(2)].into_iter()).unwrap_err(),
            FormatError::RunOrder { .. }
        ));
        assert_eq!(
            writer.begin_row(0).unwrap_err(),
            FormatError::RunCount {
                row: 0,
                declared: 2,
                written: 1,
            }
        );

        let mut writer = SpriteWriter::new(SpriteHeader::new(4, 2, KEY));
        writer.begin_row(0).unwrap();
        assert_eq!(
            writer.finish().unwrap_err(),
            FormatError::RowCount {
                expected: 2,
                written: 1,
            }
        );
    }

    #[test]
    fn test_hand_built_frame_is_validated() {
        let header = SpriteHeader::new(u16::MAX, 1, KEY);
        let too_many_runs = SpriteFrame {
            header,
            rows: vec![SpriteRow {
                runs: (0..70_000)
                    .map(|_| SpriteRun {
                        start: 0,
                        pixels: vec![Rgb565(1)],
                    })
                    .collect(),
            }],
        };
        assert!(matches!(
            too_many_runs.to_bytes().unwrap_err(),
            FormatError::TooManyRuns { row: 0, count: 70_000 }
        ));

        let long_run = SpriteFrame {
            header,
            rows: vec![SpriteRow {
                runs: vec![SpriteRun {
                    start: 0,
                    pixels: vec![Rgb565(1); 70_000],
                }],
            }],
        };
        assert!(matches!(
            long_run.to_bytes().unwrap_err(),
            FormatError::RunTooLong { row: 0, len: 70_000 }
        ));

        let missing_row = SpriteFrame {
            header: SpriteHeader::new(2, 2, KEY),
            rows: vec![SpriteRow::default()],
        };
        assert_eq!(
            missing_row.to_bytes().unwrap_err(),
            FormatError::RowCount {
                expected: 2,
                written: 1,
            }
        );
    }

    #[test]
    fn test_composite_rejects_run_past_width() {
        let frame = SpriteFrame {
            header: SpriteHeader::new(2, 1, KEY),
            rows: vec![SpriteRow {
                runs: vec![SpriteRun {
                    start: 1,
                    pixels: vec![Rgb565(1); 2],
                }],
            }],
        };
        let mut target = vec![Rgb565(0); 2];
        assert!(matches!(
            frame.composite(&mut target).unwrap_err(),
            FormatError::RunOutOfBounds { row: 0, start: 1, .. }
        ));
    }

    #[test]
    fn test_max_encoded_size_bounds_worst_case() {
        // Alternating opaque / transparent columns give the most runs
        let header = SpriteHeader::new(5, 2, KEY);
        let mut writer = SpriteWriter::new(header);
        for _ in 0..2 {
            writer.begin_row(3).unwrap();
            for x in [0, 2, 4] {
                writer.push_run(x, [Rgb565(1)].into_iter()).unwrap();
            }
        }
        let bytes = writer.finish().unwrap();
        assert!(bytes.len() as u64 <= header.max_encoded_size());

        let full = SpriteHeader::new(u16::MAX, u16::MAX, KEY).max_encoded_size();
        assert!(full > 4096 * 4096 * 2 * 2);
    }
}
