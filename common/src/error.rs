//! Errors raised while reading rgbpack binary formats.

/// Decode failure for a sprite or full-frame buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("buffer truncated at byte {offset}: needed {needed} more bytes")]
    Truncated { offset: usize, needed: usize },

    #[error("{count} trailing bytes after the last row")]
    TrailingBytes { count: usize },

    #[error("row {row}: run {run} has zero length")]
    EmptyRun { row: usize, run: usize },

    #[error("row {row}: run at x={start} with length {len} exceeds width {width}")]
    RunOutOfBounds {
        row: usize,
        start: u16,
        len: u16,
        width: u16,
    },

    #[error("row {row}: run at x={start} overlaps or precedes the previous run ending at x={prev_end}")]
    RunOrder {
        row: usize,
        start: u16,
        prev_end: u32,
    },

    #[error("{width}x{height} frame does not fit in memory")]
    FrameTooLarge { width: u32, height: u32 },

    #[error("row {row}: {count} runs exceed the u16 run count field")]
    TooManyRuns { row: usize, count: usize },

    #[error("row {row}: run of {len} pixels exceeds the u16 length field")]
    RunTooLong { row: usize, len: usize },

    #[error("row {row}: {declared} runs declared, {written} written")]
    RunCount {
        row: usize,
        declared: usize,
        written: usize,
    },

    #[error("sprite declares {expected} rows, {written} written")]
    RowCount { expected: u16, written: usize },

    #[error("frame is {actual} bytes, expected {expected} for {width}x{height}")]
    FrameSize {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },
}
