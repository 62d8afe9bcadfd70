// src/reader/options.rs

/// Knobs for decoding a single file.
///
/// ```
/// use tdms_decoder::ReadOptions;
///
/// let options = ReadOptions::new().max_segments(10).strict_chunks(false);
/// assert_eq!(options.max_segments, Some(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Stop after this many segments. Nothing after them is decoded.
    pub max_segments: Option<usize>,
    /// Capacity of the `BufReader` used by [`TdmsFile::open`](crate::TdmsFile::open).
    pub buffer_capacity: usize,
    /// When set, raw data that is not a whole number of chunks fails the
    /// read; otherwise the segment's raw data is logged and skipped.
    pub strict_chunks: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            max_segments: None,
            buffer_capacity: 65536,
            strict_chunks: true,
        }
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_segments(mut self, max: usize) -> Self {
        self.max_segments = Some(max);
        self
    }

    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(1);
        self
    }

    pub fn strict_chunks(mut self, strict: bool) -> Self {
        self.strict_chunks = strict;
        self
    }
}
