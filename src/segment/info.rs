// src/segment/info.rs
use crate::types::TocFlags;

/// Summary of one parsed segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentInfo {
    /// Offset of the lead-in.
    pub offset: u64,
    pub toc: TocFlags,
    pub version: u32,
    /// Absolute offset where the raw data starts.
    pub data_start: u64,
    /// Absolute offset of the next segment, clamped to the file size.
    pub boundary: u64,
    /// The segment was declared to run to (or past) the end of the file.
    pub reaches_end: bool,
    /// The declared length was unknown or ran past the end of the file.
    pub truncated: bool,
    /// Objects listed in the segment's metadata.
    pub object_count: usize,
    /// Complete chunks decoded from the raw data.
    pub chunks: u64,
}

impl SegmentInfo {
    /// Bytes of raw data between `data_start` and the boundary.
    pub fn raw_data_size(&self) -> u64 {
        self.boundary.saturating_sub(self.data_start)
    }
}
