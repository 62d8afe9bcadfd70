// src/segment/mod.rs
//! Segment framing: the 28-byte lead-in and the per-segment summary kept
//! after decoding.

mod header;
mod info;

pub use header::LeadIn;
pub use info::SegmentInfo;

/// Where the segment loop stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    /// Expecting a lead-in at the cursor.
    AwaitLeadIn,
    /// Lead-in accepted, the object list follows.
    ParseMetaData,
    /// Metadata done, the cursor sits at the segment's raw data.
    ParseRawData,
    /// No further structured data; the rest decodes with the last layout.
    TrailingRawBytes,
    EndOfFile,
}

impl SegmentState {
    pub fn is_finished(&self) -> bool {
        *self == SegmentState::EndOfFile
    }
}
