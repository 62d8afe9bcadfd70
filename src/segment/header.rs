// src/segment/header.rs
use crate::types::TocFlags;
use byteorder::{ByteOrder, LittleEndian};

/// The fixed 28-byte lead-in that opens every segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadIn {
    pub toc: TocFlags,
    pub version: u32,
    /// Bytes from the end of the lead-in to the next segment, -1 if unknown.
    pub next_segment_offset: i64,
    /// Bytes from the end of the lead-in to the raw data.
    pub data_offset: u64,
}

impl LeadIn {
    pub const LEAD_IN_SIZE: usize = 28;
    pub const TDMS_TAG: &'static [u8; 4] = b"TDSm";
    pub const VERSION: u32 = 4713;
    pub const INCOMPLETE_MARKER: i64 = -1;

    /// Parse a lead-in. Returns `None` when the tag is not `TDSm`.
    ///
    /// Lead-in integers are always little-endian; the big-endian ToC bit
    /// only applies to the metadata and raw data that follow.
    pub fn parse(bytes: &[u8; Self::LEAD_IN_SIZE]) -> Option<Self> {
        if &bytes[0..4] != Self::TDMS_TAG {
            return None;
        }
        Some(LeadIn {
            toc: TocFlags::new(LittleEndian::read_u32(&bytes[4..8])),
            version: LittleEndian::read_u32(&bytes[8..12]),
            next_segment_offset: LittleEndian::read_i64(&bytes[12..20]),
            data_offset: LittleEndian::read_u64(&bytes[20..28]),
        })
    }

    /// Whether the writer never finalised the segment length.
    pub fn is_incomplete(&self) -> bool {
        self.next_segment_offset == Self::INCOMPLETE_MARKER
    }
}
