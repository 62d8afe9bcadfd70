// src/metadata/object.rs
use super::{ObjectPath, RawDataIndex, RawDataLayout};
use crate::types::Property;

/// Position of a channel in the file's group and channel vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelRef {
    pub group: usize,
    pub channel: usize,
}

/// An object as described by one segment's metadata.
///
/// Objects are rebuilt for every segment. The layout is the resolved one:
/// for [`RawDataIndex::MatchesPrevious`] it has already been inherited from
/// the previous segment.
#[derive(Debug, Clone)]
pub struct SegmentObject {
    pub path: ObjectPath,
    pub path_string: String,
    pub index: RawDataIndex,
    pub layout: Option<RawDataLayout>,
    pub properties: Vec<Property>,
    pub channel: Option<ChannelRef>,
}

impl SegmentObject {
    pub fn new(path: ObjectPath, path_string: String, index: RawDataIndex) -> Self {
        SegmentObject {
            path,
            path_string,
            index,
            layout: None,
            properties: Vec::new(),
            channel: None,
        }
    }

    pub fn has_raw_data(&self) -> bool {
        self.layout.as_ref().map_or(false, RawDataLayout::has_values)
    }

    /// Bytes this object contributes to one chunk of raw data.
    pub fn chunk_size(&self) -> u64 {
        match &self.layout {
            Some(layout) if self.has_raw_data() => layout.chunk_size(),
            _ => 0,
        }
    }
}
