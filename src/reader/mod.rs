// src/reader/mod.rs
//! Segment-by-segment decoding of a TDMS source into groups and channels.

pub mod daqmx;
mod metadata;
mod options;
mod raw;
mod tdms_file;

pub use options::ReadOptions;
pub use tdms_file::{ReadSeek, TdmsFile};
