// src/lib.rs
//! # tdms-decoder
//!
//! A Rust library for decoding TDMS (Technical Data Management Streaming) files,
//! the segmented measurement format written by National Instruments LabVIEW and DAQmx.
//!
//! ## Features
//!
//! - **Segment state machine**: lead-in, metadata and raw data decoded one segment at a time
//! - **Incremental metadata**: objects inherit their raw data layout from the previous segment
//! - **All wire types**: integers, floats, extended floats, strings, timestamps, complex values
//! - **DAQmx raw data**: format changing scalers with linear rescaling
//! - **Either byte order**: per segment, from the lead-in
//! - **Tolerant**: trailing bytes after the last segment are decoded with the last layout
//! - **Batch decoding**: dated file discovery and a worker pool for many files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tdms_decoder::*;
//!
//! fn main() -> Result<()> {
//!     let mut file = TdmsFile::open("Trend20240131.tdms")?;
//!     file.read()?;
//!
//!     for group in file.groups() {
//!         for channel in group.channels() {
//!             println!("{} ({}): {} values", channel.path(), channel.data_type(), channel.value_count());
//!         }
//!     }
//!
//!     let data: Vec<f64> = file.read_channel_data("Group1", "Voltage")?;
//!     println!("Read {} values", data.len());
//!     Ok(())
//! }
//! ```
//!
//! ### Many files
//!
//! ```rust,no_run
//! use tdms_decoder::batch::{self, BatchOptions};
//!
//! fn main() -> tdms_decoder::Result<()> {
//!     let files = batch::discover("logs", batch::EVENT_PREFIX)?;
//!     let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
//!
//!     for report in batch::decode_files(&paths, &BatchOptions::default()) {
//!         match report.result {
//!             Ok(file) => println!("{}: {} channels", report.path.display(), file.channel_count()),
//!             Err(err) => eprintln!("{}: {}", report.path.display(), err),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

// Modules
pub mod error;
pub mod types;
pub mod metadata;
pub mod segment;
pub mod raw_data;
pub mod reader;
pub mod batch;

mod utils;

// Re-export commonly used types at the crate root for convenience
pub use error::{ErrorKind, TdmsError, Result};

// Type exports
pub use types::{
    DataType,
    TocFlags,
    Timestamp,
    Property,
    PropertyValue,
};

// Metadata exports
pub use metadata::{
    Channel,
    Group,
    ObjectPath,
    PropertyMap,
    RawDataIndex,
    RawDataLayout,
};

// Segment exports
pub use segment::{
    LeadIn,
    SegmentInfo,
    SegmentState,
};

// Raw data exports
pub use raw_data::{
    ByteReader,
    ChannelBuffer,
};

// Reader exports
pub use reader::{
    ReadOptions,
    ReadSeek,
    TdmsFile,
};

// Prelude module for glob imports
pub mod prelude {
    //! Convenient imports for common use cases.
    //!
    //! ```rust
    //! use tdms_decoder::prelude::*;
    //! ```

    pub use crate::error::{TdmsError, Result};
    pub use crate::types::{DataType, PropertyValue, Timestamp};
    pub use crate::metadata::{Channel, Group};
    pub use crate::reader::{ReadOptions, TdmsFile};
    pub use crate::batch::BatchOptions;
}

// Version information
/// The TDMS format version written in segment lead-ins
pub const TDMS_VERSION: u32 = LeadIn::VERSION;

/// The library version
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constants() {
        assert_eq!(TDMS_VERSION, 4713);
        assert!(!LIBRARY_VERSION.is_empty());
    }

    #[test]
    fn test_data_type_sizes() {
        assert_eq!(DataType::I8.size(), 1);
        assert_eq!(DataType::I16.size(), 2);
        assert_eq!(DataType::I32.size(), 4);
        assert_eq!(DataType::I64.size(), 8);
        assert_eq!(DataType::F64.size(), 8);
        assert_eq!(DataType::TimeStamp.size(), 16);
        assert_eq!(DataType::ComplexSingleFloat.size(), 8);
        assert_eq!(DataType::String.size(), 0);
        assert!(DataType::String.is_variable_str());
    }

    #[test]
    fn test_toc_flags() {
        let mut toc = TocFlags::empty();
        assert!(!toc.has_metadata());
        assert!(!toc.has_raw_data());

        toc.set_metadata(true);
        assert!(toc.has_metadata());

        toc.set_raw_data(true);
        assert!(toc.has_raw_data());

        toc.set_metadata(false);
        assert!(!toc.has_metadata());
        assert!(toc.has_raw_data());

        toc.set_big_endian(true);
        assert_eq!(toc.raw_value(), (1 << 3) | (1 << 6));
    }
}
