// src/batch/mod.rs
//! Working with many files: discovery of dated log files and parallel
//! decoding, one [`TdmsFile`](crate::TdmsFile) per worker.

mod discover;
mod pool;
#[cfg(feature = "async")]
mod async_pool;

pub use discover::{
    date_span, discover, file_name_for, parse_dated_name, select, split_by_day, DatedFile,
    EVENT_PREFIX, TREND_PREFIX,
};
pub use pool::{decode_files, decode_files_with, BatchOptions, FileReport};
#[cfg(feature = "async")]
pub use async_pool::decode_files_async;
