// src/raw_data/mod.rs
//! Low-level raw data handling.
//!
//! - [`ByteReader`] - positioned, endian-aware cursor over the byte source
//! - [`ChannelBuffer`] - append-only storage for decoded channel values
//!
//! # Example
//!
//! ```
//! use tdms_decoder::raw_data::{ByteReader, ChannelBuffer};
//! use std::io::Cursor;
//!
//! let data = vec![1u8, 0, 0, 0, 2, 0, 0, 0];
//! let mut reader = ByteReader::new(Cursor::new(data)).unwrap();
//!
//! let mut buffer = ChannelBuffer::new();
//! for _ in 0..2 {
//!     let value = reader.read_i32().unwrap();
//!     buffer.push_raw(&value.to_ne_bytes(), 1);
//! }
//! assert_eq!(buffer.value_count(), 2);
//! ```

mod buffer;
mod reader;

pub use buffer::ChannelBuffer;
pub use reader::ByteReader;
