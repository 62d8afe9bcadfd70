// src/error.rs
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TdmsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Truncated segment: needed {needed} bytes at offset {offset}, only {available} left")]
    Truncated { offset: u64, needed: u64, available: u64 },

    #[error("Invalid TDMS tag: expected {expected}, found {found}")]
    InvalidTag { expected: String, found: String },

    #[error("Unknown data type: 0x{0:X}")]
    UnknownDataType(u32),

    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Raw data size ({raw_size}) is not a multiple of the chunk size ({chunk_size})")]
    ChunkMismatch { raw_size: u64, chunk_size: u64 },

    #[error("Chunk size is zero but {raw_size} bytes of raw data follow")]
    ZeroChunkSize { raw_size: u64 },

    #[error("Raw data of {path} overruns its declared size of {declared} bytes by {excess}")]
    LayoutOverrun { path: String, declared: u64, excess: u64 },

    #[error("String offset {offset} of {path} is below the previous offset {previous}")]
    InvalidStringOffset { path: String, offset: u32, previous: u32 },

    #[error("DAQmx raw data declared without format changing scalers: {0}")]
    MissingScalers(String),

    #[error("Invalid UTF-8 in string data")]
    InvalidUtf8,

    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    #[error("Worker failed: {0}")]
    Worker(String),
}

/// Coarse classification of a [`TdmsError`], used to decide how far a
/// failure propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source could not be read or ended early. Fatal for the file.
    Io,
    /// The bytes were readable but do not form a layout we can decode.
    Format,
    /// A wire type id that is not in the type registry.
    UnknownType,
}

impl TdmsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TdmsError::Io(_) | TdmsError::Truncated { .. } | TdmsError::Worker(_) => ErrorKind::Io,
            TdmsError::UnknownDataType(_) => ErrorKind::UnknownType,
            _ => ErrorKind::Format,
        }
    }

    pub fn is_format(&self) -> bool {
        self.kind() == ErrorKind::Format
    }
}

pub type Result<T> = std::result::Result<T, TdmsError>;
