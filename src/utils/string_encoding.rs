// src/utils/string_encoding.rs
use crate::error::{TdmsError, Result};

/// Strict UTF-8 decode, used for object paths and property names.
pub fn decode_tdms_string(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| TdmsError::InvalidUtf8)
}

/// Decode a fixed-length character buffer: everything from the first NUL on
/// is padding, invalid sequences are replaced.
pub fn decode_null_padded(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
