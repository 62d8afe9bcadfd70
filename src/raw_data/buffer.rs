// src/raw_data/buffer.rs
use bytes::{Bytes, BytesMut};

/// Append-only storage for the decoded values of one channel.
///
/// Three typed buffers coexist because the decoded form depends on the wire
/// type:
///
/// - `raw`: fixed-width values as bytes in host order (numeric, boolean,
///   complex, extended slots and timestamps),
/// - `strings`: string values, and the rendered form of timestamps,
/// - `scaled`: `f64` values produced by DAQmx linear scaling.
///
/// Nothing is ever removed. A partially decoded chunk is staged in a separate
/// `ChannelBuffer` and only [`append`](ChannelBuffer::append)ed once complete.
///
/// # Example
///
/// ```
/// use tdms_decoder::raw_data::ChannelBuffer;
///
/// let mut buffer = ChannelBuffer::new();
/// buffer.push_raw(&7i32.to_ne_bytes(), 1);
/// buffer.push_string("seven".to_string());
///
/// assert_eq!(buffer.value_count(), 2);
/// assert_eq!(buffer.raw_len(), 4);
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChannelBuffer {
    raw: BytesMut,
    strings: Vec<String>,
    scaled: Vec<f64>,
    value_count: u64,
}

impl ChannelBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer with `capacity` bytes reserved for raw values.
    pub fn with_capacity(capacity: usize) -> Self {
        ChannelBuffer {
            raw: BytesMut::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Append `values` fixed-width values already in host byte order.
    pub fn push_raw(&mut self, bytes: &[u8], values: u64) {
        self.raw.extend_from_slice(bytes);
        self.value_count += values;
    }

    pub fn push_string(&mut self, value: String) {
        self.strings.push(value);
        self.value_count += 1;
    }

    pub fn push_scaled(&mut self, value: f64) {
        self.scaled.push(value);
        self.value_count += 1;
    }

    /// Attach the 16 raw bytes and the rendered text of one timestamp,
    /// counted as a single value.
    pub fn push_timestamp(&mut self, bytes: &[u8], rendered: String) {
        self.raw.extend_from_slice(bytes);
        self.strings.push(rendered);
        self.value_count += 1;
    }

    /// Move everything staged in `other` to the end of this buffer.
    pub fn append(&mut self, other: ChannelBuffer) {
        if self.raw.is_empty() {
            self.raw = other.raw;
        } else {
            self.raw.extend_from_slice(&other.raw);
        }
        self.strings.extend(other.strings);
        self.scaled.extend(other.scaled);
        self.value_count += other.value_count;
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Immutable copy of the raw bytes.
    pub fn raw_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.raw)
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    pub fn scaled(&self) -> &[f64] {
        &self.scaled
    }

    pub fn raw_len(&self) -> usize {
        self.raw.len()
    }

    pub fn value_count(&self) -> u64 {
        self.value_count
    }

    pub fn is_empty(&self) -> bool {
        self.value_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_order() {
        let mut published = ChannelBuffer::new();
        published.push_raw(&[1, 2], 2);

        let mut staged = ChannelBuffer::new();
        staged.push_raw(&[3], 1);
        staged.push_scaled(2.5);
        published.append(staged);

        assert_eq!(published.raw(), &[1, 2, 3]);
        assert_eq!(published.scaled(), &[2.5]);
        assert_eq!(published.value_count(), 4);
    }

    #[test]
    fn test_append_into_empty() {
        let mut published = ChannelBuffer::with_capacity(64);
        let mut staged = ChannelBuffer::new();
        staged.push_raw(&[9, 9, 9, 9], 1);
        published.append(staged);
        assert_eq!(published.raw_len(), 4);
        assert_eq!(published.raw_bytes().as_ref(), &[9, 9, 9, 9]);
    }

    #[test]
    fn test_timestamp_counts_once() {
        let mut buffer = ChannelBuffer::new();
        buffer.push_timestamp(&[0u8; 16], "01.01.1904 00:00:00,000000".to_string());
        assert_eq!(buffer.value_count(), 1);
        assert_eq!(buffer.raw_len(), 16);
        assert_eq!(buffer.strings().len(), 1);
    }

    #[test]
    fn test_empty() {
        let buffer = ChannelBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.raw_len(), 0);
    }
}
