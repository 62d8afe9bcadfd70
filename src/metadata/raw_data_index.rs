// src/metadata/raw_data_index.rs
use crate::reader::daqmx::DaqMxFormat;
use crate::types::DataType;

/// The raw data index discriminant that opens every object's metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawDataIndex {
    /// Same layout as the object at this position in the previous segment.
    MatchesPrevious,
    /// The object carries no raw data in this segment.
    NoRawData,
    /// A new layout follows; the value is the raw index header as read.
    New(u32),
}

impl RawDataIndex {
    pub const NO_RAW_DATA: u32 = 0xFFFFFFFF;
    pub const MATCHES_PREVIOUS: u32 = 0x00000000;

    pub fn from_u32(value: u32) -> Self {
        match value {
            Self::MATCHES_PREVIOUS => RawDataIndex::MatchesPrevious,
            Self::NO_RAW_DATA => RawDataIndex::NoRawData,
            other => RawDataIndex::New(other),
        }
    }

    pub fn raw_value(&self) -> u32 {
        match self {
            RawDataIndex::MatchesPrevious => Self::MATCHES_PREVIOUS,
            RawDataIndex::NoRawData => Self::NO_RAW_DATA,
            RawDataIndex::New(v) => *v,
        }
    }
}

/// How one object's values are laid out in a segment's raw data.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDataLayout {
    pub data_type: DataType,
    pub dimension: u32,
    /// Values per chunk.
    pub value_count: u64,
    /// Total bytes per chunk, strings only.
    pub byte_count: u64,
    pub daqmx: Option<DaqMxFormat>,
}

impl RawDataLayout {
    pub fn new(data_type: DataType, value_count: u64) -> Self {
        RawDataLayout {
            data_type,
            dimension: 1,
            value_count,
            byte_count: 0,
            daqmx: None,
        }
    }

    pub fn with_byte_count(mut self, byte_count: u64) -> Self {
        self.byte_count = byte_count;
        self
    }

    pub fn with_daqmx(mut self, format: DaqMxFormat) -> Self {
        self.daqmx = Some(format);
        self
    }

    /// Per-value width recorded on the channel: the type width, or the byte
    /// count for strings.
    pub fn width(&self) -> u64 {
        if self.data_type.is_variable_str() {
            self.byte_count
        } else {
            self.data_type.size() as u64
        }
    }

    /// Bytes this object contributes to one chunk.
    pub fn chunk_size(&self) -> u64 {
        if self.value_count == 0 {
            return 0;
        }
        match self.data_type {
            DataType::String => self.byte_count,
            DataType::DAQmxRawData => {
                let width = self.daqmx.as_ref().map(|f| f.scaler_width()).unwrap_or(0);
                width
                    .saturating_mul(self.dimension as u64)
                    .saturating_mul(self.value_count)
            }
            other => (other.size() as u64)
                .saturating_mul(self.dimension as u64)
                .saturating_mul(self.value_count),
        }
    }

    pub fn has_values(&self) -> bool {
        self.value_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminant() {
        assert_eq!(RawDataIndex::from_u32(0), RawDataIndex::MatchesPrevious);
        assert_eq!(RawDataIndex::from_u32(0xFFFFFFFF), RawDataIndex::NoRawData);
        assert_eq!(RawDataIndex::from_u32(20), RawDataIndex::New(20));
        assert_eq!(RawDataIndex::New(0x1269).raw_value(), 0x1269);
    }

    #[test]
    fn test_chunk_sizes() {
        assert_eq!(RawDataLayout::new(DataType::I32, 1000).chunk_size(), 4000);
        assert_eq!(RawDataLayout::new(DataType::DoubleFloat, 500).chunk_size(), 4000);
        assert_eq!(RawDataLayout::new(DataType::ComplexDoubleFloat, 2).chunk_size(), 32);

        let mut matrix = RawDataLayout::new(DataType::U16, 3);
        matrix.dimension = 2;
        assert_eq!(matrix.chunk_size(), 12);

        let strings = RawDataLayout::new(DataType::String, 3).with_byte_count(24);
        assert_eq!(strings.chunk_size(), 24);
        assert_eq!(strings.width(), 24);

        let empty = RawDataLayout::new(DataType::String, 0).with_byte_count(24);
        assert_eq!(empty.chunk_size(), 0);
    }
}
