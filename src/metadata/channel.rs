// src/metadata/channel.rs
use crate::error::{TdmsError, Result};
use crate::metadata::{ObjectPath, PropertyMap, RawDataLayout};
use crate::raw_data::ChannelBuffer;
use crate::types::{DataType, Property, PropertyValue, Timestamp};
use crate::utils::extended_to_f64;
use bytemuck::Pod;

/// A decoded channel.
///
/// This structure holds everything the decoder knows about a channel:
/// - Object path and name
/// - Data type, fixed when the channel is first seen
/// - The raw data layout declared by the most recent segment
/// - Properties (last write wins)
/// - The append-only buffer of decoded values
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    path: ObjectPath,
    name: String,
    data_type: DataType,
    width: u64,
    dimension: u32,
    layout: RawDataLayout,
    raw_type: Option<DataType>,
    properties: PropertyMap,
    buffer: ChannelBuffer,
}

impl Channel {
    /// Create a channel, seeding type, width and dimension from the layout
    /// of the object that introduced it.
    ///
    /// # Example
    ///
    /// ```
    /// use tdms_decoder::metadata::{Channel, RawDataLayout};
    /// use tdms_decoder::types::DataType;
    ///
    /// let channel = Channel::new("Sensors", "Temperature", RawDataLayout::new(DataType::DoubleFloat, 100));
    /// assert_eq!(channel.width(), 8);
    /// assert_eq!(channel.channel_size(), 800);
    /// assert_eq!(channel.value_count(), 0);
    /// ```
    pub fn new(group: impl Into<String>, name: impl Into<String>, layout: RawDataLayout) -> Self {
        let name = name.into();
        let width = seed_width(&layout);
        Channel {
            path: ObjectPath::Channel {
                group: group.into(),
                channel: name.clone(),
            },
            name,
            data_type: layout.data_type,
            width,
            dimension: layout.dimension,
            layout,
            raw_type: None,
            properties: PropertyMap::new(),
            buffer: ChannelBuffer::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &ObjectPath {
        &self.path
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Wire id of the channel's data type.
    pub fn type_id(&self) -> u32 {
        self.data_type.id()
    }

    /// Bytes per value: the type width, the string byte count of the first
    /// layout, or the scaler width for DAQmx data.
    pub fn width(&self) -> u64 {
        self.width
    }

    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    /// Layout declared by the most recent segment that described the channel.
    pub fn layout(&self) -> &RawDataLayout {
        &self.layout
    }

    /// Number of values decoded so far.
    pub fn value_count(&self) -> u64 {
        self.buffer.value_count()
    }

    /// Bytes the channel contributes to one chunk under its current layout.
    pub fn channel_size(&self) -> u64 {
        self.layout.chunk_size()
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn buffer(&self) -> &ChannelBuffer {
        &self.buffer
    }

    /// Decoded string values (and rendered timestamps).
    pub fn strings(&self) -> &[String] {
        self.buffer.strings()
    }

    /// DAQmx values after linear scaling.
    pub fn scaled(&self) -> &[f64] {
        self.buffer.scaled()
    }

    /// Type of the elements in the raw byte buffer. Equals the channel type
    /// except for DAQmx channels decoded directly, where it is the resolved
    /// integer type.
    pub fn raw_type(&self) -> Option<DataType> {
        self.raw_type
    }

    /// Materialise the raw buffer as values of `T`.
    ///
    /// `T` must have the width of one raw element, e.g. `f64` for doubles,
    /// `[f32; 2]` for complex singles or [`Timestamp`] for timestamps.
    pub fn values<T: Pod>(&self) -> Result<Vec<T>> {
        let raw_type = self.raw_type.unwrap_or(self.data_type);
        let expected = raw_type.size() * self.dimension.max(1) as usize;
        let found = std::mem::size_of::<T>();
        if raw_type.is_variable_str() || found == 0 || (found != expected && found != raw_type.size()) {
            return Err(TdmsError::TypeMismatch {
                expected: raw_type.name().to_string(),
                found: std::any::type_name::<T>().to_string(),
            });
        }
        Ok(bytemuck::pod_collect_to_vec(self.buffer.raw()))
    }

    /// Numeric view of the decoded values as `f64`.
    pub fn to_f64(&self) -> Result<Vec<f64>> {
        if self.data_type == DataType::DAQmxRawData && self.raw_type.is_none() {
            return Ok(self.buffer.scaled().to_vec());
        }

        let raw = self.buffer.raw();
        let raw_type = self.raw_type.unwrap_or(self.data_type);
        let values = match raw_type {
            DataType::I8 => raw.iter().map(|&b| b as i8 as f64).collect(),
            DataType::U8 => raw.iter().map(|&b| b as f64).collect(),
            DataType::Boolean => raw.iter().map(|&b| if b != 0 { 1.0 } else { 0.0 }).collect(),
            DataType::I16 => widen::<i16>(raw, |v| v as f64),
            DataType::U16 => widen::<u16>(raw, |v| v as f64),
            DataType::I32 => widen::<i32>(raw, |v| v as f64),
            DataType::U32 => widen::<u32>(raw, |v| v as f64),
            DataType::I64 => widen::<i64>(raw, |v| v as f64),
            DataType::U64 => widen::<u64>(raw, |v| v as f64),
            DataType::SingleFloat | DataType::SingleFloatWithUnit => widen::<f32>(raw, |v| v as f64),
            DataType::DoubleFloat | DataType::DoubleFloatWithUnit => widen::<f64>(raw, |v| v),
            DataType::ExtendedFloat | DataType::ExtendedFloatWithUnit => raw
                .chunks_exact(16)
                .map(|slot| {
                    let mut x87 = [0u8; 10];
                    x87.copy_from_slice(&slot[..10]);
                    extended_to_f64(&x87)
                })
                .collect(),
            other => {
                return Err(TdmsError::TypeMismatch {
                    expected: "numeric".to_string(),
                    found: other.name().to_string(),
                })
            }
        };
        Ok(values)
    }

    /// Decoded timestamps.
    pub fn timestamps(&self) -> Result<Vec<Timestamp>> {
        if self.data_type != DataType::TimeStamp {
            return Err(TdmsError::TypeMismatch {
                expected: DataType::TimeStamp.name().to_string(),
                found: self.data_type.name().to_string(),
            });
        }
        Ok(bytemuck::pod_collect_to_vec(self.buffer.raw()))
    }

    pub(crate) fn set_layout(&mut self, layout: RawDataLayout) {
        self.layout = layout;
    }

    /// Take over a newly declared layout. A channel first seen without raw
    /// data (type void) is typed by its first layout; afterwards a layout of
    /// another type is refused.
    pub(crate) fn adopt_layout(&mut self, layout: &RawDataLayout) -> bool {
        if self.data_type == DataType::Void {
            self.data_type = layout.data_type;
            self.width = seed_width(layout);
            self.dimension = layout.dimension;
            self.layout = layout.clone();
            return true;
        }
        if layout.data_type != self.data_type {
            return false;
        }
        self.set_layout(layout.clone());
        true
    }

    pub(crate) fn merge_properties(&mut self, properties: &[Property]) {
        for prop in properties {
            self.properties.insert(prop.name.clone(), prop.value.clone());
        }
    }

    pub(crate) fn publish(&mut self, staged: ChannelBuffer, raw_type: Option<DataType>) {
        if raw_type.is_some() {
            self.raw_type = raw_type;
        }
        self.buffer.append(staged);
    }
}

fn seed_width(layout: &RawDataLayout) -> u64 {
    match &layout.daqmx {
        Some(format) => format.scaler_width(),
        None => layout.width(),
    }
}

fn widen<T: Pod>(raw: &[u8], convert: impl Fn(T) -> f64) -> Vec<f64> {
    bytemuck::pod_collect_to_vec::<u8, T>(raw)
        .into_iter()
        .map(convert)
        .collect()
}
