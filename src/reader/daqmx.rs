// src/reader/daqmx.rs
use crate::error::{TdmsError, Result};
use crate::metadata::PropertyMap;
use crate::raw_data::{ByteReader, ChannelBuffer};
use crate::types::DataType;
use crate::utils::{needs_swap, swap_elements};
use smallvec::SmallVec;
use std::io::{Read, Seek};

/// Raw data index header written by DAQmx for format changing scalers.
pub const FORMAT_CHANGING_SCALER: u32 = 0x00001269;
/// Raw data index header written by DAQmx for digital line scalers.
pub const DIGITAL_LINE_SCALER: u32 = 0x0000126A;

pub const SLOPE_PROPERTY: &str = "NI_Scale[1]_Linear_Slope";
pub const INTERCEPT_PROPERTY: &str = "NI_Scale[1]_Linear_Y_Intercept";

/// One format changing scaler as stored in the raw data index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaqMxScaler {
    /// Wire type id of the stored samples.
    pub data_type_code: u32,
    pub raw_buffer_index: u32,
    pub raw_byte_offset: u32,
    pub sample_format_bitmap: u32,
    pub scale_id: u32,
}

impl DaqMxScaler {
    pub fn data_type(&self) -> Option<DataType> {
        DataType::from_u32(self.data_type_code)
    }

    fn read<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<Self> {
        Ok(DaqMxScaler {
            data_type_code: reader.read_u32()?,
            raw_buffer_index: reader.read_u32()?,
            raw_byte_offset: reader.read_u32()?,
            sample_format_bitmap: reader.read_u32()?,
            scale_id: reader.read_u32()?,
        })
    }
}

/// Scaler list and raw buffer widths of a DAQmx raw data object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DaqMxFormat {
    pub scalers: SmallVec<[DaqMxScaler; 1]>,
    pub raw_widths: SmallVec<[u32; 2]>,
}

impl DaqMxFormat {
    /// Read the scaler vector and the raw data width vector that follow the
    /// value count of a DAQmx raw data index.
    pub fn read<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<Self> {
        let scaler_count = reader.read_u32()?;
        let mut scalers = SmallVec::new();
        for _ in 0..scaler_count {
            scalers.push(DaqMxScaler::read(reader)?);
        }

        let width_count = reader.read_u32()?;
        let mut raw_widths = SmallVec::new();
        for _ in 0..width_count {
            raw_widths.push(reader.read_u32()?);
        }

        Ok(DaqMxFormat { scalers, raw_widths })
    }

    /// Width of the first scaler's sample type; 0 when there is no scaler or
    /// its type is unknown.
    pub fn scaler_width(&self) -> u64 {
        self.scalers
            .first()
            .and_then(DaqMxScaler::data_type)
            .map(|dt| dt.size() as u64)
            .unwrap_or(0)
    }

    /// Scaler width times the first raw buffer width, resolved to the signed
    /// integer type of that size.
    pub fn resolved_type(&self) -> Option<DataType> {
        let buffer_width = *self.raw_widths.first()? as u64;
        match self.scaler_width() * buffer_width {
            8 => Some(DataType::I64),
            4 => Some(DataType::I32),
            2 => Some(DataType::I16),
            _ => None,
        }
    }
}

/// Linear scale read from the channel properties, defaulting to identity.
pub fn linear_scale(properties: &PropertyMap) -> (f64, f64) {
    let slope = properties
        .get(SLOPE_PROPERTY)
        .and_then(|v| v.as_f64())
        .unwrap_or(1.0);
    let intercept = properties
        .get(INTERCEPT_PROPERTY)
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    (slope, intercept)
}

/// Decode one chunk's worth of DAQmx samples for a channel into `staged`.
///
/// `elements` is the value count times the dimension and `share` the bytes
/// the object owns in the chunk; a layout needing more than its share is a
/// `LayoutOverrun`.
///
/// When the resolved width matches the scaler's own type the samples are
/// stored as raw values of that type, which is returned. Otherwise
/// `elements / raw width` `i32` samples are read and stored scaled.
pub(crate) fn decode_daqmx<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    path: &str,
    format: &DaqMxFormat,
    elements: u64,
    share: u64,
    properties: &PropertyMap,
    staged: &mut ChannelBuffer,
) -> Result<Option<DataType>> {
    let scaler = format
        .scalers
        .first()
        .ok_or_else(|| TdmsError::MissingScalers(path.to_string()))?;
    let buffer_width = match format.raw_widths.first() {
        Some(&w) if w > 0 => w as u64,
        _ => return Err(TdmsError::MissingScalers(path.to_string())),
    };

    match format.resolved_type() {
        Some(dt) if dt.id() == scaler.data_type_code => {
            let width = dt.size();
            let needed = checked_bytes(path, elements, width as u64, share)?;
            let mut bytes = reader.read_bytes(needed)?;
            if needs_swap(reader.is_big_endian()) {
                swap_elements(&mut bytes, width);
            }
            staged.push_raw(&bytes, elements);
            Ok(Some(dt))
        }
        _ => {
            let samples = elements / buffer_width;
            checked_bytes(path, samples, 4, share)?;
            let (slope, intercept) = linear_scale(properties);
            for _ in 0..samples {
                let raw = reader.read_i32()?;
                staged.push_scaled(raw as f64 * slope + intercept);
            }
            Ok(None)
        }
    }
}

fn checked_bytes(path: &str, count: u64, width: u64, share: u64) -> Result<usize> {
    match count.checked_mul(width) {
        Some(needed) if needed <= share => Ok(needed as usize),
        needed => Err(TdmsError::LayoutOverrun {
            path: path.to_string(),
            declared: share,
            excess: needed.map_or(u64::MAX, |n| n - share),
        }),
    }
}
