// src/types.rs
use byteorder::{ByteOrder, LittleEndian, BigEndian};
use bytemuck::{Pod, Zeroable};
use chrono::{DateTime, Utc};
use std::fmt;

use crate::utils::format_g;

/// TDMS data type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DataType {
    Void = 0,
    I8 = 1,
    I16 = 2,
    I32 = 3,
    I64 = 4,
    U8 = 5,
    U16 = 6,
    U32 = 7,
    U64 = 8,
    SingleFloat = 9,
    DoubleFloat = 10,
    ExtendedFloat = 11,
    SingleFloatWithUnit = 0x19,
    DoubleFloatWithUnit = 0x1a,
    ExtendedFloatWithUnit = 0x1b,
    String = 0x20,
    Boolean = 0x21,
    TimeStamp = 0x44,
    FixedPoint = 0x4f,
    ComplexSingleFloat = 0x08000c,
    ComplexDoubleFloat = 0x10000d,
    DAQmxRawData = 0xFFFFFFFF,
}

// Add convenient aliases
impl DataType {
    pub const F32: DataType = DataType::SingleFloat;
    pub const F64: DataType = DataType::DoubleFloat;
}

impl DataType {
    /// Width of one value in bytes.
    ///
    /// Extended floats occupy a 16-byte slot of which the first 10 bytes hold
    /// the x87 value. Strings report 0: their size comes from the byte count
    /// of the raw data index. Fixed point and DAQmx raw data also report 0,
    /// the latter being sized through its format changing scalers.
    pub fn size(&self) -> usize {
        match self {
            DataType::Void => 0,
            DataType::I8 | DataType::U8 | DataType::Boolean => 1,
            DataType::I16 | DataType::U16 => 2,
            DataType::I32 | DataType::U32 => 4,
            DataType::SingleFloat | DataType::SingleFloatWithUnit => 4,
            DataType::I64 | DataType::U64 => 8,
            DataType::DoubleFloat | DataType::DoubleFloatWithUnit => 8,
            DataType::ComplexSingleFloat => 8,
            DataType::ExtendedFloat | DataType::ExtendedFloatWithUnit => 16,
            DataType::TimeStamp | DataType::ComplexDoubleFloat => 16,
            DataType::String | DataType::FixedPoint | DataType::DAQmxRawData => 0,
        }
    }

    /// Width of the individual scalars that must be byte-swapped, which
    /// differs from [`DataType::size`] for the composite types.
    pub(crate) fn swap_width(&self) -> usize {
        match self {
            DataType::ComplexSingleFloat => 4,
            DataType::ComplexDoubleFloat => 8,
            other => other.size(),
        }
    }

    /// Whether this is the variable-length string type.
    pub fn is_variable_str(&self) -> bool {
        matches!(self, DataType::String)
    }

    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(DataType::Void),
            1 => Some(DataType::I8),
            2 => Some(DataType::I16),
            3 => Some(DataType::I32),
            4 => Some(DataType::I64),
            5 => Some(DataType::U8),
            6 => Some(DataType::U16),
            7 => Some(DataType::U32),
            8 => Some(DataType::U64),
            9 => Some(DataType::SingleFloat),
            10 => Some(DataType::DoubleFloat),
            11 => Some(DataType::ExtendedFloat),
            0x19 => Some(DataType::SingleFloatWithUnit),
            0x1a => Some(DataType::DoubleFloatWithUnit),
            0x1b => Some(DataType::ExtendedFloatWithUnit),
            0x20 => Some(DataType::String),
            0x21 => Some(DataType::Boolean),
            0x44 => Some(DataType::TimeStamp),
            0x4f => Some(DataType::FixedPoint),
            0x08000c => Some(DataType::ComplexSingleFloat),
            0x10000d => Some(DataType::ComplexDoubleFloat),
            0xFFFFFFFF => Some(DataType::DAQmxRawData),
            _ => None,
        }
    }

    /// The wire id of this type.
    pub fn id(&self) -> u32 {
        *self as u32
    }

    /// Check if this is a numeric type
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Check if this is an integer type
    pub fn is_integer(&self) -> bool {
        matches!(self,
            DataType::I8 | DataType::I16 | DataType::I32 | DataType::I64 |
            DataType::U8 | DataType::U16 | DataType::U32 | DataType::U64
        )
    }

    /// Check if this is a floating point type
    pub fn is_float(&self) -> bool {
        matches!(self,
            DataType::SingleFloat | DataType::DoubleFloat | DataType::ExtendedFloat |
            DataType::SingleFloatWithUnit | DataType::DoubleFloatWithUnit |
            DataType::ExtendedFloatWithUnit
        )
    }

    /// Check if this is a complex type
    pub fn is_complex(&self) -> bool {
        matches!(self, DataType::ComplexSingleFloat | DataType::ComplexDoubleFloat)
    }

    /// Get the name of the data type as a string
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Void => "void",
            DataType::I8 => "i8",
            DataType::I16 => "i16",
            DataType::I32 => "i32",
            DataType::I64 => "i64",
            DataType::U8 => "u8",
            DataType::U16 => "u16",
            DataType::U32 => "u32",
            DataType::U64 => "u64",
            DataType::SingleFloat => "f32",
            DataType::DoubleFloat => "f64",
            DataType::ExtendedFloat => "f80",
            DataType::SingleFloatWithUnit => "f32_unit",
            DataType::DoubleFloatWithUnit => "f64_unit",
            DataType::ExtendedFloatWithUnit => "f80_unit",
            DataType::String => "string",
            DataType::Boolean => "bool",
            DataType::TimeStamp => "timestamp",
            DataType::FixedPoint => "fixed_point",
            DataType::ComplexSingleFloat => "complex_f32",
            DataType::ComplexDoubleFloat => "complex_f64",
            DataType::DAQmxRawData => "daqmx_raw",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:X})", self.name(), self.id())
    }
}

/// Table of Contents flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TocFlags(u32);

impl TocFlags {
    pub const METADATA: u32 = 1 << 1;
    pub const NEW_OBJ_LIST: u32 = 1 << 2;
    pub const RAW_DATA: u32 = 1 << 3;
    pub const INTERLEAVED: u32 = 1 << 5;
    pub const BIG_ENDIAN: u32 = 1 << 6;
    pub const DAQMX_RAW_DATA: u32 = 1 << 7;

    pub fn new(flags: u32) -> Self {
        TocFlags(flags)
    }

    pub fn empty() -> Self {
        TocFlags(0)
    }

    pub fn has_metadata(&self) -> bool {
        self.0 & Self::METADATA != 0
    }

    pub fn has_new_obj_list(&self) -> bool {
        self.0 & Self::NEW_OBJ_LIST != 0
    }

    pub fn has_raw_data(&self) -> bool {
        self.0 & Self::RAW_DATA != 0
    }

    pub fn is_interleaved(&self) -> bool {
        self.0 & Self::INTERLEAVED != 0
    }

    pub fn is_big_endian(&self) -> bool {
        self.0 & Self::BIG_ENDIAN != 0
    }

    pub fn has_daqmx_data(&self) -> bool {
        self.0 & Self::DAQMX_RAW_DATA != 0
    }

    pub fn set_metadata(&mut self, value: bool) {
        self.set(Self::METADATA, value);
    }

    pub fn set_new_obj_list(&mut self, value: bool) {
        self.set(Self::NEW_OBJ_LIST, value);
    }

    pub fn set_raw_data(&mut self, value: bool) {
        self.set(Self::RAW_DATA, value);
    }

    pub fn set_interleaved(&mut self, value: bool) {
        self.set(Self::INTERLEAVED, value);
    }

    pub fn set_big_endian(&mut self, value: bool) {
        self.set(Self::BIG_ENDIAN, value);
    }

    pub fn set_daqmx_data(&mut self, value: bool) {
        self.set(Self::DAQMX_RAW_DATA, value);
    }

    fn set(&mut self, bit: u32, value: bool) {
        if value {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }

    pub fn raw_value(&self) -> u32 {
        self.0
    }
}

/// TDMS timestamp (seconds since 1904-01-01 00:00:00 UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct Timestamp {
    /// Fractions of a second (units of 2^-64)
    pub fractions: u64,
    /// Seconds since epoch (1904-01-01)
    pub seconds: i64,
}

impl Timestamp {
    pub const EPOCH_OFFSET_SECONDS: i64 = 2_082_844_800; // 1904 to 1970

    pub fn new(seconds: i64, fractions: u64) -> Self {
        Timestamp { fractions, seconds }
    }

    pub fn from_bytes_le(bytes: &[u8; 16]) -> Self {
        let fractions = LittleEndian::read_u64(&bytes[0..8]);
        let seconds = LittleEndian::read_i64(&bytes[8..16]);
        Timestamp { seconds, fractions }
    }

    pub fn from_bytes_be(bytes: &[u8; 16]) -> Self {
        let seconds = BigEndian::read_i64(&bytes[0..8]);
        let fractions = BigEndian::read_u64(&bytes[8..16]);
        Timestamp { seconds, fractions }
    }

    /// Seconds relative to the Unix epoch.
    pub fn unix_seconds(&self) -> i64 {
        self.seconds - Self::EPOCH_OFFSET_SECONDS
    }

    /// The fractional second as a float in `[0, 1)`.
    pub fn fraction(&self) -> f64 {
        self.fractions as f64 / 18_446_744_073_709_551_616.0 // 2^64
    }

    pub fn subsec_nanos(&self) -> u32 {
        ((self.fractions as u128 * 1_000_000_000) >> 64) as u32
    }

    /// UTC date-time, or `None` when the seconds fall outside chrono's range.
    pub fn to_date_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.unix_seconds(), self.subsec_nanos())
    }

    /// Render as `dd.mm.yyyy hh:mm:ss,ffffff` in UTC.
    pub fn format_tdms(&self) -> String {
        match DateTime::from_timestamp(self.unix_seconds(), 0) {
            Some(dt) => format!(
                "{},{:06}",
                dt.format("%d.%m.%Y %H:%M:%S"),
                self.subsec_nanos() / 1_000
            ),
            None => format!("{}s,{}", self.seconds, self.fractions),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_tdms())
    }
}

/// Property value that can be attached to objects
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Float(f32),
    Double(f64),
    Extended(f64),
    FloatWithUnit(f32),
    DoubleWithUnit(f64),
    ExtendedWithUnit(f64),
    String(String),
    Boolean(bool),
    Timestamp(Timestamp),
    ComplexFloat(f32, f32),
    ComplexDouble(f64, f64),
}

impl PropertyValue {
    pub fn data_type(&self) -> DataType {
        match self {
            PropertyValue::I8(_) => DataType::I8,
            PropertyValue::I16(_) => DataType::I16,
            PropertyValue::I32(_) => DataType::I32,
            PropertyValue::I64(_) => DataType::I64,
            PropertyValue::U8(_) => DataType::U8,
            PropertyValue::U16(_) => DataType::U16,
            PropertyValue::U32(_) => DataType::U32,
            PropertyValue::U64(_) => DataType::U64,
            PropertyValue::Float(_) => DataType::SingleFloat,
            PropertyValue::Double(_) => DataType::DoubleFloat,
            PropertyValue::Extended(_) => DataType::ExtendedFloat,
            PropertyValue::FloatWithUnit(_) => DataType::SingleFloatWithUnit,
            PropertyValue::DoubleWithUnit(_) => DataType::DoubleFloatWithUnit,
            PropertyValue::ExtendedWithUnit(_) => DataType::ExtendedFloatWithUnit,
            PropertyValue::String(_) => DataType::String,
            PropertyValue::Boolean(_) => DataType::Boolean,
            PropertyValue::Timestamp(_) => DataType::TimeStamp,
            PropertyValue::ComplexFloat(..) => DataType::ComplexSingleFloat,
            PropertyValue::ComplexDouble(..) => DataType::ComplexDoubleFloat,
        }
    }

    /// Numeric view of the value. Strings are parsed, so a scale factor
    /// stored as text is still usable.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::I8(v) => Some(*v as f64),
            PropertyValue::I16(v) => Some(*v as f64),
            PropertyValue::I32(v) => Some(*v as f64),
            PropertyValue::I64(v) => Some(*v as f64),
            PropertyValue::U8(v) => Some(*v as f64),
            PropertyValue::U16(v) => Some(*v as f64),
            PropertyValue::U32(v) => Some(*v as f64),
            PropertyValue::U64(v) => Some(*v as f64),
            PropertyValue::Float(v) | PropertyValue::FloatWithUnit(v) => Some(*v as f64),
            PropertyValue::Double(v)
            | PropertyValue::Extended(v)
            | PropertyValue::DoubleWithUnit(v)
            | PropertyValue::ExtendedWithUnit(v) => Some(*v),
            PropertyValue::Boolean(v) => Some(if *v { 1.0 } else { 0.0 }),
            PropertyValue::String(s) => s.trim().parse().ok(),
            PropertyValue::Timestamp(_)
            | PropertyValue::ComplexFloat(..)
            | PropertyValue::ComplexDouble(..) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Printable form: integers in decimal, floats like `%g`, booleans as
/// `0`/`1`, timestamps as `dd.mm.yyyy hh:mm:ss,ffffff`, complex as `re+i*im`.
impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::I8(v) => write!(f, "{}", v),
            PropertyValue::I16(v) => write!(f, "{}", v),
            PropertyValue::I32(v) => write!(f, "{}", v),
            PropertyValue::I64(v) => write!(f, "{}", v),
            PropertyValue::U8(v) => write!(f, "{}", v),
            PropertyValue::U16(v) => write!(f, "{}", v),
            PropertyValue::U32(v) => write!(f, "{}", v),
            PropertyValue::U64(v) => write!(f, "{}", v),
            PropertyValue::Float(v) | PropertyValue::FloatWithUnit(v) => {
                f.write_str(&format_g(*v as f64))
            }
            PropertyValue::Double(v)
            | PropertyValue::Extended(v)
            | PropertyValue::DoubleWithUnit(v)
            | PropertyValue::ExtendedWithUnit(v) => f.write_str(&format_g(*v)),
            PropertyValue::String(s) => f.write_str(s),
            PropertyValue::Boolean(v) => f.write_str(if *v { "1" } else { "0" }),
            PropertyValue::Timestamp(ts) => write!(f, "{}", ts),
            PropertyValue::ComplexFloat(re, im) => {
                write!(f, "{}+i*{}", format_g(*re as f64), format_g(*im as f64))
            }
            PropertyValue::ComplexDouble(re, im) => {
                write!(f, "{}+i*{}", format_g(*re), format_g(*im))
            }
        }
    }
}

/// Represents a property with name and value
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
}

impl Property {
    pub fn new(name: impl Into<String>, value: PropertyValue) -> Self {
        Property {
            name: name.into(),
            value,
        }
    }
}
