// tests/common/mod.rs
//! Minimal TDMS encoder for building test inputs byte by byte.
#![allow(dead_code)]

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};

pub const TOC_METADATA: u32 = 1 << 1;
pub const TOC_NEW_OBJ_LIST: u32 = 1 << 2;
pub const TOC_RAW_DATA: u32 = 1 << 3;
pub const TOC_INTERLEAVED: u32 = 1 << 5;
pub const TOC_BIG_ENDIAN: u32 = 1 << 6;
pub const TOC_DAQMX: u32 = 1 << 7;

/// Raw data index of an object.
pub enum Index {
    NoData,
    MatchesPrevious,
    Data { type_code: u32, count: u64 },
    Strings { count: u64, bytes: u64 },
    DaqMx { scaler_type: u32, width: u32, count: u64 },
}

/// A property value with its wire type.
pub enum Prop<'a> {
    I32(i32),
    F64(f64),
    Str(&'a str),
    Bool(bool),
    /// Type code with an arbitrary payload.
    Raw(u32, &'a [u8]),
}

/// One segment: lead-in, optional metadata, raw data.
///
/// Call [`Segment::big_endian`] before adding anything, multi-byte values are
/// encoded as they are added.
pub struct Segment {
    toc: u32,
    with_metadata: bool,
    object_count: u32,
    meta: Vec<u8>,
    raw: Vec<u8>,
    next_offset: Option<i64>,
}

impl Default for Segment {
    fn default() -> Self {
        Self::new()
    }
}

impl Segment {
    pub fn new() -> Self {
        Segment {
            toc: 0,
            with_metadata: true,
            object_count: 0,
            meta: Vec::new(),
            raw: Vec::new(),
            next_offset: None,
        }
    }

    /// A segment reusing the previous object list.
    pub fn raw_only() -> Self {
        Segment {
            with_metadata: false,
            ..Self::new()
        }
    }

    pub fn big_endian(mut self) -> Self {
        self.toc |= TOC_BIG_ENDIAN;
        self
    }

    pub fn interleaved(mut self) -> Self {
        self.toc |= TOC_INTERLEAVED;
        self
    }

    /// Override the next segment offset written in the lead-in.
    pub fn next_offset(mut self, next: i64) -> Self {
        self.next_offset = Some(next);
        self
    }

    fn be(&self) -> bool {
        self.toc & TOC_BIG_ENDIAN != 0
    }

    fn put_u32(buf: &mut Vec<u8>, be: bool, v: u32) {
        if be {
            buf.write_u32::<BigEndian>(v).unwrap();
        } else {
            buf.write_u32::<LittleEndian>(v).unwrap();
        }
    }

    fn put_u64(buf: &mut Vec<u8>, be: bool, v: u64) {
        if be {
            buf.write_u64::<BigEndian>(v).unwrap();
        } else {
            buf.write_u64::<LittleEndian>(v).unwrap();
        }
    }

    fn put_str(buf: &mut Vec<u8>, be: bool, s: &str) {
        Self::put_u32(buf, be, s.len() as u32);
        buf.extend_from_slice(s.as_bytes());
    }

    pub fn object(self, path: &str, index: Index) -> Self {
        self.object_with(path, index, &[])
    }

    pub fn object_with(mut self, path: &str, index: Index, props: &[(&str, Prop)]) -> Self {
        let be = self.be();
        let m = &mut self.meta;
        Self::put_str(m, be, path);
        match index {
            Index::NoData => Self::put_u32(m, be, 0xFFFF_FFFF),
            Index::MatchesPrevious => Self::put_u32(m, be, 0),
            Index::Data { type_code, count } => {
                Self::put_u32(m, be, 20);
                Self::put_u32(m, be, type_code);
                Self::put_u32(m, be, 1);
                Self::put_u64(m, be, count);
            }
            Index::Strings { count, bytes } => {
                Self::put_u32(m, be, 28);
                Self::put_u32(m, be, 0x20);
                Self::put_u32(m, be, 1);
                Self::put_u64(m, be, count);
                Self::put_u64(m, be, bytes);
            }
            Index::DaqMx { scaler_type, width, count } => {
                Self::put_u32(m, be, 0x1269);
                Self::put_u32(m, be, 0xFFFF_FFFF);
                Self::put_u32(m, be, 1);
                Self::put_u64(m, be, count);
                Self::put_u32(m, be, 1);
                for field in [scaler_type, 0, 0, 0, 0] {
                    Self::put_u32(m, be, field);
                }
                Self::put_u32(m, be, 1);
                Self::put_u32(m, be, width);
                self.toc |= TOC_DAQMX;
            }
        }

        Self::put_u32(m, be, props.len() as u32);
        for (name, value) in props {
            Self::put_str(m, be, name);
            match value {
                Prop::I32(v) => {
                    Self::put_u32(m, be, 3);
                    Self::put_u32(m, be, *v as u32);
                }
                Prop::F64(v) => {
                    Self::put_u32(m, be, 10);
                    Self::put_u64(m, be, v.to_bits());
                }
                Prop::Str(s) => {
                    Self::put_u32(m, be, 0x20);
                    Self::put_str(m, be, s);
                }
                Prop::Bool(b) => {
                    Self::put_u32(m, be, 0x21);
                    m.push(*b as u8);
                }
                Prop::Raw(code, payload) => {
                    Self::put_u32(m, be, *code);
                    m.extend_from_slice(payload);
                }
            }
        }
        self.object_count += 1;
        self
    }

    pub fn raw_i16(mut self, values: &[i16]) -> Self {
        let be = self.be();
        for &v in values {
            let mut b = [0u8; 2];
            if be {
                BigEndian::write_i16(&mut b, v);
            } else {
                LittleEndian::write_i16(&mut b, v);
            }
            self.raw.extend_from_slice(&b);
        }
        self
    }

    pub fn raw_i32(mut self, values: &[i32]) -> Self {
        let be = self.be();
        for &v in values {
            Self::put_u32(&mut self.raw, be, v as u32);
        }
        self
    }

    pub fn raw_f64(mut self, values: &[f64]) -> Self {
        let be = self.be();
        for &v in values {
            Self::put_u64(&mut self.raw, be, v.to_bits());
        }
        self
    }

    pub fn raw_u64(mut self, values: &[u64]) -> Self {
        let be = self.be();
        for &v in values {
            Self::put_u64(&mut self.raw, be, v);
        }
        self
    }

    pub fn raw_bytes(mut self, bytes: &[u8]) -> Self {
        self.raw.extend_from_slice(bytes);
        self
    }

    /// Offset table then the concatenated strings.
    pub fn raw_strings(mut self, values: &[&str]) -> Self {
        let be = self.be();
        let mut end = 0u32;
        for v in values {
            end += v.len() as u32;
            Self::put_u32(&mut self.raw, be, end);
        }
        for v in values {
            self.raw.extend_from_slice(v.as_bytes());
        }
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut toc = self.toc;
        let mut meta = Vec::new();
        if self.with_metadata {
            toc |= TOC_METADATA | TOC_NEW_OBJ_LIST;
            Self::put_u32(&mut meta, toc & TOC_BIG_ENDIAN != 0, self.object_count);
            meta.extend_from_slice(&self.meta);
        }
        if !self.raw.is_empty() {
            toc |= TOC_RAW_DATA;
        }

        let next = self
            .next_offset
            .unwrap_or((meta.len() + self.raw.len()) as i64);

        let mut out = Vec::with_capacity(28 + meta.len() + self.raw.len());
        out.extend_from_slice(b"TDSm");
        out.write_u32::<LittleEndian>(toc).unwrap();
        out.write_u32::<LittleEndian>(4713).unwrap();
        out.write_i64::<LittleEndian>(next).unwrap();
        out.write_u64::<LittleEndian>(meta.len() as u64).unwrap();
        out.extend_from_slice(&meta);
        out.extend_from_slice(&self.raw);
        out
    }
}

/// Concatenate segments into a file image.
pub fn file(segments: Vec<Segment>) -> Vec<u8> {
    segments.into_iter().flat_map(Segment::build).collect()
}
