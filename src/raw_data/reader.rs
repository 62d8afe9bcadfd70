// src/raw_data/reader.rs
use crate::error::{TdmsError, Result};
use crate::types::Timestamp;
use crate::utils::{decode_null_padded, decode_tdms_string, extended_to_f64};
use std::io::{Read, Seek, SeekFrom};
use byteorder::{ReadBytesExt, LittleEndian, BigEndian};

/// Positioned, endian-aware cursor over a seekable byte source.
///
/// The byte order is a run-time property: every multi-byte read honours
/// [`ByteReader::is_big_endian`], which the segment parser sets from the
/// lead-in of the segment being decoded. Reads never run past the end of the
/// source; a short source yields [`TdmsError::Truncated`] and leaves the
/// position unchanged.
///
/// # Example
///
/// ```
/// use tdms_decoder::raw_data::ByteReader;
/// use std::io::Cursor;
///
/// let mut reader = ByteReader::new(Cursor::new(vec![0u8, 0, 1, 0])).unwrap();
/// assert_eq!(reader.read_i32().unwrap(), 65536);
///
/// reader.seek(0).unwrap();
/// reader.set_big_endian(true);
/// assert_eq!(reader.read_i32().unwrap(), 256);
/// ```
pub struct ByteReader<R> {
    inner: R,
    len: u64,
    pos: u64,
    big_endian: bool,
}

impl<R: Read + Seek> ByteReader<R> {
    /// Wrap a source, measuring its total length and rewinding to the start.
    pub fn new(mut inner: R) -> Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(ByteReader {
            inner,
            len,
            pos: 0,
            big_endian: false,
        })
    }

    pub fn set_big_endian(&mut self, big_endian: bool) {
        self.big_endian = big_endian;
    }

    pub fn is_big_endian(&self) -> bool {
        self.big_endian
    }

    /// Current absolute offset.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Total size of the source in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes between the cursor and the end of the source.
    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.pos)
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.len
    }

    /// Move to an absolute offset. Offsets past the end are clamped.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        let pos = pos.min(self.len);
        if pos != self.pos {
            self.inner.seek(SeekFrom::Start(pos))?;
            self.pos = pos;
        }
        Ok(())
    }

    /// Advance by `count` bytes without decoding them.
    pub fn skip(&mut self, count: u64) -> Result<()> {
        self.ensure(count)?;
        self.inner.seek(SeekFrom::Current(count as i64))?;
        self.pos += count;
        Ok(())
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn ensure(&self, needed: u64) -> Result<()> {
        let available = self.remaining();
        if needed > available {
            return Err(TdmsError::Truncated {
                offset: self.pos,
                needed,
                available,
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let value = self.inner.read_u8()?;
        self.pos += 1;
        Ok(value)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.ensure(1)?;
        let value = self.inner.read_i8()?;
        self.pos += 1;
        Ok(value)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.ensure(2)?;
        let value = if self.big_endian {
            self.inner.read_i16::<BigEndian>()?
        } else {
            self.inner.read_i16::<LittleEndian>()?
        };
        self.pos += 2;
        Ok(value)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        let value = if self.big_endian {
            self.inner.read_u16::<BigEndian>()?
        } else {
            self.inner.read_u16::<LittleEndian>()?
        };
        self.pos += 2;
        Ok(value)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        let value = if self.big_endian {
            self.inner.read_i32::<BigEndian>()?
        } else {
            self.inner.read_i32::<LittleEndian>()?
        };
        self.pos += 4;
        Ok(value)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        let value = if self.big_endian {
            self.inner.read_u32::<BigEndian>()?
        } else {
            self.inner.read_u32::<LittleEndian>()?
        };
        self.pos += 4;
        Ok(value)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.ensure(8)?;
        let value = if self.big_endian {
            self.inner.read_i64::<BigEndian>()?
        } else {
            self.inner.read_i64::<LittleEndian>()?
        };
        self.pos += 8;
        Ok(value)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.ensure(8)?;
        let value = if self.big_endian {
            self.inner.read_u64::<BigEndian>()?
        } else {
            self.inner.read_u64::<LittleEndian>()?
        };
        self.pos += 8;
        Ok(value)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.ensure(4)?;
        let value = if self.big_endian {
            self.inner.read_f32::<BigEndian>()?
        } else {
            self.inner.read_f32::<LittleEndian>()?
        };
        self.pos += 4;
        Ok(value)
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.ensure(8)?;
        let value = if self.big_endian {
            self.inner.read_f64::<BigEndian>()?
        } else {
            self.inner.read_f64::<LittleEndian>()?
        };
        self.pos += 8;
        Ok(value)
    }

    /// Read one 16-byte extended precision slot, returned in little-endian
    /// slot order (x87 value in the first 10 bytes).
    pub fn read_extended_slot(&mut self) -> Result<[u8; 16]> {
        let mut slot: [u8; 16] = self.read_array()?;
        if self.big_endian {
            slot.reverse();
        }
        Ok(slot)
    }

    /// Read an 80-bit x87 extended value stored in a 16-byte slot.
    pub fn read_extended(&mut self) -> Result<f64> {
        let slot = self.read_extended_slot()?;
        let mut x87 = [0u8; 10];
        x87.copy_from_slice(&slot[..10]);
        Ok(extended_to_f64(&x87))
    }

    /// Read a TDMS timestamp: `u64` fraction then `i64` seconds, with the
    /// whole 16 bytes reversed in big-endian streams.
    pub fn read_timestamp(&mut self) -> Result<Timestamp> {
        let bytes: [u8; 16] = self.read_array()?;
        Ok(if self.big_endian {
            Timestamp::from_bytes_be(&bytes)
        } else {
            Timestamp::from_bytes_le(&bytes)
        })
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_into(&mut buf)?;
        Ok(buf)
    }

    /// Fill `buf` completely or fail without consuming anything.
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        self.ensure(buf.len() as u64)?;
        self.inner.read_exact(buf)?;
        self.pos += buf.len() as u64;
        Ok(())
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        self.ensure(count as u64)?;
        let mut buf = vec![0u8; count];
        self.inner.read_exact(&mut buf)?;
        self.pos += count as u64;
        Ok(buf)
    }

    /// Read a fixed-length field, dropping everything from the first NUL.
    pub fn read_fixed_string(&mut self, count: usize) -> Result<String> {
        let bytes = self.read_bytes(count)?;
        Ok(decode_null_padded(&bytes))
    }

    /// Read a `u32` byte length followed by that many UTF-8 bytes.
    pub fn read_length_prefixed_string(&mut self) -> Result<String> {
        let start = self.pos;
        let len = self.read_u32()? as u64;
        if let Err(err) = self.ensure(len) {
            self.seek(start)?;
            return Err(err);
        }
        let bytes = self.read_bytes(len as usize)?;
        decode_tdms_string(&bytes)
    }
}
