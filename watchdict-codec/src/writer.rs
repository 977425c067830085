//! Incremental dictionary writer
//!
//! Tuples are appended strictly in order. The header byte is kept current
//! after every append, so the written prefix of the buffer is always a
//! valid dictionary. Every write is bounds-checked against the buffer
//! passed to [`DictWriter::begin`]; a failed write leaves the buffer and
//! the cursor untouched.

use crate::error::DictError;
use crate::tuple::{
    Tuple, TupleType, DICT_HEADER_SIZE, MAX_TUPLES, MAX_VALUE_LEN, TUPLE_HEADER_SIZE,
};
use crate::tuplet::{c_str_bytes, Tuplet, TupletValue};

/// Write cursor over a caller-owned dictionary buffer
#[derive(Debug)]
pub struct DictWriter<'a> {
    buf: &'a mut [u8],
    cursor: usize,
    count: u8,
}

impl<'a> DictWriter<'a> {
    /// Start an empty dictionary in `buf`
    pub fn begin(buf: &'a mut [u8]) -> Result<Self, DictError> {
        if buf.len() < DICT_HEADER_SIZE {
            return Err(DictError::NotEnoughStorage);
        }
        buf[0] = 0;
        Ok(Self {
            buf,
            cursor: DICT_HEADER_SIZE,
            count: 0,
        })
    }

    /// Bytes written so far, header included
    pub fn size(&self) -> usize {
        self.cursor
    }

    /// Bytes still available for tuples
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.cursor
    }

    /// Number of tuples written
    pub fn count(&self) -> usize {
        self.count as usize
    }

    /// The dictionary written so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.cursor]
    }

    /// Append a byte array
    pub fn write_data(&mut self, key: u32, data: &[u8]) -> Result<(), DictError> {
        self.append(key, TupleType::ByteArray, data, false)
    }

    /// Append a C-string
    ///
    /// The terminator is added here. Like a C string, `s` ends at its first
    /// NUL if it contains one.
    pub fn write_cstring(&mut self, key: u32, s: &str) -> Result<(), DictError> {
        self.append(key, TupleType::CString, c_str_bytes(s), true)
    }

    /// Append an integer of the given width
    ///
    /// The low `width` bytes of `value` are stored little-endian. `width`
    /// must be 1, 2 or 4.
    pub fn write_int(
        &mut self,
        key: u32,
        value: i64,
        width: u8,
        signed: bool,
    ) -> Result<(), DictError> {
        if !matches!(width, 1 | 2 | 4) {
            return Err(DictError::InvalidArgs);
        }
        let tuple_type = if signed { TupleType::Int } else { TupleType::UInt };
        let bytes = value.to_le_bytes();
        self.append(key, tuple_type, &bytes[..width as usize], false)
    }

    pub fn write_u8(&mut self, key: u32, value: u8) -> Result<(), DictError> {
        self.append(key, TupleType::UInt, &value.to_le_bytes(), false)
    }

    pub fn write_u16(&mut self, key: u32, value: u16) -> Result<(), DictError> {
        self.append(key, TupleType::UInt, &value.to_le_bytes(), false)
    }

    pub fn write_u32(&mut self, key: u32, value: u32) -> Result<(), DictError> {
        self.append(key, TupleType::UInt, &value.to_le_bytes(), false)
    }

    pub fn write_i8(&mut self, key: u32, value: i8) -> Result<(), DictError> {
        self.append(key, TupleType::Int, &value.to_le_bytes(), false)
    }

    pub fn write_i16(&mut self, key: u32, value: i16) -> Result<(), DictError> {
        self.append(key, TupleType::Int, &value.to_le_bytes(), false)
    }

    pub fn write_i32(&mut self, key: u32, value: i32) -> Result<(), DictError> {
        self.append(key, TupleType::Int, &value.to_le_bytes(), false)
    }

    /// Append the entry described by a tuplet
    pub fn write_tuplet(&mut self, tuplet: &Tuplet<'_>) -> Result<(), DictError> {
        match tuplet.value {
            TupletValue::Bytes(data) => self.write_data(tuplet.key, data),
            TupletValue::CString(s) => self.write_cstring(tuplet.key, s),
            TupletValue::Integer { bytes, width, .. } => {
                if !matches!(width, 1 | 2 | 4) {
                    return Err(DictError::InvalidArgs);
                }
                self.append(tuplet.key, tuplet.tuple_type(), &bytes[..width as usize], false)
            }
        }
    }

    /// Append a copy of an already-decoded tuple
    pub fn write_tuple(&mut self, tuple: &Tuple<'_>) -> Result<(), DictError> {
        self.append(tuple.key, tuple.tuple_type, tuple.data(), false)
    }

    /// Finish writing and return the total dictionary size in bytes
    pub fn end(self) -> usize {
        self.cursor
    }

    fn append(
        &mut self,
        key: u32,
        tuple_type: TupleType,
        data: &[u8],
        nul_terminated: bool,
    ) -> Result<(), DictError> {
        let length = data.len() + usize::from(nul_terminated);
        if length > MAX_VALUE_LEN {
            return Err(DictError::InvalidArgs);
        }
        if self.count() >= MAX_TUPLES {
            return Err(DictError::NotEnoughStorage);
        }
        let needed = TUPLE_HEADER_SIZE + length;
        if needed > self.remaining() {
            return Err(DictError::NotEnoughStorage);
        }

        let out = &mut self.buf[self.cursor..self.cursor + needed];
        out[0..4].copy_from_slice(&key.to_le_bytes());
        out[4] = tuple_type.to_byte();
        out[5..7].copy_from_slice(&(length as u16).to_le_bytes());
        out[TUPLE_HEADER_SIZE..TUPLE_HEADER_SIZE + data.len()].copy_from_slice(data);
        if nul_terminated {
            out[needed - 1] = 0;
        }

        self.cursor += needed;
        self.count += 1;
        self.buf[0] = self.count;
        Ok(())
    }
}
