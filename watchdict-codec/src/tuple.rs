//! Serialized dictionary entries
//!
//! A tuple is a single key/value record inside a dictionary buffer.
//! Tuples returned by the reader borrow the buffer; their value bytes are
//! never copied.

use crate::error::DictError;

/// Size of the dictionary header (tuple count)
pub const DICT_HEADER_SIZE: usize = 1;

/// Size of a tuple header (KEY + TYPE + LENGTH)
pub const TUPLE_HEADER_SIZE: usize = 4 + 1 + 2;

/// Maximum number of tuples a dictionary can hold
pub const MAX_TUPLES: usize = u8::MAX as usize;

/// Maximum value length of a single tuple
pub const MAX_VALUE_LEN: usize = u16::MAX as usize;

// Wire format values
const TYPE_BYTE_ARRAY: u8 = 0;
const TYPE_CSTRING: u8 = 1;
const TYPE_UINT: u8 = 2;
const TYPE_INT: u8 = 3;

/// Value type of a tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TupleType {
    /// Opaque bytes
    ByteArray,
    /// NUL-terminated string; the length includes the terminator
    CString,
    /// Unsigned integer of 1, 2 or 4 bytes
    UInt,
    /// Signed integer of 1, 2 or 4 bytes
    Int,
}

impl TupleType {
    /// Parse a type from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            TYPE_BYTE_ARRAY => Some(TupleType::ByteArray),
            TYPE_CSTRING => Some(TupleType::CString),
            TYPE_UINT => Some(TupleType::UInt),
            TYPE_INT => Some(TupleType::Int),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            TupleType::ByteArray => TYPE_BYTE_ARRAY,
            TupleType::CString => TYPE_CSTRING,
            TupleType::UInt => TYPE_UINT,
            TupleType::Int => TYPE_INT,
        }
    }

    /// Returns true for the two integer types
    pub fn is_integer(self) -> bool {
        matches!(self, TupleType::UInt | TupleType::Int)
    }
}

/// Typed view of a tuple value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Value<'a> {
    Bytes(&'a [u8]),
    /// String contents without the terminator
    CString(&'a str),
    U8(u8),
    U16(u16),
    U32(u32),
    I8(i8),
    I16(i16),
    I32(i32),
}

/// A key/value record borrowed from a dictionary buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tuple<'a> {
    /// Application-defined key
    pub key: u32,
    /// How the value bytes are interpreted
    pub tuple_type: TupleType,
    data: &'a [u8],
}

impl<'a> Tuple<'a> {
    /// Create a tuple view over raw value bytes
    ///
    /// Fails with `InvalidArgs` if the value does not fit the 16-bit length
    /// field.
    pub fn new(key: u32, tuple_type: TupleType, data: &'a [u8]) -> Result<Self, DictError> {
        if data.len() > MAX_VALUE_LEN {
            return Err(DictError::InvalidArgs);
        }
        Ok(Self {
            key,
            tuple_type,
            data,
        })
    }

    /// Decode the tuple starting at `offset` in `buf`
    ///
    /// Returns `None` if the header or the payload would run past the end of
    /// `buf`, or if the type byte is unknown. Nothing beyond `buf.len()` is
    /// ever read.
    pub(crate) fn parse(buf: &'a [u8], offset: usize) -> Option<Self> {
        let header_end = offset.checked_add(TUPLE_HEADER_SIZE)?;
        let header = buf.get(offset..header_end)?;

        let key = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let tuple_type = TupleType::from_byte(header[4])?;
        let length = u16::from_le_bytes([header[5], header[6]]) as usize;

        let data = buf.get(header_end..header_end.checked_add(length)?)?;
        Some(Self {
            key,
            tuple_type,
            data,
        })
    }

    /// Value length in bytes (as stored in the LENGTH field)
    pub fn length(&self) -> u16 {
        self.data.len() as u16
    }

    /// Raw value bytes
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Number of bytes this tuple occupies in a dictionary
    pub fn encoded_len(&self) -> usize {
        TUPLE_HEADER_SIZE + self.data.len()
    }

    /// Interpret the value according to its type and length
    pub fn value(&self) -> Result<Value<'a>, DictError> {
        let d = self.data;
        match self.tuple_type {
            TupleType::ByteArray => Ok(Value::Bytes(d)),
            TupleType::CString => {
                let end = d.iter().position(|&b| b == 0).unwrap_or(d.len());
                core::str::from_utf8(&d[..end])
                    .map(Value::CString)
                    .map_err(|_| DictError::InternalInconsistency)
            }
            TupleType::UInt => match d.len() {
                1 => Ok(Value::U8(d[0])),
                2 => Ok(Value::U16(u16::from_le_bytes([d[0], d[1]]))),
                4 => Ok(Value::U32(u32::from_le_bytes([d[0], d[1], d[2], d[3]]))),
                _ => Err(DictError::InternalInconsistency),
            },
            TupleType::Int => match d.len() {
                1 => Ok(Value::I8(d[0] as i8)),
                2 => Ok(Value::I16(i16::from_le_bytes([d[0], d[1]]))),
                4 => Ok(Value::I32(i32::from_le_bytes([d[0], d[1], d[2], d[3]]))),
                _ => Err(DictError::InternalInconsistency),
            },
        }
    }

    /// Integer value widened to u32 (unsigned tuples only)
    pub fn as_u32(&self) -> Option<u32> {
        match self.value().ok()? {
            Value::U8(v) => Some(v.into()),
            Value::U16(v) => Some(v.into()),
            Value::U32(v) => Some(v),
            _ => None,
        }
    }

    /// Integer value widened to i32 (signed tuples only)
    pub fn as_i32(&self) -> Option<i32> {
        match self.value().ok()? {
            Value::I8(v) => Some(v.into()),
            Value::I16(v) => Some(v.into()),
            Value::I32(v) => Some(v),
            _ => None,
        }
    }

    /// String contents of a C-string tuple
    pub fn as_cstr(&self) -> Option<&'a str> {
        match self.value().ok()? {
            Value::CString(s) => Some(s),
            _ => None,
        }
    }

    /// Raw bytes of a byte array tuple
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self.tuple_type {
            TupleType::ByteArray => Some(self.data),
            _ => None,
        }
    }
}
