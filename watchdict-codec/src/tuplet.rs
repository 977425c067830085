//! Unserialized key/value descriptions
//!
//! A [`Tuplet`] references caller-owned data (or stores a small integer
//! inline) and describes one entry to be written. Tuplets are input to
//! batch serialization; they are never themselves part of the wire format.

use crate::tuple::TupleType;

mod sealed {
    pub trait Sealed {}
}

/// Integer types that can be stored in a tuplet
///
/// The wire width and signedness follow the Rust type.
pub trait TupletInteger: sealed::Sealed + Copy {
    /// Width in bytes (1, 2 or 4)
    const WIDTH: u8;
    /// Whether the value is stored as a signed integer
    const SIGNED: bool;

    /// Little-endian bytes, zero-extended to four bytes
    fn to_le_word(self) -> [u8; 4];
}

macro_rules! impl_tuplet_integer {
    ($($ty:ty => $width:expr, $signed:expr;)*) => {
        $(
            impl sealed::Sealed for $ty {}

            impl TupletInteger for $ty {
                const WIDTH: u8 = $width;
                const SIGNED: bool = $signed;

                fn to_le_word(self) -> [u8; 4] {
                    let mut word = [0u8; 4];
                    word[..$width].copy_from_slice(&self.to_le_bytes());
                    word
                }
            }
        )*
    };
}

impl_tuplet_integer! {
    u8 => 1, false;
    u16 => 2, false;
    u32 => 4, false;
    i8 => 1, true;
    i16 => 2, true;
    i32 => 4, true;
}

/// Value referenced by a tuplet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TupletValue<'a> {
    /// Byte array
    Bytes(&'a [u8]),
    /// String; serialized with a trailing NUL
    CString(&'a str),
    /// Integer stored inline
    Integer {
        bytes: [u8; 4],
        width: u8,
        signed: bool,
    },
}

/// Key/value pair to be serialized into a dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tuplet<'a> {
    pub key: u32,
    pub value: TupletValue<'a>,
}

impl<'a> Tuplet<'a> {
    /// Byte array tuplet
    pub const fn bytes(key: u32, data: &'a [u8]) -> Self {
        Self {
            key,
            value: TupletValue::Bytes(data),
        }
    }

    /// C-string tuplet
    pub const fn cstring(key: u32, s: &'a str) -> Self {
        Self {
            key,
            value: TupletValue::CString(s),
        }
    }

    /// Integer tuplet; width and signedness come from `T`
    pub fn integer<T: TupletInteger>(key: u32, value: T) -> Self {
        Self {
            key,
            value: TupletValue::Integer {
                bytes: value.to_le_word(),
                width: T::WIDTH,
                signed: T::SIGNED,
            },
        }
    }

    /// Wire type this tuplet serializes to
    pub fn tuple_type(&self) -> TupleType {
        match self.value {
            TupletValue::Bytes(_) => TupleType::ByteArray,
            TupletValue::CString(_) => TupleType::CString,
            TupletValue::Integer { signed: false, .. } => TupleType::UInt,
            TupletValue::Integer { signed: true, .. } => TupleType::Int,
        }
    }

    /// Serialized value length in bytes
    ///
    /// C-strings count their terminator.
    pub fn length(&self) -> usize {
        match self.value {
            TupletValue::Bytes(data) => data.len(),
            TupletValue::CString(s) => c_str_bytes(s).len() + 1,
            TupletValue::Integer { width, .. } => width as usize,
        }
    }
}

/// String bytes up to (not including) the first NUL
pub(crate) fn c_str_bytes(s: &str) -> &[u8] {
    let bytes = s.as_bytes();
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}
