//! Batch serialization of tuplet arrays
//!
//! The required size is computed and every tuplet checked before the first
//! byte is written, so a failed call never leaves a half-written dictionary.

use heapless::Vec;

use crate::error::DictError;
use crate::size::calc_buffer_size_for_tuplets;
use crate::tuple::{MAX_TUPLES, MAX_VALUE_LEN};
use crate::tuplet::{Tuplet, TupletValue};
use crate::writer::DictWriter;

/// Serialize `tuplets` into `buf`, in array order
///
/// Returns the number of bytes written.
pub fn serialize_tuplets_to_buffer(
    tuplets: &[Tuplet<'_>],
    buf: &mut [u8],
) -> Result<usize, DictError> {
    let needed = required_size(tuplets)?;
    if needed > buf.len() {
        return Err(DictError::NotEnoughStorage);
    }

    let mut writer = DictWriter::begin(buf)?;
    for tuplet in tuplets {
        writer.write_tuplet(tuplet)?;
    }
    Ok(writer.end())
}

/// Serialize `tuplets` into an internal stack buffer of `N` bytes and pass
/// the finished dictionary to `f`
///
/// Fails with `OutOfMemory` if the dictionary needs more than `N` bytes.
pub fn serialize_tuplets<const N: usize, R>(
    tuplets: &[Tuplet<'_>],
    f: impl FnOnce(&[u8]) -> R,
) -> Result<R, DictError> {
    if required_size(tuplets)? > N {
        return Err(DictError::OutOfMemory);
    }
    let mut scratch = [0u8; N];
    let len = serialize_tuplets_to_buffer(tuplets, &mut scratch)?;
    Ok(f(&scratch[..len]))
}

/// Serialize `tuplets` into a fixed-capacity vector
pub fn serialize_tuplets_to_vec<const N: usize>(
    tuplets: &[Tuplet<'_>],
) -> Result<Vec<u8, N>, DictError> {
    let needed = required_size(tuplets)?;
    let mut out = Vec::new();
    out.resize(needed, 0)
        .map_err(|_| DictError::NotEnoughStorage)?;
    let len = serialize_tuplets_to_buffer(tuplets, &mut out)?;
    out.truncate(len);
    Ok(out)
}

fn required_size(tuplets: &[Tuplet<'_>]) -> Result<usize, DictError> {
    for tuplet in tuplets {
        if let TupletValue::Integer { width, .. } = tuplet.value {
            if !matches!(width, 1 | 2 | 4) {
                return Err(DictError::InvalidArgs);
            }
        }
        if tuplet.length() > MAX_VALUE_LEN {
            return Err(DictError::InvalidArgs);
        }
    }
    if tuplets.len() > MAX_TUPLES {
        return Err(DictError::NotEnoughStorage);
    }
    Ok(calc_buffer_size_for_tuplets(tuplets))
}
