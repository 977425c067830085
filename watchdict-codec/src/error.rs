//! Dictionary error types

use core::fmt;

/// Errors returned by dictionary operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DictError {
    /// Buffer capacity is insufficient for the requested write or merge
    NotEnoughStorage,
    /// Malformed call: empty buffer, bad integer width, oversized value
    InvalidArgs,
    /// Declared count or length disagrees with the buffer contents
    InternalInconsistency,
    /// Scratch space needed by the operation could not be provided
    OutOfMemory,
}

impl fmt::Display for DictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DictError::NotEnoughStorage => "not enough storage",
            DictError::InvalidArgs => "invalid arguments",
            DictError::InternalInconsistency => "internal inconsistency",
            DictError::OutOfMemory => "out of memory",
        };
        f.write_str(msg)
    }
}
