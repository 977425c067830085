//! Dictionary reader
//!
//! [`DictReader`] walks a dictionary buffer in insertion order and hands out
//! [`Tuple`] views that borrow the buffer. Bounds are checked before every
//! read: a header that promises more than the buffer holds ends iteration
//! instead of reading past the end.

use crate::error::DictError;
use crate::tuple::{Tuple, DICT_HEADER_SIZE, TUPLE_HEADER_SIZE};

/// Read cursor over a dictionary buffer
#[derive(Debug, Clone)]
pub struct DictReader<'a> {
    buf: &'a [u8],
    count: u8,
    index: u8,
    cursor: usize,
    corrupt: bool,
}

impl<'a> DictReader<'a> {
    /// Create a reader positioned before the first tuple
    ///
    /// Fails with `InvalidArgs` for an empty buffer, and with
    /// `InternalInconsistency` if the declared tuple count cannot possibly
    /// fit in `buf`.
    pub fn new(buf: &'a [u8]) -> Result<Self, DictError> {
        let count = *buf.first().ok_or(DictError::InvalidArgs)?;
        let min_size = DICT_HEADER_SIZE + TUPLE_HEADER_SIZE * count as usize;
        if min_size > buf.len() {
            return Err(DictError::InternalInconsistency);
        }
        Ok(Self {
            buf,
            count,
            index: 0,
            cursor: DICT_HEADER_SIZE,
            corrupt: false,
        })
    }

    /// Number of tuples declared in the header
    pub fn len(&self) -> usize {
        self.count as usize
    }

    /// Returns true if the header declares no tuples
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Offset of the next tuple to be read
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Returns true once a malformed tuple has stopped iteration
    pub fn is_corrupt(&self) -> bool {
        self.corrupt
    }

    /// Rewind to the first tuple and return it
    pub fn first(&mut self) -> Option<Tuple<'a>> {
        self.rewind();
        self.next()
    }

    /// First tuple with the given key, searching from the start
    ///
    /// Linear scan; the cursor of `self` is not moved.
    pub fn find(&self, key: u32) -> Option<Tuple<'a>> {
        let mut scan = self.clone();
        scan.rewind();
        Iterator::find(&mut scan, |tuple| tuple.key == key)
    }

    fn rewind(&mut self) {
        self.index = 0;
        self.cursor = DICT_HEADER_SIZE;
        self.corrupt = false;
    }
}

impl<'a> Iterator for DictReader<'a> {
    type Item = Tuple<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.corrupt || self.index >= self.count {
            return None;
        }
        match Tuple::parse(self.buf, self.cursor) {
            Some(tuple) => {
                self.cursor += tuple.encoded_len();
                self.index += 1;
                Some(tuple)
            }
            None => {
                self.corrupt = true;
                None
            }
        }
    }
}

/// Open `buf` and return a reader along with its first tuple
///
/// Returns `None` if the buffer is empty, malformed, or holds no tuples.
pub fn read_begin_from_buffer(buf: &[u8]) -> Option<(DictReader<'_>, Tuple<'_>)> {
    let mut reader = DictReader::new(buf).ok()?;
    let first = reader.next()?;
    Some((reader, first))
}

/// Check every tuple of `buf` and return the dictionary's logical size
///
/// Trailing bytes after the last tuple are allowed and not counted.
pub fn validate(buf: &[u8]) -> Result<usize, DictError> {
    let mut reader = DictReader::new(buf)?;
    let parsed = reader.by_ref().count();
    if reader.is_corrupt() || parsed != reader.len() {
        return Err(DictError::InternalInconsistency);
    }
    Ok(reader.position())
}
