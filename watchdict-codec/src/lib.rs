//! Watch Dictionary Codec
//!
//! This crate implements the key/value dictionary format used as the wire
//! encoding for messages between the watch and the phone. A dictionary is
//! a compact, self-describing byte buffer that can be written incrementally,
//! iterated without copying, searched by key, and merged into another
//! dictionary.
//!
//! # Wire Format
//!
//! All multi-byte integers are little-endian:
//! ```text
//! ┌───────┬─────────────────────────────────────────────┐
//! │ COUNT │ TUPLE × COUNT                               │
//! │ 1B    │                                             │
//! └───────┴─────────────────────────────────────────────┘
//!
//! ┌────────┬──────┬────────┬─────────────────┐
//! │ KEY    │ TYPE │ LENGTH │ VALUE           │
//! │ 4B     │ 1B   │ 2B     │ LENGTH bytes    │
//! └────────┴──────┴────────┴─────────────────┘
//! ```
//!
//! The codec never allocates. Buffers are owned by the caller; writers and
//! readers are cursors over them.

#![no_std]
#![deny(unsafe_code)]

pub mod crc;
pub mod error;
pub mod merge;
pub mod reader;
pub mod serialize;
pub mod size;
pub mod tuple;
pub mod tuplet;
pub mod writer;

pub use crc::{stm32_crc32, Crc32};
pub use error::DictError;
pub use merge::{merge, merge_on_stack};
pub use reader::{read_begin_from_buffer, validate, DictReader};
pub use serialize::{serialize_tuplets, serialize_tuplets_to_buffer, serialize_tuplets_to_vec};
pub use size::{calc_buffer_size, calc_buffer_size_for_tuplets};
pub use tuple::{
    Tuple, TupleType, Value, DICT_HEADER_SIZE, MAX_TUPLES, MAX_VALUE_LEN, TUPLE_HEADER_SIZE,
};
pub use tuplet::{Tuplet, TupletInteger, TupletValue};
pub use writer::DictWriter;
