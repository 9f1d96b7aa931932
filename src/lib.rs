//! A library to selectively extract fields from binary protobuf messages
//!
//! Instead of deserializing a whole payload into generated structs, wrap the
//! bytes in a [`Cursor`] and walk its fields with [`message_each`], pulling
//! out just the ones you care about. Decoding is bounds-checked, zero-copy
//! and allocation-free: one reusable [`Value`] is overwritten per field, and
//! byte payloads are views into the caller's buffer.
//!
//! ```rust
//! use wiresift::{message_each, Cursor};
//!
//! // field 1: varint 150, field 2: the string "abc"
//! let bytes = [0x08, 0x96, 0x01, 0x12, 0x03, b'a', b'b', b'c'];
//! let mut cursor = Cursor::new(&bytes);
//! message_each(&mut cursor, |field_num, value| {
//!     match field_num {
//!         1 => assert_eq!(value.number(), 150),
//!         2 => assert_eq!(value.as_str()?, "abc"),
//!         _ => {}
//!     }
//!     Ok(true)
//! })
//! .expect("cannot walk message");
//! ```
//!
//! Packed repeated fields are walked element by element with
//! [`packed_repeated_each`], and the deprecated group construct is handled
//! at the cursor level by [`Cursor::skip_group`] and [`Cursor::read_group`]
//! for callers that still have to deal with it.

#![deny(missing_docs)]
#![cfg_attr(not(feature = "std"), no_std)]

pub mod codec;
pub mod errors;
pub mod iter;
pub mod value;

pub use crate::{
    codec::{decode_zigzag32, decode_zigzag64, Cursor, WireType},
    errors::{Error, Result},
    iter::{message_each, packed_repeated_each},
    value::{FieldType, Value},
};
