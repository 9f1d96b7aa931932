//! Errors returned by the decoding primitives and field iterators

use crate::value::FieldType;
use core::fmt;

/// An error while decoding protobuf wire data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The buffer ended before the current decode operation could finish
    UnexpectedEndOfBuffer,
    /// A varint ran past the 10 byte maximum without a terminating byte
    VarintOverflow,
    /// A tag carried a wire type outside the valid 0..=5 range
    BadWireType(u8),
    /// A length prefix placed the end of the data out of bounds
    BadLength(u64),
    /// A decoded field number does not fit in an `i32`
    TagOutOfRange(u64),
    /// A group wire type reached an iterator that does not support groups
    UnsupportedGroup,
    /// A field type with no wire type mapping was passed to packed iteration
    UnknownFieldType(FieldType),
    /// A byte payload read as a string was not valid UTF-8
    Utf8(core::str::Utf8Error),
}

/// A crate-wide `Result` alias
pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnexpectedEndOfBuffer => write!(f, "unexpected end of buffer"),
            Error::VarintOverflow => write!(f, "cannot decode varint: more than 10 bytes"),
            Error::BadWireType(t) => write!(f, "invalid wire type: {}", t),
            Error::BadLength(l) => write!(f, "length prefix out of bounds: {}", l),
            Error::TagOutOfRange(t) => write!(f, "field number out of range: {}", t),
            Error::UnsupportedGroup => write!(f, "groups are not supported here"),
            Error::UnknownFieldType(t) => write!(f, "field type {:?} has no wire type", t),
            Error::Utf8(e) => write!(f, "invalid utf-8: {}", e),
        }
    }
}

impl From<core::str::Utf8Error> for Error {
    fn from(e: core::str::Utf8Error) -> Error {
        Error::Utf8(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Utf8(e) => Some(e),
            _ => None,
        }
    }
}
