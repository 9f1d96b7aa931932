//! The reusable `Value` handed to iteration callbacks, and the logical
//! field types that drive packed repeated decoding

use crate::codec::{decode_zigzag32, decode_zigzag64, WireType};
use crate::errors::Result;

/// The logical protobuf scalar kinds, in descriptor order
///
/// A field type carries no decode logic of its own, only the many-to-one
/// mapping onto the physical [`WireType`] used by
/// [`packed_repeated_each`](crate::iter::packed_repeated_each).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// 64 bit IEEE float, fixed64 on the wire
    Double,
    /// 32 bit IEEE float, fixed32 on the wire
    Float,
    /// Signed 64 bit integer, varint on the wire
    Int64,
    /// Unsigned 64 bit integer, varint on the wire
    UInt64,
    /// Signed 32 bit integer, varint on the wire
    Int32,
    /// Unsigned 64 bit integer, fixed64 on the wire
    Fixed64,
    /// Unsigned 32 bit integer, fixed32 on the wire
    Fixed32,
    /// Boolean, varint on the wire
    Bool,
    /// UTF-8 text, length-prefixed on the wire
    String,
    /// Deprecated group construct; has no single element encoding
    Group,
    /// Embedded message, length-prefixed on the wire
    Message,
    /// Raw bytes, length-prefixed on the wire
    Bytes,
    /// Unsigned 32 bit integer, varint on the wire
    UInt32,
    /// Enum value, varint on the wire
    Enum,
    /// Signed 32 bit integer, fixed32 on the wire
    SFixed32,
    /// Signed 64 bit integer, fixed64 on the wire
    SFixed64,
    /// Zig-zag signed 32 bit integer, varint on the wire
    SInt32,
    /// Zig-zag signed 64 bit integer, varint on the wire
    SInt64,
}

impl FieldType {
    /// The wire type every element of this field type is encoded with, or
    /// `None` for [`FieldType::Group`], which has no element encoding
    pub fn wire_type(self) -> Option<WireType> {
        match self {
            FieldType::Int32
            | FieldType::Int64
            | FieldType::UInt32
            | FieldType::UInt64
            | FieldType::SInt32
            | FieldType::SInt64
            | FieldType::Bool
            | FieldType::Enum => Some(WireType::Varint),
            FieldType::Fixed64 | FieldType::SFixed64 | FieldType::Double => {
                Some(WireType::Fixed64)
            }
            FieldType::Fixed32 | FieldType::SFixed32 | FieldType::Float => {
                Some(WireType::Fixed32)
            }
            FieldType::String | FieldType::Message | FieldType::Bytes => Some(WireType::Bytes),
            FieldType::Group => None,
        }
    }
}

/// One decoded field, reused across every step of an iteration call
///
/// Exactly one payload is meaningful per decode, selected by the wire type:
/// the raw numeric payload for varint and fixed-width fields, the byte
/// payload for length-prefixed fields. The byte payload is a zero-copy view
/// into the cursor's buffer.
///
/// The numeric payload is stored exactly as it appeared on the wire; the
/// `as_*` accessors reinterpret it for the logical field type the caller
/// knows the field to have.
#[derive(Debug, Clone, PartialEq)]
pub struct Value<'a> {
    pub(crate) wire_type: WireType,
    pub(crate) number: u64,
    pub(crate) bytes: &'a [u8],
}

impl<'a> Value<'a> {
    pub(crate) fn new() -> Value<'a> {
        Value {
            wire_type: WireType::Varint,
            number: 0,
            bytes: &[],
        }
    }

    /// The physical encoding this value was decoded from
    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    /// The raw numeric payload, exactly as it appeared on the wire
    pub fn number(&self) -> u64 {
        self.number
    }

    /// The byte payload, as a view aliasing the cursor's buffer
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The numeric payload as an `int32`
    pub fn as_int32(&self) -> i32 {
        self.number as i32
    }

    /// The numeric payload as an `int64`
    pub fn as_int64(&self) -> i64 {
        self.number as i64
    }

    /// The numeric payload as a `uint32`
    pub fn as_uint32(&self) -> u32 {
        self.number as u32
    }

    /// The numeric payload as a `uint64`
    pub fn as_uint64(&self) -> u64 {
        self.number
    }

    /// The numeric payload as a zig-zag decoded `sint32`
    pub fn as_sint32(&self) -> i32 {
        decode_zigzag32(self.number)
    }

    /// The numeric payload as a zig-zag decoded `sint64`
    pub fn as_sint64(&self) -> i64 {
        decode_zigzag64(self.number)
    }

    /// The numeric payload as a `fixed32`
    pub fn as_fixed32(&self) -> u32 {
        self.number as u32
    }

    /// The numeric payload as a `fixed64`
    pub fn as_fixed64(&self) -> u64 {
        self.number
    }

    /// The numeric payload as an `sfixed32`
    pub fn as_sfixed32(&self) -> i32 {
        self.number as i32
    }

    /// The numeric payload as an `sfixed64`
    pub fn as_sfixed64(&self) -> i64 {
        self.number as i64
    }

    /// The numeric payload as a `float`
    pub fn as_float(&self) -> f32 {
        f32::from_bits(self.number as u32)
    }

    /// The numeric payload as a `double`
    pub fn as_double(&self) -> f64 {
        f64::from_bits(self.number)
    }

    /// The numeric payload as a `bool`
    pub fn as_bool(&self) -> bool {
        self.number != 0
    }

    /// The byte payload as UTF-8 text
    pub fn as_str(&self) -> Result<&'a str> {
        core::str::from_utf8(self.bytes).map_err(|e| e.into())
    }
}
