//! Field iteration over a message or a packed repeated field
//!
//! Both entry points are single-pass and forward-only, drive the cursor's
//! primitive decoders, and reuse one [`Value`] across every callback
//! invocation, so walking a message allocates nothing.

use crate::codec::{Cursor, WireType};
use crate::errors::{Error, Result};
use crate::value::{FieldType, Value};

/// Calls `f` once per top-level field of the message held by `cursor`
///
/// The callback receives the field number and the decoded value. Returning
/// `Ok(true)` continues the walk, `Ok(false)` stops it cleanly, and any
/// error stops it and is propagated to the caller.
///
/// Group wire types are not supported at this level and fail with
/// [`Error::UnsupportedGroup`]. To descend into an embedded message, run
/// `message_each` again over a new cursor on the value's byte payload:
///
/// ```rust
/// use wiresift::{message_each, Cursor, WireType};
///
/// // field 1: varint 150, field 2: embedded message with one varint field
/// let bytes = [0x08, 0x96, 0x01, 0x12, 0x02, 0x08, 0x2a];
/// let mut cursor = Cursor::new(&bytes);
/// message_each(&mut cursor, |field_num, value| {
///     if field_num == 2 && value.wire_type() == WireType::Bytes {
///         let mut nested = Cursor::new(value.bytes());
///         message_each(&mut nested, |field_num, value| {
///             assert_eq!((field_num, value.number()), (1, 42));
///             Ok(true)
///         })?;
///     }
///     Ok(true)
/// })
/// .unwrap();
/// ```
pub fn message_each<'a, F>(cursor: &mut Cursor<'a>, mut f: F) -> Result<()>
where
    F: FnMut(i32, &Value<'a>) -> Result<bool>,
{
    let mut value = Value::new();
    while !cursor.is_eof() {
        let (field_num, wire_type) = cursor.decode_tag_and_wire_type()?;
        read_value(cursor, wire_type, &mut value)?;
        if !f(field_num, &value)? {
            return Ok(());
        }
    }
    Ok(())
}

/// Calls `f` once per element of a packed repeated field
///
/// `cursor` must hold just the field's payload, i.e. the byte run of one
/// length-delimited field already stripped of its tag and length prefix.
/// Packed elements carry no per-element tags, so `field_type` names the
/// element kind and fixes the wire type every element is decoded with;
/// a field type with no element encoding fails with
/// [`Error::UnknownFieldType`] before anything is decoded.
///
/// The callback contract is the same as for [`message_each`]: `Ok(false)`
/// stops the walk cleanly and errors are propagated.
pub fn packed_repeated_each<'a, F>(
    cursor: &mut Cursor<'a>,
    field_type: FieldType,
    mut f: F,
) -> Result<()>
where
    F: FnMut(&Value<'a>) -> Result<bool>,
{
    let wire_type = field_type
        .wire_type()
        .ok_or(Error::UnknownFieldType(field_type))?;

    let mut value = Value::new();
    while !cursor.is_eof() {
        read_value(cursor, wire_type, &mut value)?;
        if !f(&value)? {
            return Ok(());
        }
    }
    Ok(())
}

/// Decodes one value of the given wire type into `value`
fn read_value<'a>(cursor: &mut Cursor<'a>, wire_type: WireType, value: &mut Value<'a>) -> Result<()> {
    value.wire_type = wire_type;
    match wire_type {
        WireType::Varint => value.number = cursor.decode_varint()?,
        WireType::Fixed32 => value.number = u64::from(cursor.decode_fixed32()?),
        WireType::Fixed64 => value.number = cursor.decode_fixed64()?,
        WireType::Bytes => value.bytes = cursor.decode_raw_bytes()?,
        WireType::StartGroup | WireType::EndGroup => return Err(Error::UnsupportedGroup),
    }
    Ok(())
}
