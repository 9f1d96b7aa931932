//! A bounds-checked cursor over protobuf wire data
//!
//! Everything in here decodes one physical encoding at a time and advances
//! the cursor by exactly the bytes consumed. Nothing allocates except the
//! explicit `*_owned` variants.

use crate::errors::{Error, Result};
use byteorder_lite::ByteOrder;
use byteorder_lite::LE;
use core::convert::TryFrom;

/// Longest legal varint encoding of a 64 bit value
const MAX_VARINT_LEN: usize = 10;

/// The physical encoding of a field, taken from the low 3 bits of its tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WireType {
    /// Variable-length integer
    Varint = 0,
    /// 8 byte little-endian value
    Fixed64 = 1,
    /// Length-prefixed byte run
    Bytes = 2,
    /// Start of a deprecated group construct
    StartGroup = 3,
    /// End of a deprecated group construct
    EndGroup = 4,
    /// 4 byte little-endian value
    Fixed32 = 5,
}

impl TryFrom<u8> for WireType {
    type Error = Error;

    fn try_from(v: u8) -> Result<WireType> {
        match v {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::Bytes),
            3 => Ok(WireType::StartGroup),
            4 => Ok(WireType::EndGroup),
            5 => Ok(WireType::Fixed32),
            t => Err(Error::BadWireType(t)),
        }
    }
}

/// A cursor over a borrowed byte buffer holding a protobuf-encoded message
///
/// The cursor never copies or mutates the underlying bytes; decoding only
/// moves its position forward. Build one per buffer you want to walk:
///
/// ```rust
/// use wiresift::Cursor;
///
/// let bytes = [0x08, 0x96, 0x01]; // field 1, varint 150
/// let mut cursor = Cursor::new(&bytes);
/// let (field_num, _wire_type) = cursor.decode_tag_and_wire_type().unwrap();
/// assert_eq!(field_num, 1);
/// assert_eq!(cursor.decode_varint().unwrap(), 150);
/// assert!(cursor.is_eof());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor positioned at the start of `buf`
    pub fn new(buf: &'a [u8]) -> Cursor<'a> {
        Cursor { buf, pos: 0 }
    }

    /// Current position, in bytes from the start of the buffer
    #[cfg_attr(feature = "std", inline(always))]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes not yet consumed
    #[cfg_attr(feature = "std", inline(always))]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// True once every byte has been consumed
    #[cfg_attr(feature = "std", inline(always))]
    pub fn is_eof(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// Decodes a varint encoded u64
    ///
    /// The position is only advanced on success; a failed decode leaves the
    /// cursor where it was.
    #[cfg_attr(feature = "std", inline(always))]
    pub fn decode_varint(&mut self) -> Result<u64> {
        let mut x = 0u64;
        let mut i = self.pos;
        for shift in (0..64).step_by(7) {
            let b = *self.buf.get(i).ok_or(Error::UnexpectedEndOfBuffer)?;
            i += 1;
            x |= u64::from(b & 0x7f) << shift;
            if b < 0x80 {
                self.pos = i;
                return Ok(x);
            }
        }
        // continuation bit still set after 10 bytes
        Err(Error::VarintOverflow)
    }

    /// Decodes a field tag: one varint split into `(field_number, wire_type)`
    ///
    /// The low 3 bits are the wire type, the rest is the field number, which
    /// must fit in an `i32`.
    #[cfg_attr(feature = "std", inline(always))]
    pub fn decode_tag_and_wire_type(&mut self) -> Result<(i32, WireType)> {
        let v = self.decode_varint()?;
        let wire_type = WireType::try_from((v & 7) as u8)?;
        let field_num = v >> 3;
        if field_num > i32::MAX as u64 {
            return Err(Error::TagOutOfRange(field_num));
        }
        Ok((field_num as i32, wire_type))
    }

    /// Decodes a fixed32 (little-endian u32)
    #[cfg_attr(feature = "std", inline)]
    pub fn decode_fixed32(&mut self) -> Result<u32> {
        self.decode_fixed(4, LE::read_u32)
    }

    /// Decodes a fixed64 (little-endian u64)
    #[cfg_attr(feature = "std", inline)]
    pub fn decode_fixed64(&mut self) -> Result<u64> {
        self.decode_fixed(8, LE::read_u64)
    }

    #[cfg_attr(feature = "std", inline)]
    fn decode_fixed<M, F: Fn(&[u8]) -> M>(&mut self, len: usize, read: F) -> Result<M> {
        let v = read(
            self.buf
                .get(self.pos..self.pos + len)
                .ok_or(Error::UnexpectedEndOfBuffer)?,
        );
        self.pos += len;
        Ok(v)
    }

    /// Decodes a length-prefixed byte run as a view into the buffer
    ///
    /// The view borrows the cursor's underlying storage, so it stays valid
    /// for as long as the buffer does and costs nothing to produce. Use
    /// [`decode_raw_bytes_owned`](Cursor::decode_raw_bytes_owned) when the
    /// bytes must outlive the buffer.
    #[cfg_attr(feature = "std", inline)]
    pub fn decode_raw_bytes(&mut self) -> Result<&'a [u8]> {
        let (start, end) = self.decode_len_prefix()?;
        self.pos = end;
        Ok(&self.buf[start..end])
    }

    /// Decodes a length-prefixed byte run into a fresh `Vec`
    #[cfg(feature = "std")]
    #[cfg_attr(feature = "std", inline)]
    pub fn decode_raw_bytes_owned(&mut self) -> Result<Vec<u8>> {
        self.decode_raw_bytes().map(|b| b.to_vec())
    }

    /// Reads the length prefix at the current position and bounds-checks the
    /// byte range it announces, returning `(start, end)` of that range
    fn decode_len_prefix(&mut self) -> Result<(usize, usize)> {
        let n = self.decode_varint()?;
        let len = usize::try_from(n).map_err(|_| Error::BadLength(n))?;
        let end = self.pos.checked_add(len).ok_or(Error::BadLength(n))?;
        if end > self.buf.len() {
            return Err(Error::BadLength(n));
        }
        Ok((self.pos, end))
    }

    /// Advances the position by exactly `n` bytes
    #[cfg_attr(feature = "std", inline(always))]
    pub fn skip(&mut self, n: usize) -> Result<()> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or(Error::UnexpectedEndOfBuffer)?;
        self.pos = end;
        Ok(())
    }

    /// Skips a group, leaving the cursor right after its "end group" tag
    ///
    /// Must be called with the cursor positioned just past the group's
    /// "start group" tag. Nested groups are skipped along the way.
    pub fn skip_group(&mut self) -> Result<()> {
        let (group_end, _) = self.find_group_end()?;
        self.pos = group_end;
        Ok(())
    }

    /// Reads a group's field data as a view into the buffer
    ///
    /// Must be called with the cursor positioned just past the group's
    /// "start group" tag. Returns the bytes up to (not including) the
    /// matching "end group" tag and leaves the cursor right after that tag.
    /// Nested groups are included in the returned data.
    pub fn read_group(&mut self) -> Result<&'a [u8]> {
        let (group_end, data_end) = self.find_group_end()?;
        let data = &self.buf[self.pos..data_end];
        self.pos = group_end;
        Ok(data)
    }

    /// Reads a group's field data into a fresh `Vec`
    #[cfg(feature = "std")]
    pub fn read_group_owned(&mut self) -> Result<Vec<u8>> {
        self.read_group().map(|b| b.to_vec())
    }

    /// Scans for the "end group" tag matching the current position without
    /// moving the cursor, returning the offset just past that tag and the
    /// offset where the tag's own bytes begin
    fn find_group_end(&self) -> Result<(usize, usize)> {
        let mut probe = self.clone();
        loop {
            let field_start = probe.pos;
            let (_, wire_type) = probe.decode_tag_and_wire_type()?;
            match wire_type {
                WireType::Fixed32 => probe.skip(4)?,
                WireType::Fixed64 => probe.skip(8)?,
                WireType::Varint => {
                    // skip to the terminating byte (high bit unset), without
                    // decoding the value
                    let limit = probe.pos + MAX_VARINT_LEN;
                    loop {
                        if probe.pos >= limit {
                            return Err(Error::VarintOverflow);
                        }
                        let b = *probe
                            .buf
                            .get(probe.pos)
                            .ok_or(Error::UnexpectedEndOfBuffer)?;
                        probe.pos += 1;
                        if b < 0x80 {
                            break;
                        }
                    }
                }
                WireType::Bytes => {
                    let (_, end) = probe.decode_len_prefix()?;
                    probe.pos = end;
                }
                WireType::StartGroup => probe.skip_group()?,
                WireType::EndGroup => return Ok((probe.pos, field_start)),
            }
        }
    }
}

/// Decodes a signed 32 bit integer from its zig-zag wire representation
#[cfg_attr(feature = "std", inline(always))]
pub fn decode_zigzag32(v: u64) -> i32 {
    let n = v as u32;
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

/// Decodes a signed 64 bit integer from its zig-zag wire representation
#[cfg_attr(feature = "std", inline(always))]
pub fn decode_zigzag64(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    fn encode_varint(mut v: u64, out: &mut Vec<u8>) {
        while v > 0x7f {
            out.push((v as u8 & 0x7f) | 0x80);
            v >>= 7;
        }
        out.push(v as u8);
    }

    fn encode_tag(field_num: u32, wire_type: WireType, out: &mut Vec<u8>) {
        encode_varint(u64::from(field_num) << 3 | wire_type as u64, out);
    }

    fn encode_zigzag64(v: i64) -> u64 {
        ((v << 1) ^ (v >> 63)) as u64
    }

    fn encode_zigzag32(v: i32) -> u64 {
        u64::from(((v << 1) ^ (v >> 31)) as u32)
    }

    #[test]
    fn varint_small_values() {
        for v in [0u64, 1, 127] {
            let buf = [v as u8];
            let mut cursor = Cursor::new(&buf);
            assert_eq!(cursor.decode_varint().unwrap(), v);
            assert!(cursor.is_eof());
        }
    }

    #[test]
    fn varint_multi_byte() {
        let mut cursor = Cursor::new(&[0x96, 0x01]);
        assert_eq!(cursor.decode_varint().unwrap(), 150);
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn varint_max_u64() {
        let mut buf = Vec::new();
        encode_varint(u64::MAX, &mut buf);
        assert_eq!(buf.len(), 10);
        let mut cursor = Cursor::new(&buf);
        assert_eq!(cursor.decode_varint().unwrap(), u64::MAX);
        assert!(cursor.is_eof());
    }

    #[test]
    fn varint_overflow_past_ten_bytes() {
        let buf = [0x80u8; 11];
        let mut cursor = Cursor::new(&buf);
        assert_eq!(cursor.decode_varint(), Err(Error::VarintOverflow));
    }

    #[test]
    fn varint_truncated() {
        let mut cursor = Cursor::new(&[0x80, 0x80]);
        assert_eq!(cursor.decode_varint(), Err(Error::UnexpectedEndOfBuffer));
        // failed decode leaves the cursor in place
        assert_eq!(cursor.position(), 0);
    }

    quickcheck! {
        fn varint_roundtrip(v: u64) -> bool {
            let mut buf = Vec::new();
            encode_varint(v, &mut buf);
            let mut cursor = Cursor::new(&buf);
            cursor.decode_varint() == Ok(v) && cursor.position() == buf.len()
        }

        fn tag_roundtrip(field_num: u32, wire_type: u8) -> bool {
            let field_num = (field_num % i32::MAX as u32).max(1);
            let wire_type = WireType::try_from(wire_type % 6).unwrap();
            let mut buf = Vec::new();
            encode_tag(field_num, wire_type, &mut buf);
            let mut cursor = Cursor::new(&buf);
            cursor.decode_tag_and_wire_type() == Ok((field_num as i32, wire_type))
        }

        fn zigzag32_roundtrip(v: i32) -> bool {
            decode_zigzag32(encode_zigzag32(v)) == v
        }

        fn zigzag64_roundtrip(v: i64) -> bool {
            decode_zigzag64(encode_zigzag64(v)) == v
        }
    }

    #[test]
    fn tag_field_number_out_of_range() {
        let mut buf = Vec::new();
        encode_varint((i32::MAX as u64 + 1) << 3, &mut buf);
        let mut cursor = Cursor::new(&buf);
        assert_eq!(
            cursor.decode_tag_and_wire_type(),
            Err(Error::TagOutOfRange(i32::MAX as u64 + 1))
        );
    }

    #[test]
    fn tag_invalid_wire_type_bits() {
        let mut buf = Vec::new();
        encode_varint(1 << 3 | 6, &mut buf);
        let mut cursor = Cursor::new(&buf);
        assert_eq!(cursor.decode_tag_and_wire_type(), Err(Error::BadWireType(6)));
    }

    #[test]
    fn fixed32_little_endian() {
        let mut cursor = Cursor::new(&[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(cursor.decode_fixed32().unwrap(), 0x0403_0201);
        assert!(cursor.is_eof());
    }

    #[test]
    fn fixed32_boundary_values() {
        let mut cursor = Cursor::new(&[0; 4]);
        assert_eq!(cursor.decode_fixed32().unwrap(), 0);
        let mut cursor = Cursor::new(&[0xff; 4]);
        assert_eq!(cursor.decode_fixed32().unwrap(), u32::MAX);
    }

    #[test]
    fn fixed64_boundary_values() {
        let mut cursor = Cursor::new(&[0; 8]);
        assert_eq!(cursor.decode_fixed64().unwrap(), 0);
        let mut cursor = Cursor::new(&[0xff; 8]);
        assert_eq!(cursor.decode_fixed64().unwrap(), u64::MAX);
    }

    #[test]
    fn fixed_truncated() {
        let mut cursor = Cursor::new(&[0x01, 0x02, 0x03]);
        assert_eq!(cursor.decode_fixed32(), Err(Error::UnexpectedEndOfBuffer));
        let mut cursor = Cursor::new(&[0x01; 7]);
        assert_eq!(cursor.decode_fixed64(), Err(Error::UnexpectedEndOfBuffer));
    }

    #[test]
    fn raw_bytes_zero_copy_view() {
        let buf = [0x03, b'a', b'b', b'c', 0xff];
        let mut cursor = Cursor::new(&buf);
        let bytes = cursor.decode_raw_bytes().unwrap();
        assert_eq!(bytes, b"abc");
        // the view aliases the source buffer, no copy was made
        assert!(core::ptr::eq(bytes.as_ptr(), buf[1..].as_ptr()));
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn raw_bytes_owned_copy() {
        let buf = [0x02, 0x0a, 0x0b];
        let mut cursor = Cursor::new(&buf);
        let bytes = cursor.decode_raw_bytes_owned().unwrap();
        assert_eq!(bytes, vec![0x0a, 0x0b]);
        assert!(!core::ptr::eq(bytes.as_ptr(), buf[1..].as_ptr()));
    }

    #[test]
    fn raw_bytes_zero_length() {
        let mut cursor = Cursor::new(&[0x00]);
        assert_eq!(cursor.decode_raw_bytes().unwrap(), &[] as &[u8]);
        assert!(cursor.is_eof());
    }

    #[test]
    fn raw_bytes_length_out_of_bounds() {
        let mut cursor = Cursor::new(&[0x05, 0x01, 0x02]);
        assert_eq!(cursor.decode_raw_bytes(), Err(Error::BadLength(5)));
    }

    #[test]
    fn raw_bytes_truncated_length_prefix() {
        let mut cursor = Cursor::new(&[0x80]);
        assert_eq!(cursor.decode_raw_bytes(), Err(Error::UnexpectedEndOfBuffer));
    }

    #[test]
    fn skip_in_and_out_of_bounds() {
        let mut cursor = Cursor::new(&[0; 4]);
        cursor.skip(3).unwrap();
        assert_eq!(cursor.position(), 3);
        assert_eq!(cursor.skip(2), Err(Error::UnexpectedEndOfBuffer));
        assert_eq!(cursor.position(), 3);
        cursor.skip(1).unwrap();
        assert!(cursor.is_eof());
    }

    #[test]
    fn zigzag_known_values() {
        assert_eq!(decode_zigzag32(0), 0);
        assert_eq!(decode_zigzag32(1), -1);
        assert_eq!(decode_zigzag32(2), 1);
        assert_eq!(decode_zigzag32(3), -2);
        assert_eq!(decode_zigzag32(u64::from(u32::MAX)), i32::MIN);
        assert_eq!(decode_zigzag64(u64::MAX), i64::MIN);
    }

    #[test]
    fn skip_group_flat() {
        // group holding a varint field and a bytes field
        let mut buf = Vec::new();
        encode_tag(2, WireType::Varint, &mut buf);
        encode_varint(300, &mut buf);
        encode_tag(3, WireType::Bytes, &mut buf);
        encode_varint(2, &mut buf);
        buf.extend_from_slice(b"hi");
        encode_tag(1, WireType::EndGroup, &mut buf);
        buf.push(0xaa); // trailing byte after the group

        let mut cursor = Cursor::new(&buf);
        cursor.skip_group().unwrap();
        assert_eq!(cursor.len(), 1);
    }

    #[test]
    fn skip_group_nested() {
        let mut buf = Vec::new();
        encode_tag(1, WireType::StartGroup, &mut buf);
        encode_tag(2, WireType::StartGroup, &mut buf);
        encode_tag(2, WireType::EndGroup, &mut buf);
        encode_tag(1, WireType::EndGroup, &mut buf);

        let mut cursor = Cursor::new(&buf);
        // position just past the outer start tag
        let (_, wire_type) = cursor.decode_tag_and_wire_type().unwrap();
        assert_eq!(wire_type, WireType::StartGroup);
        cursor.skip_group().unwrap();
        assert!(cursor.is_eof());
    }

    #[test]
    fn read_group_inner_pair() {
        let mut buf = Vec::new();
        encode_tag(2, WireType::StartGroup, &mut buf);
        encode_tag(2, WireType::EndGroup, &mut buf);

        let mut cursor = Cursor::new(&buf);
        cursor.decode_tag_and_wire_type().unwrap();
        // nothing between the start and end tags
        assert_eq!(cursor.read_group().unwrap(), &[] as &[u8]);
        assert!(cursor.is_eof());
    }

    #[test]
    fn read_group_excludes_end_tag() {
        let mut buf = Vec::new();
        encode_tag(2, WireType::Fixed32, &mut buf);
        buf.extend_from_slice(&[1, 2, 3, 4]);
        let data_len = buf.len();
        encode_tag(1, WireType::EndGroup, &mut buf);

        let mut cursor = Cursor::new(&buf);
        let data = cursor.read_group().unwrap();
        assert_eq!(data, &buf[..data_len]);
        assert!(cursor.is_eof());
    }

    #[test]
    fn read_group_includes_nested_group() {
        let mut buf = Vec::new();
        encode_tag(5, WireType::StartGroup, &mut buf);
        encode_tag(6, WireType::Varint, &mut buf);
        encode_varint(7, &mut buf);
        encode_tag(5, WireType::EndGroup, &mut buf);
        let data_len = buf.len();
        encode_tag(4, WireType::EndGroup, &mut buf);

        let mut cursor = Cursor::new(&buf);
        let data = cursor.read_group().unwrap();
        assert_eq!(data, &buf[..data_len]);
    }

    #[test]
    fn group_unterminated() {
        let mut buf = Vec::new();
        encode_tag(2, WireType::Varint, &mut buf);
        encode_varint(1, &mut buf);

        let mut cursor = Cursor::new(&buf);
        assert_eq!(cursor.skip_group(), Err(Error::UnexpectedEndOfBuffer));
        // the probe never commits on failure
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn group_varint_field_overflow() {
        let mut buf = Vec::new();
        encode_tag(2, WireType::Varint, &mut buf);
        buf.extend_from_slice(&[0x80; 11]);
        encode_tag(1, WireType::EndGroup, &mut buf);

        let mut cursor = Cursor::new(&buf);
        assert_eq!(cursor.skip_group(), Err(Error::VarintOverflow));
    }

    #[test]
    fn group_bad_wire_type() {
        let mut buf = Vec::new();
        encode_varint(2 << 3 | 7, &mut buf);

        let mut cursor = Cursor::new(&buf);
        assert_eq!(cursor.skip_group(), Err(Error::BadWireType(7)));
    }
}
