//! Integer conversions used by the decoder.
//!
//! The capture file's own headers are written in the host order of the capturing tool
//! (little-endian here) while the frames carry network (big-endian) order. The two families are
//! kept apart on purpose and every function returns `None` when the field doesn't fit in `data`.

use byteorder_slice::{BigEndian, ByteOrder, LittleEndian};


/// Reads a little-endian two's-complement 32-bit integer at `offset`.
pub fn read_le32_signed(data: &[u8], offset: usize) -> Option<i32> {
    data.get(offset..offset.checked_add(4)?).map(LittleEndian::read_i32)
}

/// Reads a little-endian unsigned 32-bit integer at `offset`.
pub fn read_le32(data: &[u8], offset: usize) -> Option<u32> {
    data.get(offset..offset.checked_add(4)?).map(LittleEndian::read_u32)
}

/// Reads a little-endian unsigned 16-bit integer at `offset`.
pub fn read_le16(data: &[u8], offset: usize) -> Option<u16> {
    data.get(offset..offset.checked_add(2)?).map(LittleEndian::read_u16)
}

/// Reads a big-endian unsigned 16-bit integer at `offset`.
pub fn read_be16(data: &[u8], offset: usize) -> Option<u16> {
    data.get(offset..offset.checked_add(2)?).map(BigEndian::read_u16)
}

/// Reads a big-endian unsigned 32-bit integer at `offset`.
///
/// Accumulates byte by byte (shift left, or the next unsigned byte) so the leading byte is never
/// sign-extended.
pub fn read_be32_unsigned(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(bytes.iter().fold(0_u32, |acc, &b| (acc << 8) | u32::from(b)))
}
