//! IPv4 header fields.

use std::net::Ipv4Addr;

use crate::errors::AddressError;
use crate::proto::link::OffsetTable;

/// IP protocol number for TCP.
pub const IP_PROTO_TCP: u8 = 6;

/// IP protocol number for UDP.
pub const IP_PROTO_UDP: u8 = 17;

/// Offset of the protocol byte inside the IPv4 header.
pub const IP_PROTO_OFFSET: usize = 9;

/// Length of an IPv4 header without options.
pub const IPV4_MIN_HEADER_LEN: usize = 20;

const SRC_ADDR_OFFSET: usize = 12;
const DST_ADDR_OFFSET: usize = 16;
const ADDR_LEN: usize = 4;


/// Header length encoded by a version/IHL byte: the low nibble counts 4 bytes words.
pub fn ihl_to_len(ver_ihl: u8) -> usize {
    usize::from(ver_ihl & 0x0F) * 4
}

/// Length of the IPv4 header of the frame, options included (20 to 60 bytes).
pub fn header_len(frame: &[u8], table: &OffsetTable) -> Option<usize> {
    frame.get(table.ver_ihl_offset).copied().map(ihl_to_len)
}

/// Builds an address from a slice of exactly 4 bytes.
pub fn address_from_slice(slice: &[u8]) -> Result<Ipv4Addr, AddressError> {
    let octets: [u8; ADDR_LEN] = slice
        .try_into()
        .map_err(|_| AddressError::InvalidLength { expected: ADDR_LEN, actual: slice.len() })?;

    Ok(Ipv4Addr::from(octets))
}

/// Source address of the IPv4 header.
pub fn src_addr(frame: &[u8], table: &OffsetTable) -> Result<Ipv4Addr, AddressError> {
    addr_at(frame, table.ether_header_len + SRC_ADDR_OFFSET)
}

/// Destination address of the IPv4 header.
pub fn dst_addr(frame: &[u8], table: &OffsetTable) -> Result<Ipv4Addr, AddressError> {
    addr_at(frame, table.ether_header_len + DST_ADDR_OFFSET)
}

fn addr_at(frame: &[u8], offset: usize) -> Result<Ipv4Addr, AddressError> {
    let available = frame.get(offset..).unwrap_or_default();
    address_from_slice(&available[..available.len().min(ADDR_LEN)])
}
