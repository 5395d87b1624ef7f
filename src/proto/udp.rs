//! UDP datagram fields.

use crate::codec::read_be16;

/// Length of the UDP header.
pub const UDP_HEADER_LEN: usize = 8;

const SRC_PORT_OFFSET: usize = 0;
const DST_PORT_OFFSET: usize = 2;

pub fn src_port(datagram: &[u8]) -> Option<u16> {
    read_be16(datagram, SRC_PORT_OFFSET)
}

pub fn dst_port(datagram: &[u8]) -> Option<u16> {
    read_be16(datagram, DST_PORT_OFFSET)
}
