//! Link and network layer classification.

use crate::codec::read_be16;
use crate::proto::ipv4::{IP_PROTO_OFFSET, IP_PROTO_TCP, IP_PROTO_UDP};

/// Length of an untagged Ethernet II header.
pub const ETHER_HEADER_LEN: usize = 14;

/// Length added by an 802.1Q tag.
pub const VLAN_TAG_LEN: usize = 4;

/// Offset of the EtherType in an untagged frame.
pub const ETHER_TYPE_OFFSET: usize = 12;

/// EtherType of IPv4.
pub const ETHER_TYPE_IPV4: u16 = 0x0800;


/// Header offsets of a frame, derived from whether the capture carries an 802.1Q tag.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct OffsetTable {
    /// Length of the Ethernet header, tag included
    pub ether_header_len: usize,
    /// Offset of the EtherType field
    pub ether_type_offset: usize,
    /// Offset of the IPv4 version/IHL byte
    pub ver_ihl_offset: usize,
}

/// Computes the offset table for a capture with or without an 802.1Q tag.
pub const fn offsets(vlan_tag_present: bool) -> OffsetTable {
    let tag = if vlan_tag_present { VLAN_TAG_LEN } else { 0 };

    OffsetTable {
        ether_header_len: ETHER_HEADER_LEN + tag,
        ether_type_offset: ETHER_TYPE_OFFSET + tag,
        ver_ihl_offset: ETHER_HEADER_LEN + tag,
    }
}

impl OffsetTable {
    /// Offset of the IPv4 protocol byte.
    pub const fn ip_proto_offset(&self) -> usize {
        self.ether_header_len + IP_PROTO_OFFSET
    }
}

impl Default for OffsetTable {
    fn default() -> Self {
        offsets(false)
    }
}


/// Class of a frame, checked in dispatch order.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FrameClass {
    /// IPv4 carrying UDP
    Udp,
    /// IPv4 carrying TCP
    Tcp,
    /// IPv4 carrying any other protocol
    Ipv4,
    /// Anything else
    Other,
}

/// Returns the EtherType of the frame.
pub fn ether_type(frame: &[u8], table: &OffsetTable) -> Option<u16> {
    read_be16(frame, table.ether_type_offset)
}

/// Returns the IPv4 protocol number found in the frame.
pub fn ip_protocol(frame: &[u8], table: &OffsetTable) -> Option<u8> {
    frame.get(table.ip_proto_offset()).copied()
}

pub fn is_ipv4(frame: &[u8], table: &OffsetTable) -> bool {
    ether_type(frame, table) == Some(ETHER_TYPE_IPV4)
}

pub fn is_tcp(frame: &[u8], table: &OffsetTable) -> bool {
    is_ipv4(frame, table) && ip_protocol(frame, table) == Some(IP_PROTO_TCP)
}

pub fn is_udp(frame: &[u8], table: &OffsetTable) -> bool {
    is_ipv4(frame, table) && ip_protocol(frame, table) == Some(IP_PROTO_UDP)
}

/// Classifies a frame: UDP first, then TCP, then any IPv4.
pub fn classify(frame: &[u8], table: &OffsetTable) -> FrameClass {
    if is_udp(frame, table) {
        FrameClass::Udp
    }
    else if is_tcp(frame, table) {
        FrameClass::Tcp
    }
    else if is_ipv4(frame, table) {
        FrameClass::Ipv4
    }
    else {
        FrameClass::Other
    }
}
