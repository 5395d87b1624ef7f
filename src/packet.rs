//! Decoded packets.
//!
//! A [`Packet`] is either decoded from a raw frame with [`decode_packet`] or built from its fields,
//! both paths giving values of the same shape and rendering.

use std::borrow::Cow;
use std::fmt;
use std::net::Ipv4Addr;

use derive_into_owned::IntoOwned;
use log::warn;

use crate::proto::ethernet::{self, MacAddr};
use crate::proto::ipv4::{self, IPV4_MIN_HEADER_LEN};
use crate::proto::link::{self, FrameClass, OffsetTable};
use crate::proto::tcp::{self, TcpFlags, TCP_MIN_HEADER_LEN};
use crate::proto::udp::{self, UDP_HEADER_LEN};
use crate::proto::{classify, payload};

/// Frames flagged as UDP but shorter than this are not decoded further.
pub const UDP_MIN_FRAME_LEN: usize = link::ETHER_HEADER_LEN + IPV4_MIN_HEADER_LEN + UDP_HEADER_LEN;

/// Frames flagged as TCP but shorter than this are not decoded further.
pub const TCP_MIN_FRAME_LEN: usize = link::ETHER_HEADER_LEN + IPV4_MIN_HEADER_LEN + TCP_MIN_HEADER_LEN;


/// Fields shared by every IPv4 packet.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct IpFields {
    /// Capture timestamp in milliseconds
    pub timestamp_millis: u64,
    pub src_mac: MacAddr,
    pub dst_mac: MacAddr,
    pub src_ip: Ipv4Addr,
    pub dst_ip: Ipv4Addr,
}

impl IpFields {
    pub fn new(timestamp_millis: u64, src_mac: MacAddr, dst_mac: MacAddr, src_ip: Ipv4Addr, dst_ip: Ipv4Addr) -> IpFields {
        IpFields { timestamp_millis, src_mac, dst_mac, src_ip, dst_ip }
    }

    /// Decodes the Ethernet and IPv4 addresses of a frame.
    ///
    /// An address that can't be read is logged and replaced by an unset value
    /// (`00:00:00:00:00:00` or `0.0.0.0`) so the rest of the frame can still be decoded.
    pub fn from_frame(frame: &[u8], timestamp_millis: u64, table: &OffsetTable) -> IpFields {
        let src_mac = ethernet::src_mac(frame).unwrap_or_else(|e| {
            warn!("Unable to read the source MAC address: {e}");
            MacAddr::default()
        });
        let dst_mac = ethernet::dst_mac(frame).unwrap_or_else(|e| {
            warn!("Unable to read the destination MAC address: {e}");
            MacAddr::default()
        });
        let src_ip = ipv4::src_addr(frame, table).unwrap_or_else(|e| {
            warn!("Unable to read the source IP address: {e}");
            Ipv4Addr::UNSPECIFIED
        });
        let dst_ip = ipv4::dst_addr(frame, table).unwrap_or_else(|e| {
            warn!("Unable to read the destination IP address: {e}");
            Ipv4Addr::UNSPECIFIED
        });

        IpFields { timestamp_millis, src_mac, dst_mac, src_ip, dst_ip }
    }

    fn fmt_lines(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TimeStamp: {}", self.timestamp_millis / 1000)?;
        writeln!(f, "SRC MAC: {}", self.src_mac)?;
        writeln!(f, "DST MAC: {}", self.dst_mac)?;
        writeln!(f, "SRC IP: {}", self.src_ip)?;
        writeln!(f, "DEST IP: {}", self.dst_ip)
    }
}

impl fmt::Display for IpFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "-----PACKET-----")?;
        self.fmt_lines(f)
    }
}


/// TCP segment carried by IPv4.
#[derive(Clone, Debug, Eq, PartialEq, IntoOwned)]
pub struct TcpPacket<'a> {
    pub ip: IpFields,
    pub src_port: u16,
    pub dst_port: u16,
    pub seq_num: u32,
    pub ack_num: u32,
    pub flags: TcpFlags,
    /// Bytes following the TCP header
    pub payload: Cow<'a, [u8]>,
}

impl<'a> TcpPacket<'a> {
    /// Builds a segment from its fields, with sequence and acknowledgment numbers set to 0.
    pub fn new(ip: IpFields, src_port: u16, dst_port: u16, flags: TcpFlags, payload: impl Into<Cow<'a, [u8]>>) -> TcpPacket<'a> {
        TcpPacket {
            ip,
            src_port,
            dst_port,
            seq_num: 0,
            ack_num: 0,
            flags,
            payload: payload.into(),
        }
    }

    pub fn with_sequence(mut self, seq_num: u32, ack_num: u32) -> TcpPacket<'a> {
        self.seq_num = seq_num;
        self.ack_num = ack_num;
        self
    }

    /// Decodes the segment of a frame already classified as TCP.
    ///
    /// Returns `None` if a header field lies past the end of the frame.
    pub fn from_frame(frame: &'a [u8], timestamp_millis: u64, table: &OffsetTable) -> Option<TcpPacket<'a>> {
        let segment_start = table.ether_header_len + ipv4::header_len(frame, table)?;
        let segment = frame.get(segment_start..)?;

        let packet = TcpPacket {
            ip: IpFields::from_frame(frame, timestamp_millis, table),
            src_port: tcp::src_port(segment)?,
            dst_port: tcp::dst_port(segment)?,
            seq_num: tcp::seq_num(segment)?,
            ack_num: tcp::ack_num(segment)?,
            flags: tcp::flags(segment)?,
            payload: Cow::Borrowed(payload(frame, segment_start + tcp::header_len(segment)?)),
        };

        Some(packet)
    }
}

impl fmt::Display for TcpPacket<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "-----TCP PACKET-----")?;
        self.ip.fmt_lines(f)?;
        writeln!(f, "SRC PORT: {}", self.src_port)?;
        writeln!(f, "DEST PORT: {}", self.dst_port)?;
        writeln!(f, "FLAGS: {}", self.flags)
    }
}


/// UDP datagram carried by IPv4.
#[derive(Clone, Debug, Eq, PartialEq, IntoOwned)]
pub struct UdpPacket<'a> {
    pub ip: IpFields,
    pub src_port: u16,
    pub dst_port: u16,
    /// Bytes following the UDP header
    pub payload: Cow<'a, [u8]>,
}

impl<'a> UdpPacket<'a> {
    pub fn new(ip: IpFields, src_port: u16, dst_port: u16, payload: impl Into<Cow<'a, [u8]>>) -> UdpPacket<'a> {
        UdpPacket { ip, src_port, dst_port, payload: payload.into() }
    }

    /// Decodes the datagram of a frame already classified as UDP.
    pub fn from_frame(frame: &'a [u8], timestamp_millis: u64, table: &OffsetTable) -> Option<UdpPacket<'a>> {
        let datagram_start = table.ether_header_len + ipv4::header_len(frame, table)?;
        let datagram = frame.get(datagram_start..)?;

        let packet = UdpPacket {
            ip: IpFields::from_frame(frame, timestamp_millis, table),
            src_port: udp::src_port(datagram)?,
            dst_port: udp::dst_port(datagram)?,
            payload: Cow::Borrowed(payload(frame, datagram_start + UDP_HEADER_LEN)),
        };

        Some(packet)
    }
}

impl fmt::Display for UdpPacket<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "-----UDP PACKET-----")?;
        self.ip.fmt_lines(f)?;
        writeln!(f, "SRC PORT: {}", self.src_port)?;
        writeln!(f, "DEST PORT: {}", self.dst_port)
    }
}


/// A decoded frame.
#[derive(Clone, Debug, Eq, PartialEq, IntoOwned)]
pub enum Packet<'a> {
    /// Frame that isn't decoded: not IPv4, or too short for its transport protocol.
    /// Holds the EtherType (or the IP protocol number for short frames) in lowercase hex.
    Unknown(String),
    /// IPv4 frame carrying neither TCP nor UDP
    Ip(IpFields),
    Tcp(TcpPacket<'a>),
    Udp(UdpPacket<'a>),
}

impl Packet<'_> {
    /// IPv4 fields, for every variant but `Unknown`.
    pub fn ip(&self) -> Option<&IpFields> {
        match self {
            Packet::Unknown(_) => None,
            Packet::Ip(ip) => Some(ip),
            Packet::Tcp(tcp) => Some(&tcp.ip),
            Packet::Udp(udp) => Some(&udp.ip),
        }
    }

    pub fn is_ip(&self) -> bool {
        self.ip().is_some()
    }

    pub fn timestamp_millis(&self) -> Option<u64> {
        self.ip().map(|ip| ip.timestamp_millis)
    }

    /// Source and destination ports of TCP and UDP packets.
    pub fn ports(&self) -> Option<(u16, u16)> {
        match self {
            Packet::Tcp(tcp) => Some((tcp.src_port, tcp.dst_port)),
            Packet::Udp(udp) => Some((udp.src_port, udp.dst_port)),
            _ => None,
        }
    }

    pub fn flags(&self) -> Option<TcpFlags> {
        match self {
            Packet::Tcp(tcp) => Some(tcp.flags),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Packet::Tcp(tcp) => Some(&tcp.payload),
            Packet::Udp(udp) => Some(&udp.payload),
            _ => None,
        }
    }
}

impl<'a> From<TcpPacket<'a>> for Packet<'a> {
    fn from(packet: TcpPacket<'a>) -> Self {
        Packet::Tcp(packet)
    }
}

impl<'a> From<UdpPacket<'a>> for Packet<'a> {
    fn from(packet: UdpPacket<'a>) -> Self {
        Packet::Udp(packet)
    }
}

impl fmt::Display for Packet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packet::Unknown(_) => writeln!(f, "No Info"),
            Packet::Ip(ip) => fmt::Display::fmt(ip, f),
            Packet::Tcp(tcp) => fmt::Display::fmt(tcp, f),
            Packet::Udp(udp) => fmt::Display::fmt(udp, f),
        }
    }
}


/// Decodes a raw Ethernet frame.
///
/// Frames flagged UDP shorter than [`UDP_MIN_FRAME_LEN`] and frames flagged TCP shorter than
/// [`TCP_MIN_FRAME_LEN`] are returned as [`Packet::Unknown`] without reading their transport
/// header, as are frames whose declared header lengths run past their end.
pub fn decode_packet<'a>(frame: &'a [u8], timestamp_millis: u64, table: &OffsetTable) -> Packet<'a> {
    match classify(frame, table) {
        FrameClass::Udp if frame.len() >= UDP_MIN_FRAME_LEN => {
            UdpPacket::from_frame(frame, timestamp_millis, table)
                .map(Packet::Udp)
                .unwrap_or_else(|| unknown_protocol(frame, table))
        },
        FrameClass::Tcp if frame.len() >= TCP_MIN_FRAME_LEN => {
            TcpPacket::from_frame(frame, timestamp_millis, table)
                .map(Packet::Tcp)
                .unwrap_or_else(|| unknown_protocol(frame, table))
        },
        FrameClass::Udp | FrameClass::Tcp => unknown_protocol(frame, table),
        FrameClass::Ipv4 => Packet::Ip(IpFields::from_frame(frame, timestamp_millis, table)),
        FrameClass::Other => {
            let ether_type = link::ether_type(frame, table).map(|t| format!("{t:x}")).unwrap_or_default();
            Packet::Unknown(ether_type)
        },
    }
}

fn unknown_protocol<'a>(frame: &[u8], table: &OffsetTable) -> Packet<'a> {
    let proto = link::ip_protocol(frame, table).map(|p| format!("{p:x}")).unwrap_or_default();
    Packet::Unknown(proto)
}
