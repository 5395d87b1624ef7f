use std::io::Write;
use std::net::Ipv4Addr;

use pcap_decode::{
    CaptureConfig, CaptureError, CaptureReader, IpFields, MacAddr, Packet, TcpFlags, TcpPacket, UdpPacket,
};
use tempfile::NamedTempFile;

const SRC_MAC: [u8; 6] = [0x00, 0x1B, 0x21, 0x0A, 0x0B, 0x0C];
const DST_MAC: [u8; 6] = [0xFF, 0x01, 0x02, 0x03, 0x04, 0x05];
const DST_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 254);


/// Builds a little endian capture in memory.
pub struct CaptureBuilder {
    data: Vec<u8>,
}

impl CaptureBuilder {
    pub fn new() -> Self {
        Self::with_magic(0xA1B2C3D4)
    }

    pub fn with_magic(magic: u32) -> Self {
        let mut data = Vec::new();
        data.extend_from_slice(&magic.to_le_bytes());
        data.extend_from_slice(&2_u16.to_le_bytes());
        data.extend_from_slice(&4_u16.to_le_bytes());
        data.extend_from_slice(&0_i32.to_le_bytes());
        data.extend_from_slice(&0_u32.to_le_bytes());
        data.extend_from_slice(&0xFFFF_u32.to_le_bytes());
        data.extend_from_slice(&1_u32.to_le_bytes());

        CaptureBuilder { data }
    }

    pub fn record(mut self, ts_sec: u32, ts_usec: u32, frame: &[u8]) -> Self {
        self.data.extend_from_slice(&ts_sec.to_le_bytes());
        self.data.extend_from_slice(&ts_usec.to_le_bytes());
        self.data.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        self.data.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        self.data.extend_from_slice(frame);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

fn ipv4_frame(src_ip: Ipv4Addr, protocol: u8) -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(&DST_MAC);
    frame.extend_from_slice(&SRC_MAC);
    frame.extend_from_slice(&[0x08, 0x00]);
    frame.extend_from_slice(&[0x45, 0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x00, 0x40, protocol, 0x00, 0x00]);
    frame.extend_from_slice(&src_ip.octets());
    frame.extend_from_slice(&DST_IP.octets());
    frame
}

/// Ethernet + IPv4 + UDP frame, 42 bytes plus the payload.
pub fn udp_frame(src_ip: Ipv4Addr, src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = ipv4_frame(src_ip, 17);
    frame.extend_from_slice(&src_port.to_be_bytes());
    frame.extend_from_slice(&dst_port.to_be_bytes());
    frame.extend_from_slice(&((8 + payload.len()) as u16).to_be_bytes());
    frame.extend_from_slice(&[0x00, 0x00]);
    frame.extend_from_slice(payload);
    frame
}

/// Ethernet + IPv4 + TCP frame without payload, 54 bytes.
pub fn tcp_frame(src_ip: Ipv4Addr, src_port: u16, dst_port: u16, flags: u8) -> Vec<u8> {
    let mut frame = ipv4_frame(src_ip, 6);
    frame.extend_from_slice(&src_port.to_be_bytes());
    frame.extend_from_slice(&dst_port.to_be_bytes());
    frame.extend_from_slice(&0x0000_1000_u32.to_be_bytes());
    frame.extend_from_slice(&0x8000_0001_u32.to_be_bytes());
    frame.extend_from_slice(&[0x50, flags, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00]);
    frame
}

/// Inserts an 802.1Q tag after the MAC addresses.
fn tagged(frame: &[u8]) -> Vec<u8> {
    let mut out = frame[..12].to_vec();
    out.extend_from_slice(&[0x81, 0x00, 0x00, 0x64]);
    out.extend_from_slice(&frame[12..]);
    out
}

fn read_all(data: &[u8], config: CaptureConfig) -> Vec<Packet<'static>> {
    let reader = CaptureReader::new(data, config).unwrap();
    reader.map(|packet| packet.unwrap()).collect()
}

fn ip_fields(timestamp_millis: u64, src_ip: Ipv4Addr) -> IpFields {
    IpFields::new(timestamp_millis, MacAddr(SRC_MAC), MacAddr(DST_MAC), src_ip, DST_IP)
}


#[test]
fn single_udp_record() {
    let frame = udp_frame(Ipv4Addr::new(10, 0, 0, 1), 53, 5000, b"");
    assert_eq!(frame.len(), 42);
    let data = CaptureBuilder::new().record(1445457108, 250_000, &frame).build();

    let mut reader = CaptureReader::new(&data[..], CaptureConfig::default()).unwrap();
    assert_eq!(reader.header().magic_number, 0xA1B2C3D4);
    assert_eq!(reader.header().snaplen, 0xFFFF);

    let packet = reader.read_next().unwrap().unwrap();
    let expected = UdpPacket::new(ip_fields(1445457108250, Ipv4Addr::new(10, 0, 0, 1)), 53, 5000, Vec::new());
    assert_eq!(packet, Packet::Udp(expected));

    assert_eq!(reader.read_next().unwrap(), None);
    assert_eq!(reader.read_next().unwrap(), None);
    assert_eq!(reader.offset(), Some(data.len() as u64));
}

#[test]
fn tcp_minimum_length() {
    let frame = tcp_frame(Ipv4Addr::new(10, 0, 0, 2), 443, 51000, 0x12);
    assert_eq!(frame.len(), 54);
    let data = CaptureBuilder::new()
        .record(10, 0, &frame)
        .record(11, 0, &frame[..53])
        .build();

    let packets = read_all(&data, CaptureConfig::default());
    assert_eq!(packets.len(), 2);

    let Packet::Tcp(tcp) = &packets[0] else { panic!("expected a TCP packet, got {:?}", packets[0]) };
    assert_eq!((tcp.src_port, tcp.dst_port), (443, 51000));
    assert_eq!(tcp.seq_num, 0x1000);
    assert_eq!(tcp.ack_num, 0x8000_0001);
    assert!(tcp.flags.ece && tcp.flags.psh);
    assert!(!tcp.flags.syn && !tcp.flags.ack);
    assert!(tcp.payload.is_empty());

    assert_eq!(packets[1], Packet::Unknown("6".to_string()));
}

#[test]
fn mixed_capture() {
    let mut arp = vec![0xFF; 12];
    arp.extend_from_slice(&[0x08, 0x06]);
    arp.extend_from_slice(&[0x00; 28]);

    let mut icmp = ipv4_frame(Ipv4Addr::new(10, 0, 0, 7), 1);
    icmp.extend_from_slice(&[0x08, 0x00, 0x00, 0x00]);

    let data = CaptureBuilder::new()
        .record(1, 0, &arp)
        .record(2, 0, &icmp)
        .record(3, 0, &udp_frame(Ipv4Addr::new(10, 0, 0, 8), 1000, 2000, b"hello"))
        .build();

    let packets = read_all(&data, CaptureConfig::default());
    assert_eq!(packets[0], Packet::Unknown("806".to_string()));
    assert_eq!(packets[1], Packet::Ip(ip_fields(2_000, Ipv4Addr::new(10, 0, 0, 7))));
    assert_eq!(packets[2].payload(), Some(&b"hello"[..]));
    assert_eq!(packets.iter().filter(|p| p.is_ip()).count(), 2);
}

#[test]
fn vlan_tagged_capture() {
    let frame = tagged(&udp_frame(Ipv4Addr::new(192, 168, 5, 5), 67, 68, b""));
    let data = CaptureBuilder::new().record(5, 0, &frame).build();

    let packets = read_all(&data, CaptureConfig::default().with_vlan_tag(true));
    let Packet::Udp(udp) = &packets[0] else { panic!("expected a UDP packet, got {:?}", packets[0]) };
    assert_eq!(udp.ip.src_ip, Ipv4Addr::new(192, 168, 5, 5));
    assert_eq!(udp.ip.dst_ip, DST_IP);
    assert_eq!((udp.src_port, udp.dst_port), (67, 68));

    // Without the setting the tag is read as the EtherType
    let packets = read_all(&data, CaptureConfig::default());
    assert_eq!(packets[0], Packet::Unknown("8100".to_string()));
}

#[test]
fn timestamps_follow_the_capture() {
    let frame = udp_frame(Ipv4Addr::new(10, 0, 0, 1), 1, 2, b"");
    let data = CaptureBuilder::new()
        .record(100, 999_999, &frame)
        .record(101, 0, &frame)
        .record(101, 1_000, &frame)
        .record(101, 1_999, &frame)
        .build();

    let timestamps: Vec<u64> = read_all(&data, CaptureConfig::default())
        .iter()
        .filter_map(Packet::timestamp_millis)
        .collect();

    assert_eq!(timestamps, [100_999, 101_000, 101_001, 101_001]);
    assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn constructed_matches_decoded() {
    let src_ip = Ipv4Addr::new(172, 16, 1, 1);
    let data = CaptureBuilder::new()
        .record(7, 0, &tcp_frame(src_ip, 80, 8080, 0x40))
        .build();

    let decoded = read_all(&data, CaptureConfig::default()).remove(0);
    let constructed = Packet::from(
        TcpPacket::new(ip_fields(7_000, src_ip), 80, 8080, TcpFlags::from_byte(0x40), Vec::new())
            .with_sequence(0x1000, 0x8000_0001),
    );

    assert_eq!(decoded, constructed);
    assert_eq!(decoded.to_string(), constructed.to_string());
    assert!(decoded.to_string().starts_with("-----TCP PACKET-----\nTimeStamp: 7\n"));
}

#[test]
fn verbose_mode_keeps_values() {
    let data = CaptureBuilder::new()
        .record(1, 0, &udp_frame(Ipv4Addr::new(10, 0, 0, 1), 53, 5000, b"abc"))
        .record(2, 0, &tcp_frame(Ipv4Addr::new(10, 0, 0, 2), 22, 40000, 0x10))
        .build();

    let quiet = read_all(&data, CaptureConfig::default());
    let verbose = read_all(&data, CaptureConfig::default().with_verbose(true));
    assert_eq!(quiet, verbose);
}

#[test]
fn unrecognized_magic() {
    let data = CaptureBuilder::with_magic(0x0A0D0D0A).build();

    match CaptureReader::new(&data[..], CaptureConfig::default()) {
        Err(CaptureError::UnrecognizedFormat(0x0A0D0D0A)) => {},
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn big_endian_magic_is_rejected() {
    let mut data = CaptureBuilder::new().build();
    data[..4].copy_from_slice(&0xA1B2C3D4_u32.to_be_bytes());

    assert!(matches!(
        CaptureReader::new(&data[..], CaptureConfig::default()),
        Err(CaptureError::UnrecognizedFormat(_))
    ));
}

#[test]
fn iteration_stops_after_truncated_record() {
    let mut data = CaptureBuilder::new()
        .record(1, 0, &udp_frame(Ipv4Addr::new(10, 0, 0, 1), 53, 5000, b""))
        .record(2, 0, &udp_frame(Ipv4Addr::new(10, 0, 0, 2), 53, 5000, b"payload"))
        .record(3, 0, &udp_frame(Ipv4Addr::new(10, 0, 0, 3), 53, 5000, b""))
        .build();
    data.truncate(data.len() - 42 - 16 - 3);

    let mut reader = CaptureReader::new(&data[..], CaptureConfig::default()).unwrap();
    let results: Vec<_> = reader.by_ref().collect();

    assert_eq!(results.len(), 2);
    assert!(matches!(results[0], Ok(Packet::Udp(_))));
    match &results[1] {
        Err(CaptureError::TruncatedCapture { needed, available }) => assert_eq!((*needed, *available), (49, 46)),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(reader.next().is_none());
}

#[test]
fn trailing_partial_header() {
    let mut data = CaptureBuilder::new()
        .record(1, 0, &udp_frame(Ipv4Addr::new(10, 0, 0, 1), 53, 5000, b""))
        .build();
    data.extend_from_slice(&[0x01, 0x02, 0x03]);

    let packets = read_all(&data, CaptureConfig::default());
    assert_eq!(packets.len(), 1);
}

#[test]
fn open_file() {
    let data = CaptureBuilder::new()
        .record(1, 0, &udp_frame(Ipv4Addr::new(10, 0, 0, 1), 53, 5000, b""))
        .record(2, 0, &tcp_frame(Ipv4Addr::new(10, 0, 0, 2), 22, 40000, 0x10))
        .build();

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&data).unwrap();
    file.flush().unwrap();

    let mut reader = CaptureReader::open(file.path(), CaptureConfig::default()).unwrap();
    assert!(reader.is_open());
    assert!(matches!(reader.read_next().unwrap(), Some(Packet::Udp(_))));
    assert!(matches!(reader.read_next().unwrap(), Some(Packet::Tcp(_))));
    assert!(reader.read_next().unwrap().is_none());
    assert_eq!(reader.records_read(), 2);

    reader.close();
    assert!(!reader.is_open());
    assert!(matches!(reader.read_next(), Err(CaptureError::SessionClosed)));
}

#[test]
fn open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.pcap");

    match CaptureReader::open(&path, CaptureConfig::default()) {
        Err(CaptureError::OpenFailed { path: failed, .. }) => assert_eq!(failed, path),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn empty_file() {
    let file = NamedTempFile::new().unwrap();

    assert!(matches!(
        CaptureReader::open(file.path(), CaptureConfig::default()),
        Err(CaptureError::IncompleteHeader(0))
    ));
}
