//! Decodes classic pcap captures of Ethernet traffic into typed IPv4, TCP and UDP packets.
//!
//! Also provides an [`AnomalyGenerator`] which replays a capture while injecting crafted packets,
//! creating a labeled attack pattern.
//!
//! # Examples
//!
//! ```no_run
//! use pcap_decode::{CaptureConfig, CaptureReader, Packet};
//!
//! let config = CaptureConfig::default().with_vlan_tag(false);
//! let reader = CaptureReader::open("test.pcap", config).expect("Error opening file");
//!
//! for packet in reader {
//!     // Check if there is no error
//!     let packet = packet.unwrap();
//!
//!     if let Packet::Udp(udp) = &packet {
//!         println!("{} -> {}", udp.src_port, udp.dst_port);
//!     }
//! }
//! ```

pub mod codec;
pub mod errors;
pub mod generator;
pub mod packet;
pub mod pcap;
pub mod proto;
mod cursor;

pub use cursor::ByteCursor;
pub use errors::*;
pub use generator::{AnomalyGenerator, GeneratedPacket, GeneratorSettings, Pattern};
pub use packet::{decode_packet, IpFields, Packet, TcpPacket, UdpPacket};
pub use pcap::{CaptureConfig, CaptureReader, GlobalHeader, RawRecord, RecordHeader};
pub use proto::{offsets, MacAddr, OffsetTable, TcpFlags};
