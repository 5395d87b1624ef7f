//! Synthetic traffic built from a capture.
//!
//! The generator replays the IP packets of a capture and periodically injects crafted TCP packets
//! whose fields cycle through configured lists, producing a labeled attack pattern.

use std::io::Read;
use std::net::Ipv4Addr;

use log::{debug, info};

use crate::errors::{CaptureResult, GeneratorError};
use crate::packet::{IpFields, Packet, TcpPacket};
use crate::pcap::CaptureReader;
use crate::proto::{MacAddr, TcpFlags};

/// Share of anomalous packets used when nothing else is configured.
pub const DEFAULT_PERCENTAGE: u8 = 10;

/// Share of anomalous packets of the built-in attack patterns.
pub const ATTACK_PERCENTAGE: u8 = 20;


/// Attack pattern simulated by the generator.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Pattern {
    /// Settings are used as given
    #[default]
    Custom,
    /// Denial of service: the settings lists are added to the defaults
    Dos,
    /// SYN flood: like `Dos`, with SYN-only flags
    SynFlood,
}


/// Values the crafted packets are built from.
///
/// Each list is cycled independently, one element per injected packet.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GeneratorSettings {
    pub src_ips: Vec<Ipv4Addr>,
    pub dst_ips: Vec<Ipv4Addr>,
    pub src_ports: Vec<u16>,
    pub dst_ports: Vec<u16>,
    pub flags: Vec<TcpFlags>,
    /// Overrides the percentage of anomalous packets, 0 disables injection
    pub percentage: Option<u8>,
}


/// Packet produced by the generator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedPacket {
    pub packet: Packet<'static>,
    /// The packet was crafted rather than replayed
    pub anomalous: bool,
}


/// Cycles through a non-empty list.
#[derive(Clone, Debug)]
struct Cycle<T> {
    items: Vec<T>,
    next: usize,
}

impl<T: Clone> Cycle<T> {
    fn new(items: Vec<T>) -> Self {
        Cycle { items, next: 0 }
    }

    fn next_item(&mut self) -> Option<T> {
        let item = self.items.get(self.next)?.clone();
        self.next = (self.next + 1) % self.items.len();
        Some(item)
    }

    fn extend(&mut self, items: &[T]) {
        self.items.extend_from_slice(items);
    }

    fn replace(&mut self, items: &[T], name: &'static str) -> Result<(), GeneratorError> {
        if items.is_empty() {
            return Err(GeneratorError::EmptyList(name));
        }
        *self = Cycle::new(items.to_vec());
        Ok(())
    }
}


/// Replays captured packets and injects anomalies at a fixed rate.
///
/// With a percentage `p`, one packet out of `100 / p` is crafted.
#[derive(Clone, Debug)]
pub struct AnomalyGenerator {
    pattern: Pattern,
    percentage: u8,
    packets_till_anomaly: u32,
    src_ips: Cycle<Ipv4Addr>,
    dst_ips: Cycle<Ipv4Addr>,
    src_ports: Cycle<u16>,
    dst_ports: Cycle<u16>,
    flags: Cycle<TcpFlags>,
    replay: Cycle<Packet<'static>>,
    last_timestamp: u64,
}

impl AnomalyGenerator {
    /// Creates a generator replaying the IP packets among `packets`, with the default settings.
    pub fn new(packets: Vec<Packet<'static>>) -> AnomalyGenerator {
        let packets: Vec<_> = packets.into_iter().filter(Packet::is_ip).collect();
        let last_timestamp = packets.first().and_then(Packet::timestamp_millis).unwrap_or_default();

        AnomalyGenerator {
            pattern: Pattern::Custom,
            percentage: DEFAULT_PERCENTAGE,
            packets_till_anomaly: interval(DEFAULT_PERCENTAGE),
            src_ips: Cycle::new(vec![Ipv4Addr::new(192, 168, 1, 1)]),
            dst_ips: Cycle::new(vec![Ipv4Addr::new(192, 168, 0, 1)]),
            src_ports: Cycle::new(vec![80]),
            dst_ports: Cycle::new(vec![80]),
            flags: Cycle::new(vec![TcpFlags::default()]),
            replay: Cycle::new(packets),
            last_timestamp,
        }
    }

    /// Reads the whole capture and creates a generator replaying its IP packets.
    pub fn from_capture<R: Read>(reader: &mut CaptureReader<R>) -> CaptureResult<AnomalyGenerator> {
        let mut packets = Vec::new();
        while let Some(packet) = reader.read_next()? {
            packets.push(packet);
        }

        let generator = AnomalyGenerator::new(packets);
        info!("Loaded {} IP packets for replay", generator.replay_len());
        Ok(generator)
    }

    /// Selects the simulated pattern.
    ///
    /// Nothing is changed if the settings are rejected.
    pub fn configure(&mut self, pattern: Pattern, settings: &GeneratorSettings) -> Result<(), GeneratorError> {
        let percentage = match (settings.percentage, pattern) {
            (Some(percentage), _) => Some(percentage),
            (None, Pattern::Custom) => None,
            (None, Pattern::Dos | Pattern::SynFlood) => Some(ATTACK_PERCENTAGE),
        };
        if let Some(percentage) = percentage.filter(|&p| p > 100) {
            return Err(GeneratorError::PercentageOutOfRange(percentage));
        }

        let mut src_ips = self.src_ips.clone();
        let mut dst_ips = self.dst_ips.clone();
        let mut src_ports = self.src_ports.clone();
        let mut dst_ports = self.dst_ports.clone();
        let mut flags = self.flags.clone();

        match pattern {
            Pattern::Custom => {
                src_ips.replace(&settings.src_ips, "source addresses")?;
                dst_ips.replace(&settings.dst_ips, "destination addresses")?;
                src_ports.replace(&settings.src_ports, "source ports")?;
                dst_ports.replace(&settings.dst_ports, "destination ports")?;
                flags.replace(&settings.flags, "flags")?;
            },
            Pattern::Dos | Pattern::SynFlood => {
                src_ips.extend(&settings.src_ips);
                dst_ips.extend(&settings.dst_ips);
                src_ports.extend(&settings.src_ports);
                dst_ports.extend(&settings.dst_ports);

                if pattern == Pattern::SynFlood {
                    flags = Cycle::new(vec![TcpFlags { syn: true, ..Default::default() }]);
                }
                else {
                    flags.extend(&settings.flags);
                }
            },
        }

        self.src_ips = src_ips;
        self.dst_ips = dst_ips;
        self.src_ports = src_ports;
        self.dst_ports = dst_ports;
        self.flags = flags;
        if let Some(percentage) = percentage {
            self.percentage = percentage;
            self.packets_till_anomaly = interval(percentage);
        }

        self.pattern = pattern;
        debug!("Generator configured for {:?} at {}%", pattern, self.percentage);
        Ok(())
    }

    /// Sets the share of anomalous packets, 0 turns injection off.
    pub fn set_percentage(&mut self, percentage: u8) -> Result<(), GeneratorError> {
        if percentage > 100 {
            return Err(GeneratorError::PercentageOutOfRange(percentage));
        }

        self.percentage = percentage;
        self.packets_till_anomaly = interval(percentage);
        Ok(())
    }

    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    pub fn percentage(&self) -> u8 {
        self.percentage
    }

    /// Number of packets available for replay.
    pub fn replay_len(&self) -> usize {
        self.replay.items.len()
    }

    /// Returns the next packet of the stream, `None` if there is nothing to replay.
    pub fn next_packet(&mut self) -> Option<GeneratedPacket> {
        if self.replay.items.is_empty() {
            return None;
        }

        if self.percentage > 0 && self.packets_till_anomaly <= 1 {
            self.packets_till_anomaly = interval(self.percentage);
            let packet = self.craft()?;
            return Some(GeneratedPacket { packet, anomalous: true });
        }

        self.packets_till_anomaly = self.packets_till_anomaly.saturating_sub(1);
        let packet = self.replay.next_item()?;
        if let Some(timestamp) = packet.timestamp_millis() {
            self.last_timestamp = timestamp;
        }

        Some(GeneratedPacket { packet, anomalous: false })
    }

    fn craft(&mut self) -> Option<Packet<'static>> {
        let ip = IpFields::new(
            self.last_timestamp,
            MacAddr::BROADCAST,
            MacAddr::BROADCAST,
            self.src_ips.next_item()?,
            self.dst_ips.next_item()?,
        );
        let tcp = TcpPacket::new(
            ip,
            self.src_ports.next_item()?,
            self.dst_ports.next_item()?,
            self.flags.next_item()?,
            Vec::new(),
        );

        Some(Packet::Tcp(tcp))
    }
}

impl Iterator for AnomalyGenerator {
    type Item = GeneratedPacket;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_packet()
    }
}

fn interval(percentage: u8) -> u32 {
    match percentage {
        0 => u32::MAX,
        p => 100 / u32::from(p),
    }
}
