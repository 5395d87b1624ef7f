//! TCP segment fields.
//!
//! All functions take the segment, i.e. the frame starting at the end of the IPv4 header.

use std::fmt;

use crate::codec::{read_be16, read_be32_unsigned};

/// Smallest TCP header, without options.
pub const TCP_MIN_HEADER_LEN: usize = 20;

const SRC_PORT_OFFSET: usize = 0;
const DST_PORT_OFFSET: usize = 2;
const SEQ_NUM_OFFSET: usize = 4;
const ACK_NUM_OFFSET: usize = 8;
const DATA_OFFSET_OFFSET: usize = 12;
const FLAGS_OFFSET: usize = 13;


/// The 8 flag bits of a TCP header.
///
/// The raw byte is mapped least significant bit first onto the fields in declaration order:
/// bit 0 is `cwr` and bit 7 is `fin`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct TcpFlags {
    pub cwr: bool,
    pub ece: bool,
    pub urg: bool,
    pub ack: bool,
    pub psh: bool,
    pub rst: bool,
    pub syn: bool,
    pub fin: bool,
}

impl TcpFlags {
    /// Creates the flags from 8 booleans in `[cwr, ece, urg, ack, psh, rst, syn, fin]` order.
    pub const fn from_array(flags: [bool; 8]) -> TcpFlags {
        let [cwr, ece, urg, ack, psh, rst, syn, fin] = flags;
        TcpFlags { cwr, ece, urg, ack, psh, rst, syn, fin }
    }

    /// Returns the flags in `[cwr, ece, urg, ack, psh, rst, syn, fin]` order.
    pub const fn to_array(self) -> [bool; 8] {
        [self.cwr, self.ece, self.urg, self.ack, self.psh, self.rst, self.syn, self.fin]
    }

    /// Decodes the raw flags byte.
    pub fn from_byte(byte: u8) -> TcpFlags {
        let mut flags = [false; 8];
        for (bit, flag) in flags.iter_mut().enumerate() {
            *flag = byte & (1 << bit) != 0;
        }
        TcpFlags::from_array(flags)
    }

    /// Encodes the flags back into the raw byte.
    pub fn to_byte(self) -> u8 {
        self.to_array()
            .iter()
            .enumerate()
            .fold(0, |byte, (bit, &set)| if set { byte | (1 << bit) } else { byte })
    }
}

impl From<u8> for TcpFlags {
    fn from(byte: u8) -> Self {
        TcpFlags::from_byte(byte)
    }
}

impl fmt::Display for TcpFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [cwr, ece, urg, ack, psh, rst, syn, fin] = self.to_array();
        write!(f, "[{cwr}, {ece}, {urg}, {ack}, {psh}, {rst}, {syn}, {fin}]")
    }
}


/// Length of the TCP header: high nibble of byte 12 counts 4 bytes words.
pub fn header_len(segment: &[u8]) -> Option<usize> {
    segment
        .get(DATA_OFFSET_OFFSET)
        .map(|&byte| usize::from((byte >> 4) & 0x0F) * 4)
}

pub fn src_port(segment: &[u8]) -> Option<u16> {
    read_be16(segment, SRC_PORT_OFFSET)
}

pub fn dst_port(segment: &[u8]) -> Option<u16> {
    read_be16(segment, DST_PORT_OFFSET)
}

pub fn seq_num(segment: &[u8]) -> Option<u32> {
    read_be32_unsigned(segment, SEQ_NUM_OFFSET)
}

pub fn ack_num(segment: &[u8]) -> Option<u32> {
    read_be32_unsigned(segment, ACK_NUM_OFFSET)
}

pub fn flags(segment: &[u8]) -> Option<TcpFlags> {
    segment.get(FLAGS_OFFSET).copied().map(TcpFlags::from_byte)
}
