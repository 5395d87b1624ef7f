use crate::codec::{read_le16, read_le32, read_le32_signed};
use crate::errors::*;
use crate::pcap::{GLOBAL_HEADER_LEN, PCAP_MAGIC_NUMBER, RECORD_HEADER_LEN};


/// Pcap global header, the 24 bytes preamble of a capture file.
///
/// Only the magic number is validated; the other fields are decoded as found.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GlobalHeader {
    /// Magic number, always `0xA1B2C3D4` once validated
    pub magic_number: u32,
    /// Major version number
    pub version_major: u16,
    /// Minor version number
    pub version_minor: u16,
    /// GMT to local timezone correction, in seconds
    pub ts_correction: i32,
    /// Timestamp accuracy, usually 0
    pub ts_accuracy: u32,
    /// Max length of captured packets
    pub snaplen: u32,
    /// Link-layer type of the records
    pub linktype: u32,
}

impl GlobalHeader {
    /// Parses and validates a global header.
    ///
    /// Returns [`CaptureError::UnrecognizedFormat`] if the magic number, read as little-endian,
    /// isn't `0xA1B2C3D4`.
    pub fn from_bytes(bytes: &[u8; GLOBAL_HEADER_LEN]) -> CaptureResult<GlobalHeader> {
        let field = |offset| read_le32(bytes, offset).unwrap_or_default();

        let magic_number = field(0);
        if magic_number != PCAP_MAGIC_NUMBER {
            return Err(CaptureError::UnrecognizedFormat(magic_number));
        }

        Ok(GlobalHeader {
            magic_number,
            version_major: read_le16(bytes, 4).unwrap_or_default(),
            version_minor: read_le16(bytes, 6).unwrap_or_default(),
            ts_correction: read_le32_signed(bytes, 8).unwrap_or_default(),
            ts_accuracy: field(12),
            snaplen: field(16),
            linktype: field(20),
        })
    }
}


/// Pcap record header, the 16 bytes preceding each captured frame.
#[derive(Copy, Clone, Default, Debug, Eq, PartialEq)]
pub struct RecordHeader {
    /// Timestamp seconds
    pub ts_sec: u32,
    /// Microsecond part of the timestamp
    pub ts_usec: u32,
    /// Number of bytes of the frame saved in the file
    pub incl_len: u32,
    /// Length of the frame on the wire
    pub orig_len: u32,
}

impl RecordHeader {
    /// Parses a record header.
    pub fn from_bytes(bytes: &[u8; RECORD_HEADER_LEN]) -> RecordHeader {
        let field = |offset| read_le32(bytes, offset).unwrap_or_default();

        RecordHeader {
            ts_sec: field(0),
            ts_usec: field(4),
            incl_len: field(8),
            orig_len: field(12),
        }
    }

    /// Timestamp of the record in milliseconds, the microseconds being truncated.
    pub fn timestamp_millis(&self) -> u64 {
        u64::from(self.ts_sec) * 1000 + u64::from(self.ts_usec) / 1000
    }

    /// Number of bytes of the frame saved in the file.
    pub fn captured_len(&self) -> usize {
        self.incl_len as usize
    }
}


/// One undecoded record of a capture.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawRecord {
    /// Header the record was read with
    pub header: RecordHeader,
    /// Frame bytes, `header.incl_len` long
    pub data: Vec<u8>,
}

impl RawRecord {
    /// Timestamp of the record in milliseconds.
    pub fn timestamp_millis(&self) -> u64 {
        self.header.timestamp_millis()
    }
}
