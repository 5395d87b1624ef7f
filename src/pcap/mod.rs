//! Contains the capture file headers and the reader

mod header;
mod reader;

pub use header::*;
pub use reader::*;

/// Magic number of a classic capture file, read as a little-endian u32.
pub const PCAP_MAGIC_NUMBER: u32 = 0xA1B2C3D4;

/// Size of the global header at the start of a capture file.
pub const GLOBAL_HEADER_LEN: usize = 24;

/// Size of the header preceding every record.
pub const RECORD_HEADER_LEN: usize = 16;
