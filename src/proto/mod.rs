//! Link, network and transport layer field extractors.
//!
//! Every extractor is a pure function over the raw frame (or the part of it starting at the
//! protocol header) and returns `None` instead of reading out of bounds.

pub mod ethernet;
pub mod ipv4;
pub mod link;
pub mod tcp;
pub mod udp;

pub use ethernet::MacAddr;
pub use link::{classify, offsets, FrameClass, OffsetTable};
pub use tcp::TcpFlags;

/// Returns the bytes following the first `start` bytes of the frame, empty if there are none.
pub fn payload(frame: &[u8], start: usize) -> &[u8] {
    frame.get(start..).unwrap_or_default()
}
