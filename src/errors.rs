use std::path::PathBuf;

use thiserror::Error;

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;


/* ----- enum CaptureError ----- */

/// Errors that can occur while opening or reading a capture.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The capture file could not be opened.
    #[error("Failed to open {}", path.display())]
    OpenFailed {
        /// Path given by the caller
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The global header is not the one of a classic capture file.
    #[error("Unrecognized capture format, magic number: {0:#X}")]
    UnrecognizedFormat(u32),
    /// The global header ended before its 24 bytes could be read.
    /// # Fields
    /// - 0: number of bytes actually read
    #[error("Global header too short: need 24B, got {0}B")]
    IncompleteHeader(usize),
    /// A record header was read but its payload is shorter than announced.
    #[error("Truncated capture: record needs {needed}B, got {available}B")]
    TruncatedCapture {
        /// Captured length announced by the record header
        needed: usize,
        /// Bytes available before the end of the file
        available: usize,
    },
    /// An I/O error occurred while reading the capture.
    #[error("I/O error while reading the capture")]
    ReadFailed(#[source] std::io::Error),
    /// The session was closed, no further reads are possible.
    #[error("The capture session is closed")]
    SessionClosed,
}


/* ----- enum FillError ----- */

/// Errors returned by [`ByteCursor::fill`](crate::ByteCursor::fill).
#[derive(Debug, Error)]
pub enum FillError {
    /// The source was exhausted before the buffer was full.
    /// # Fields
    /// - requested: size of the destination buffer
    /// - read: number of bytes actually copied into it
    #[error("Short read: requested {requested}B, read {read}B")]
    ShortRead {
        /// Size of the destination buffer
        requested: usize,
        /// Number of bytes read before the source ran out
        read: usize,
    },
    /// The underlying source failed.
    #[error("I/O error while filling the buffer")]
    Io(#[source] std::io::Error),
}

impl FillError {
    /// Returns the number of bytes that were read before the error, if it is a short read.
    pub fn bytes_read(&self) -> Option<usize> {
        match self {
            FillError::ShortRead { read, .. } => Some(*read),
            FillError::Io(_) => None,
        }
    }
}


/* ----- enum AddressError ----- */

/// Errors that can occur while building an address from raw bytes or text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The slice doesn't have the length of the address.
    /// # Fields
    /// - expected: length of the address
    /// - actual: length of the slice
    #[error("Invalid address length: expected {expected}B, got {actual}B")]
    InvalidLength {
        /// Length of the address
        expected: usize,
        /// Length of the slice given
        actual: usize,
    },
    /// A textual MAC address couldn't be parsed.
    #[error("Invalid MAC address: {0:?}")]
    InvalidMac(String),
}


/* ----- enum GeneratorError ----- */

/// Errors that can occur while configuring the traffic generator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    /// The anomalous traffic percentage must be in 0..=100.
    #[error("Anomalous traffic percentage out of range: {0} > 100")]
    PercentageOutOfRange(u8),
    /// A pattern list used to craft anomalies is empty.
    #[error("Empty pattern list: {0}")]
    EmptyList(&'static str),
}
