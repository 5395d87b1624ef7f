use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, info, warn};

use crate::cursor::ByteCursor;
use crate::errors::*;
use crate::packet::{decode_packet, Packet};
use crate::pcap::{GlobalHeader, RawRecord, RecordHeader, GLOBAL_HEADER_LEN, RECORD_HEADER_LEN};
use crate::proto::{offsets, OffsetTable};

/// Records are read in chunks of this size so a corrupt length can't trigger a huge allocation.
const RECORD_CHUNK_LEN: usize = 64 * 1024;


/// Settings of a capture session.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CaptureConfig {
    /// Every frame of the capture carries an 802.1Q tag
    pub vlan_tag_present: bool,
    /// Log the raw headers and records as uppercase hex
    pub verbose: bool,
}

impl CaptureConfig {
    pub fn with_vlan_tag(mut self, vlan_tag_present: bool) -> Self {
        self.vlan_tag_present = vlan_tag_present;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Header offsets of the frames of this capture.
    pub fn offsets(&self) -> OffsetTable {
        offsets(self.vlan_tag_present)
    }
}


/// Reads a capture one record at a time and decodes each of them into a [`Packet`].
///
/// The session is open from [`CaptureReader::new`] (or [`CaptureReader::open`]) until
/// [`CaptureReader::close`] or drop. The first record header that can't be read completely ends
/// the stream: [`read_next`](CaptureReader::read_next) then keeps returning `Ok(None)`.
///
/// # Examples
///
/// ```rust,no_run
/// use pcap_decode::{CaptureConfig, CaptureReader, Packet};
///
/// let mut reader = CaptureReader::open("test.pcap", CaptureConfig::default()).unwrap();
///
/// while let Some(packet) = reader.read_next().unwrap() {
///     if let Packet::Tcp(tcp) = packet {
///         println!("{tcp}");
///     }
/// }
///
/// reader.close();
/// ```
#[derive(Debug)]
pub struct CaptureReader<R: Read> {
    cursor: Option<ByteCursor<R>>,
    header: GlobalHeader,
    config: CaptureConfig,
    records_read: u64,
    finished: bool,
}

impl CaptureReader<File> {
    /// Opens the capture file at `path` and validates its global header.
    ///
    /// # Errors
    /// [`CaptureError::OpenFailed`] if the file can't be opened,
    /// [`CaptureError::UnrecognizedFormat`] if it isn't a capture file.
    pub fn open<P: AsRef<Path>>(path: P, config: CaptureConfig) -> CaptureResult<CaptureReader<File>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CaptureError::OpenFailed { path: path.to_owned(), source })?;

        debug!("Opened capture {}", path.display());
        CaptureReader::new(file, config)
    }
}

impl<R: Read> CaptureReader<R> {
    /// Creates a new `CaptureReader` from an existing reader.
    /// This function reads the global header and verifies its magic number.
    pub fn new(reader: R, config: CaptureConfig) -> CaptureResult<CaptureReader<R>> {
        let mut cursor = ByteCursor::new(reader);

        let mut bytes = [0_u8; GLOBAL_HEADER_LEN];
        cursor.fill(&mut bytes).map_err(|e| match e {
            FillError::ShortRead { read, .. } => CaptureError::IncompleteHeader(read),
            FillError::Io(e) => CaptureError::ReadFailed(e),
        })?;

        if config.verbose {
            info!("------------------------  Global Header ------------------------");
            info!("{}", hex::encode_upper(bytes));
        }

        let header = GlobalHeader::from_bytes(&bytes)?;
        debug!(
            "Capture version {}.{}, snaplen {}, linktype {}",
            header.version_major, header.version_minor, header.snaplen, header.linktype
        );

        Ok(CaptureReader {
            cursor: Some(cursor),
            header,
            config,
            records_read: 0,
            finished: false,
        })
    }

    /// Reads and decodes the next record.
    ///
    /// Returns `Ok(None)` once the end of the capture is reached.
    ///
    /// # Errors
    /// [`CaptureError::TruncatedCapture`] if the record is shorter than its header says,
    /// [`CaptureError::ReadFailed`] on I/O errors and [`CaptureError::SessionClosed`] after
    /// [`close`](CaptureReader::close).
    pub fn read_next(&mut self) -> CaptureResult<Option<Packet<'static>>> {
        let record = match self.read_raw()? {
            Some(record) => record,
            None => return Ok(None),
        };

        let packet = decode_packet(&record.data, record.timestamp_millis(), &self.offsets());
        Ok(Some(packet.into_owned()))
    }

    /// Reads the next record without decoding it.
    pub fn read_raw(&mut self) -> CaptureResult<Option<RawRecord>> {
        let header = match self.read_record_header()? {
            Some(header) => header,
            None => return Ok(None),
        };

        let verbose = self.config.verbose;
        let cursor = self.cursor.as_mut().ok_or(CaptureError::SessionClosed)?;

        let data = match read_record_data(cursor, header.captured_len()) {
            Ok(data) => data,
            Err(e) => {
                self.finished = true;
                return Err(e);
            },
        };

        if verbose {
            info!("----------------------  Packet ----------------------");
            info!("{}", hex::encode_upper(&data));
        }

        self.records_read += 1;
        Ok(Some(RawRecord { header, data }))
    }

    fn read_record_header(&mut self) -> CaptureResult<Option<RecordHeader>> {
        let cursor = self.cursor.as_mut().ok_or(CaptureError::SessionClosed)?;
        if self.finished {
            return Ok(None);
        }

        let mut bytes = [0_u8; RECORD_HEADER_LEN];
        match cursor.fill(&mut bytes) {
            Ok(()) => {},
            Err(FillError::ShortRead { read, .. }) => {
                if read > 0 {
                    debug!("Ignoring {read} trailing bytes at offset {}", cursor.offset() - read as u64);
                }
                debug!("End of capture after {} records", self.records_read);
                self.finished = true;
                return Ok(None);
            },
            Err(FillError::Io(e)) => return Err(CaptureError::ReadFailed(e)),
        }

        if self.config.verbose {
            info!("---------------------- PCAP Packet Header ----------------------");
            info!("{}", hex::encode_upper(bytes));
        }

        Ok(Some(RecordHeader::from_bytes(&bytes)))
    }

    /// Releases the underlying reader.
    ///
    /// Closing an already closed session does nothing.
    pub fn close(&mut self) {
        match self.cursor.take() {
            Some(cursor) => {
                debug!("Closing capture after {} bytes and {} records", cursor.offset(), self.records_read);
                drop(cursor.into_inner());
            },
            None => debug!("Capture already closed"),
        }
    }

    /// Sets whether the frames carry an 802.1Q tag.
    ///
    /// The setting applies to the whole capture and should be chosen before reading starts.
    pub fn set_vlan_tag_present(&mut self, vlan_tag_present: bool) {
        if self.records_read > 0 && self.config.vlan_tag_present != vlan_tag_present {
            warn!("VLAN tag setting changed after {} records were read", self.records_read);
        }
        self.config.vlan_tag_present = vlan_tag_present;
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.config.verbose = verbose;
    }

    /// Header offsets derived from the current VLAN setting.
    pub fn offsets(&self) -> OffsetTable {
        self.config.offsets()
    }

    pub fn config(&self) -> CaptureConfig {
        self.config
    }

    /// Returns the global header of the capture.
    pub fn header(&self) -> GlobalHeader {
        self.header
    }

    /// Number of bytes consumed so far, `None` once closed.
    pub fn offset(&self) -> Option<u64> {
        self.cursor.as_ref().map(ByteCursor::offset)
    }

    pub fn is_open(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn records_read(&self) -> u64 {
        self.records_read
    }
}

impl<R: Read> Iterator for CaptureReader<R> {
    type Item = CaptureResult<Packet<'static>>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.is_open() {
            return None;
        }

        match self.read_next() {
            Ok(packet) => packet.map(Ok),
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            },
        }
    }
}

fn read_record_data<R: Read>(cursor: &mut ByteCursor<R>, len: usize) -> CaptureResult<Vec<u8>> {
    let mut data = Vec::with_capacity(len.min(RECORD_CHUNK_LEN));

    while data.len() < len {
        let start = data.len();
        data.resize(len.min(start + RECORD_CHUNK_LEN), 0);

        cursor.fill(&mut data[start..]).map_err(|e| match e {
            FillError::ShortRead { read, .. } => CaptureError::TruncatedCapture { needed: len, available: start + read },
            FillError::Io(e) => CaptureError::ReadFailed(e),
        })?;
    }

    Ok(data)
}
