use std::io::{ErrorKind, Read, Seek, SeekFrom};

use crate::errors::FillError;


/// Sequential reader over a byte source that keeps track of how many bytes were consumed.
///
/// There is no read-ahead: each call to [`fill`](ByteCursor::fill) reads at most the length of the
/// destination buffer from the source.
#[derive(Debug)]
pub struct ByteCursor<R: Read> {
    inner: R,
    offset: u64,
}

impl<R: Read> ByteCursor<R> {
    /// Creates a new cursor positioned at the start of `inner`.
    pub fn new(inner: R) -> ByteCursor<R> {
        ByteCursor { inner, offset: 0 }
    }

    /// Fills `buf` completely from the source.
    ///
    /// On a partial fill the offset is still advanced by the number of bytes read and
    /// [`FillError::ShortRead`] is returned.
    pub fn fill(&mut self, buf: &mut [u8]) -> Result<(), FillError> {
        let mut read = 0;

        while read < buf.len() {
            match self.inner.read(&mut buf[read..]) {
                Ok(0) => break,
                Ok(n) => {
                    read += n;
                    self.offset += n as u64;
                },
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(FillError::Io(e)),
            }
        }

        if read != buf.len() {
            return Err(FillError::ShortRead { requested: buf.len(), read });
        }

        Ok(())
    }

    /// Number of bytes consumed from the source so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Consumes the cursor, returning the wrapped source.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> ByteCursor<R> {
    /// Repositions the source at `offset` bytes from its start.
    pub fn seek_to(&mut self, offset: u64) -> std::io::Result<()> {
        self.offset = self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }
}
