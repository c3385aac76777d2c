//! Buffered sequential record reader.

use crate::codec::DecodeError;
use bytes::{Buf, BytesMut};
use std::io::{self, ErrorKind, Read};
use thiserror::Error;

const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The bytes at `offset` do not form a complete, valid record. This
    /// includes a record cut short by the end of the stream.
    #[error("Malformed record at offset {offset}: {source}")]
    Malformed { offset: u64, source: DecodeError },
}

/// Reads records one at a time from the start of a byte stream.
///
/// Bytes are pulled in fixed-size chunks and kept until a whole record can be
/// decoded from the front of the buffer, so records larger than a chunk are
/// handled by reading more before decoding again.
pub struct RecordReader<R> {
    reader: R,
    buf: BytesMut,
    offset: u64,
    eof: bool,
}

impl<R: Read> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: BytesMut::with_capacity(READ_CHUNK),
            offset: 0,
            eof: false,
        }
    }

    /// Byte offset of the next undecoded record.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Decodes the next record with `decode`.
    ///
    /// `decode` receives every buffered byte from the start of the record and
    /// returns the decoded item along with how many bytes it consumed.
    /// Returns `Ok(None)` at a clean end of stream.
    pub fn next_with<T, F>(&mut self, mut decode: F) -> Result<Option<T>, ReadError>
    where
        F: FnMut(&[u8]) -> Result<(T, usize), DecodeError>,
    {
        loop {
            if !self.buf.is_empty() {
                match decode(&self.buf[..]) {
                    Ok((item, size)) => {
                        self.buf.advance(size);
                        self.offset += size as u64;
                        return Ok(Some(item));
                    }
                    Err(DecodeError::Incomplete) if !self.eof => {}
                    Err(source) => {
                        return Err(ReadError::Malformed {
                            offset: self.offset,
                            source,
                        })
                    }
                }
            } else if self.eof {
                return Ok(None);
            }

            self.fill()?;
        }
    }

    fn fill(&mut self) -> io::Result<()> {
        let start = self.buf.len();
        self.buf.resize(start + READ_CHUNK, 0);
        loop {
            match self.reader.read(&mut self.buf[start..]) {
                Ok(n) => {
                    self.buf.truncate(start + n);
                    self.eof = n == 0;
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buf.truncate(start);
                    return Err(e);
                }
            }
        }
    }
}
