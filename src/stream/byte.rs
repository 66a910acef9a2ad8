use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

use super::{Stream, StreamId};

/// In-memory reference stream.
///
/// Every capability can be gated independently of the backing buffer, so a
/// caller can hand a unit a stream that genuinely refuses to read, write or
/// seek and exercise the corresponding requirement checks.
#[derive(Debug)]
pub struct ByteStream {
    id:       StreamId,
    cursor:   Cursor<Vec<u8>>,
    readable: bool,
    writable: bool,
    seekable: bool,
}

impl ByteStream {
    /// An empty stream with every capability.
    pub fn new() -> ByteStream {
        ByteStream::with_capabilities(Vec::new(), true, true, true)
    }

    /// A fully-capable stream positioned at the start of `bytes`.
    pub fn from_bytes(bytes: Vec<u8>) -> ByteStream {
        ByteStream::with_capabilities(bytes, true, true, true)
    }

    /// A stream over `bytes` that refuses writes.
    pub fn read_only(bytes: Vec<u8>) -> ByteStream {
        ByteStream::with_capabilities(bytes, true, false, true)
    }

    /// An empty stream that refuses reads.
    pub fn write_only() -> ByteStream {
        ByteStream::with_capabilities(Vec::new(), false, true, true)
    }

    /// Removes the seek capability, leaving the rest untouched.
    pub fn deny_seek(mut self) -> ByteStream {
        self.seekable = false;
        self
    }

    fn with_capabilities(bytes: Vec<u8>, readable: bool, writable: bool, seekable: bool) -> ByteStream {
        ByteStream {
            id: StreamId::fresh(),
            cursor: Cursor::new(bytes),
            readable,
            writable,
            seekable,
        }
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn bytes(&self) -> &[u8] {
        self.cursor.get_ref()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.cursor.into_inner()
    }
}

impl Default for ByteStream {
    fn default() -> ByteStream {
        ByteStream::new()
    }
}

fn unsupported(what: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("this stream does not support {what}"),
    )
}

impl Stream for ByteStream {
    fn id(&self) -> StreamId {
        self.id
    }

    fn can_read(&self) -> bool {
        self.readable
    }

    fn can_write(&self) -> bool {
        self.writable
    }

    fn can_seek(&self) -> bool {
        self.seekable
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.readable {
            return Err(unsupported("reading"));
        }
        self.cursor.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.writable {
            return Err(unsupported("writing"));
        }
        self.cursor.write(buf)
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        if !self.seekable {
            return Err(unsupported("seeking"));
        }
        self.cursor.seek(pos)
    }
}
