use std::io;

use byteorder::{ByteOrder, LittleEndian};

use super::{read_exact, write_all, Stream, StreamId};

const SCRATCH_CAPACITY: usize = 256;

/// A pre-allocated reader bound to one stream.
///
/// Callers that decode many units from the same stream pass one of these in
/// to avoid a per-call scratch allocation. The binding is part of the
/// contract: the requirements engine rejects a reader whose recorded stream
/// id differs from the stream the call supplies.
pub struct ReusableReader {
    bound_to: StreamId,
    scratch:  Vec<u8>,
}

impl ReusableReader {
    pub fn bind(stream: &dyn Stream) -> ReusableReader {
        ReusableReader {
            bound_to: stream.id(),
            scratch:  Vec::with_capacity(SCRATCH_CAPACITY),
        }
    }

    pub fn bound_to(&self) -> StreamId {
        self.bound_to
    }

    pub fn is_bound_to(&self, stream: &dyn Stream) -> bool {
        self.bound_to == stream.id()
    }

    /// Re-targets this reader at another stream, discarding scratch state.
    pub fn rebind(&mut self, stream: &dyn Stream) {
        self.bound_to = stream.id();
        self.scratch.clear();
    }

    pub fn read_u8(&mut self, stream: &mut dyn Stream) -> io::Result<u8> {
        debug_assert_eq!(self.bound_to, stream.id());
        let mut buf = [0u8; 1];
        read_exact(stream, &mut buf)?;
        Ok(buf[0])
    }

    pub fn read_u32(&mut self, stream: &mut dyn Stream) -> io::Result<u32> {
        debug_assert_eq!(self.bound_to, stream.id());
        let mut buf = [0u8; 4];
        read_exact(stream, &mut buf)?;
        Ok(LittleEndian::read_u32(&buf))
    }

    pub fn read_u64(&mut self, stream: &mut dyn Stream) -> io::Result<u64> {
        debug_assert_eq!(self.bound_to, stream.id());
        let mut buf = [0u8; 8];
        read_exact(stream, &mut buf)?;
        Ok(LittleEndian::read_u64(&buf))
    }

    pub fn read_exact(&mut self, stream: &mut dyn Stream, buf: &mut [u8]) -> io::Result<()> {
        debug_assert_eq!(self.bound_to, stream.id());
        read_exact(stream, buf)
    }

    /// Reads a zero-terminated string of at most `max_len` bytes (terminator
    /// included), reusing the internal scratch buffer for the byte scan.
    pub fn read_cstring(&mut self, stream: &mut dyn Stream, max_len: usize) -> io::Result<String> {
        debug_assert_eq!(self.bound_to, stream.id());
        self.scratch.clear();
        for _ in 0..max_len {
            let mut byte = [0u8; 1];
            read_exact(stream, &mut byte)?;
            if byte[0] == 0 {
                return match std::str::from_utf8(&self.scratch) {
                    Ok(text) => Ok(text.to_owned()),
                    Err(err) => Err(io::Error::new(io::ErrorKind::InvalidData, err)),
                };
            }
            self.scratch.push(byte[0]);
        }
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "string terminator not found within the length limit",
        ))
    }
}

/// A pre-allocated writer bound to one stream; counterpart of
/// [`ReusableReader`].
pub struct ReusableWriter {
    bound_to: StreamId,
    scratch:  Vec<u8>,
}

impl ReusableWriter {
    pub fn bind(stream: &dyn Stream) -> ReusableWriter {
        ReusableWriter {
            bound_to: stream.id(),
            scratch:  Vec::with_capacity(SCRATCH_CAPACITY),
        }
    }

    pub fn bound_to(&self) -> StreamId {
        self.bound_to
    }

    pub fn is_bound_to(&self, stream: &dyn Stream) -> bool {
        self.bound_to == stream.id()
    }

    pub fn rebind(&mut self, stream: &dyn Stream) {
        self.bound_to = stream.id();
        self.scratch.clear();
    }

    pub fn write_u8(&mut self, stream: &mut dyn Stream, value: u8) -> io::Result<()> {
        debug_assert_eq!(self.bound_to, stream.id());
        write_all(stream, &[value])
    }

    pub fn write_u32(&mut self, stream: &mut dyn Stream, value: u32) -> io::Result<()> {
        debug_assert_eq!(self.bound_to, stream.id());
        let mut buf = [0u8; 4];
        LittleEndian::write_u32(&mut buf, value);
        write_all(stream, &buf)
    }

    pub fn write_u64(&mut self, stream: &mut dyn Stream, value: u64) -> io::Result<()> {
        debug_assert_eq!(self.bound_to, stream.id());
        let mut buf = [0u8; 8];
        LittleEndian::write_u64(&mut buf, value);
        write_all(stream, &buf)
    }

    pub fn write_all(&mut self, stream: &mut dyn Stream, buf: &[u8]) -> io::Result<()> {
        debug_assert_eq!(self.bound_to, stream.id());
        write_all(stream, buf)
    }

    /// Writes `text` followed by a zero terminator as a single transfer,
    /// assembled in the internal scratch buffer.
    pub fn write_cstring(&mut self, stream: &mut dyn Stream, text: &str) -> io::Result<()> {
        debug_assert_eq!(self.bound_to, stream.id());
        if text.as_bytes().contains(&0) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "string carries an embedded terminator",
            ));
        }
        self.scratch.clear();
        self.scratch.extend_from_slice(text.as_bytes());
        self.scratch.push(0);
        write_all(stream, &self.scratch)
    }
}
