pub mod byte;   pub use byte::*;
pub mod reuse;  pub use reuse::*;

use std::fmt;
use std::io::{self, SeekFrom};
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique identity of a stream.
///
/// Reusable readers and writers record the id of the stream they were bound
/// to; the requirements engine compares ids to reject a reader handed in
/// alongside a different stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(u64);

impl StreamId {
    /// Mints an id no live stream has used yet.
    pub fn fresh() -> StreamId {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        StreamId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The stream collaborator the serialization contract operates on.
///
/// Capability queries are separate from the transfer operations so the
/// requirements engine can vet a call before any byte moves; a transfer on a
/// stream lacking the capability fails with [`io::ErrorKind::Unsupported`].
pub trait Stream {
    fn id(&self) -> StreamId;

    fn can_read(&self) -> bool;

    fn can_write(&self) -> bool;

    fn can_seek(&self) -> bool;

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64>;
}

/// Fills `buf` completely or fails with `UnexpectedEof`.
pub fn read_exact(stream: &mut dyn Stream, buf: &mut [u8]) -> io::Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..])? {
            0 => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "stream ended mid-value",
                ))
            }
            n => filled += n,
        }
    }
    Ok(())
}

/// Drains `buf` completely or fails with `WriteZero`.
pub fn write_all(stream: &mut dyn Stream, buf: &[u8]) -> io::Result<()> {
    let mut written = 0;
    while written < buf.len() {
        match stream.write(&buf[written..])? {
            0 => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "stream refused further bytes",
                ))
            }
            n => written += n,
        }
    }
    Ok(())
}
