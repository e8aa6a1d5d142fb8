use std::io::{ErrorKind, Read, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::buffer::MessageBuffer;
use crate::error::{Result, TransportError};
use crate::traits::ByteTransport;

/// Adapts any blocking `Read` / `Write` pair into a [`ByteTransport`].
///
/// Reads and writes are exact: partial transfers are continued until the
/// requested count is reached, and an end-of-stream before then is reported
/// as [`TransportError::Closed`]. Each half sits behind its own lock, so a
/// read and a write may proceed at the same time.
pub struct StreamTransport<R, W> {
    reader: Mutex<R>,
    writer: Mutex<W>,
}

impl<R: Read, W: Write> StreamTransport<R, W> {
    /// Create a transport from separate read and write halves.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
        }
    }

    /// Consume the transport and return both halves.
    pub fn into_inner(self) -> (R, W) {
        (
            self.reader.into_inner().unwrap_or_else(PoisonError::into_inner),
            self.writer.into_inner().unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Lock and borrow the read half.
    pub fn reader(&self) -> MutexGuard<'_, R> {
        self.reader.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock and borrow the write half.
    pub fn writer(&self) -> MutexGuard<'_, W> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R, W> ByteTransport for StreamTransport<R, W>
where
    R: Read + Send,
    W: Write + Send,
{
    fn read(&self, buf: &mut MessageBuffer, count: usize, offset: usize) -> Result<()> {
        let dst = buf.range_mut(offset, count)?;
        read_exact(&mut *self.reader(), dst)?;
        trace!(count, offset, "stream read");
        buf.set_used(offset + count)
    }

    fn write(&self, buf: &MessageBuffer, count: usize, offset: usize) -> Result<()> {
        let src = buf.range(offset, count)?;
        let mut writer = self.writer();
        write_all(&mut *writer, src)?;
        flush(&mut *writer)?;
        trace!(count, offset, "stream write");
        Ok(())
    }
}

impl<R, W> std::fmt::Debug for StreamTransport<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamTransport").finish_non_exhaustive()
    }
}

fn read_exact<R: Read + ?Sized>(reader: &mut R, mut dst: &mut [u8]) -> Result<()> {
    while !dst.is_empty() {
        match reader.read(dst) {
            Ok(0) => return Err(TransportError::Closed),
            Ok(n) => dst = &mut dst[n..],
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(TransportError::Io(err)),
        }
    }
    Ok(())
}

fn write_all<W: Write + ?Sized>(writer: &mut W, mut src: &[u8]) -> Result<()> {
    while !src.is_empty() {
        match writer.write(src) {
            Ok(0) => return Err(TransportError::Closed),
            Ok(n) => src = &src[n..],
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(TransportError::Io(err)),
        }
    }
    Ok(())
}

fn flush<W: Write + ?Sized>(writer: &mut W) -> Result<()> {
    loop {
        match writer.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(TransportError::Io(err)),
        }
    }
}
