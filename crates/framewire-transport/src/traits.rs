use std::sync::Arc;

use crate::buffer::MessageBuffer;
use crate::error::Result;

/// A blocking duplex byte channel with no message-boundary awareness.
///
/// Both primitives take `&self`: one transport handle is shared by every
/// send and receive issued over it, so implementations keep whatever
/// interior locking a single primitive call needs. Ordering *across* calls
/// is the caller's business.
pub trait ByteTransport: Send + Sync {
    /// Read `count` bytes into `buf` at `offset`, blocking until they arrive.
    ///
    /// On success `buf.used()` is `offset + count`. Single-shot transports may
    /// deliver more than `count` bytes and report a larger `used`. Allocating
    /// transports may attach storage to an unallocated buffer.
    fn read(&self, buf: &mut MessageBuffer, count: usize, offset: usize) -> Result<()>;

    /// Write `count` bytes of `buf` starting at `offset`, blocking until all
    /// of them are handed to the channel.
    fn write(&self, buf: &MessageBuffer, count: usize, offset: usize) -> Result<()>;
}

impl<T: ByteTransport + ?Sized> ByteTransport for &T {
    fn read(&self, buf: &mut MessageBuffer, count: usize, offset: usize) -> Result<()> {
        (**self).read(buf, count, offset)
    }

    fn write(&self, buf: &MessageBuffer, count: usize, offset: usize) -> Result<()> {
        (**self).write(buf, count, offset)
    }
}

impl<T: ByteTransport + ?Sized> ByteTransport for Arc<T> {
    fn read(&self, buf: &mut MessageBuffer, count: usize, offset: usize) -> Result<()> {
        (**self).read(buf, count, offset)
    }

    fn write(&self, buf: &MessageBuffer, count: usize, offset: usize) -> Result<()> {
        (**self).write(buf, count, offset)
    }
}

impl<T: ByteTransport + ?Sized> ByteTransport for Box<T> {
    fn read(&self, buf: &mut MessageBuffer, count: usize, offset: usize) -> Result<()> {
        (**self).read(buf, count, offset)
    }

    fn write(&self, buf: &MessageBuffer, count: usize, offset: usize) -> Result<()> {
        (**self).write(buf, count, offset)
    }
}
