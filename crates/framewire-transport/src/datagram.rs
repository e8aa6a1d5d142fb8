//! Single-shot delivery transport.
//!
//! Models channels such as RPMsg TTYs that hand back one whole logical
//! datagram per read: every write becomes one datagram, and every read
//! returns the next datagram in full no matter how many bytes were asked
//! for. When the caller's buffer arrives without storage, the transport
//! allocates a receive buffer of its configured capacity.
//!
//! A datagram that does not fit the caller's buffer is not consumed. The read
//! delivers only the `count` bytes asked for and the datagram stays queued. A
//! follow-up read at the offset just past that prefix continues the same
//! datagram and consumes it; any other read starts it over from its first byte.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::buffer::MessageBuffer;
use crate::error::{Result, TransportError};
use crate::traits::ByteTransport;

/// Default receive buffer size for unallocated buffers.
pub const DEFAULT_RECEIVE_CAPACITY: usize = 512;

#[derive(Default)]
struct Mailbox {
    datagrams: VecDeque<Bytes>,
    /// Prefix of the front datagram handed out by a read that did not fit.
    delivered: usize,
    closed: bool,
}

impl Mailbox {
    fn consume_front(&mut self) {
        self.datagrams.pop_front();
        self.delivered = 0;
    }
}

#[derive(Default)]
struct Shared {
    mailbox: Mutex<Mailbox>,
    ready: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Mailbox> {
        self.mailbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }
}

/// One end of a connected datagram channel.
pub struct DatagramTransport {
    inbound: Arc<Shared>,
    outbound: Arc<Shared>,
    receive_capacity: usize,
}

impl DatagramTransport {
    /// Create a connected pair using [`DEFAULT_RECEIVE_CAPACITY`].
    pub fn pair() -> (Self, Self) {
        Self::pair_with_capacity(DEFAULT_RECEIVE_CAPACITY)
    }

    /// Create a connected pair that allocates `receive_capacity` bytes for
    /// buffers arriving without storage.
    pub fn pair_with_capacity(receive_capacity: usize) -> (Self, Self) {
        let a_to_b = Arc::new(Shared::default());
        let b_to_a = Arc::new(Shared::default());
        (
            Self {
                inbound: Arc::clone(&b_to_a),
                outbound: Arc::clone(&a_to_b),
                receive_capacity,
            },
            Self {
                inbound: a_to_b,
                outbound: b_to_a,
                receive_capacity,
            },
        )
    }

    /// Stop sending. The peer drains queued datagrams, then sees `Closed`.
    pub fn close(&self) {
        self.outbound.close();
    }

    /// Datagrams written by the peer and not yet read.
    pub fn pending(&self) -> usize {
        self.inbound.lock().datagrams.len()
    }

    /// Size of buffers this transport allocates on receive.
    pub fn receive_capacity(&self) -> usize {
        self.receive_capacity
    }
}

impl ByteTransport for DatagramTransport {
    fn read(&self, buf: &mut MessageBuffer, count: usize, offset: usize) -> Result<()> {
        if !buf.is_allocated() {
            buf.attach(BytesMut::zeroed(self.receive_capacity));
        }

        let mut mailbox = self.inbound.lock();
        let datagram = loop {
            if let Some(datagram) = mailbox.datagrams.front() {
                break datagram.clone();
            }
            if mailbox.closed {
                return Err(TransportError::Closed);
            }
            mailbox = self
                .inbound
                .ready
                .wait(mailbox)
                .unwrap_or_else(PoisonError::into_inner);
        };

        let resumed = mailbox.delivered;
        let (start, len, consumed) = if resumed > 0 && offset == resumed {
            (resumed, count.min(datagram.len() - resumed), true)
        } else if offset + datagram.len() <= buf.capacity() {
            (0, datagram.len(), true)
        } else {
            (0, count.min(datagram.len()), false)
        };

        buf.range_mut(offset, len)?
            .copy_from_slice(&datagram[start..start + len]);
        if consumed {
            mailbox.consume_front();
        } else {
            mailbox.delivered = len;
        }
        drop(mailbox);

        trace!(
            requested = count,
            delivered = len,
            datagram = datagram.len(),
            offset,
            consumed,
            "datagram read"
        );
        buf.set_used(offset + len)
    }

    fn write(&self, buf: &MessageBuffer, count: usize, offset: usize) -> Result<()> {
        let datagram = Bytes::copy_from_slice(buf.range(offset, count)?);

        let mut mailbox = self.outbound.lock();
        if mailbox.closed {
            return Err(TransportError::Closed);
        }
        mailbox.datagrams.push_back(datagram);
        drop(mailbox);
        self.outbound.ready.notify_all();

        trace!(count, offset, "datagram write");
        Ok(())
    }
}

impl Drop for DatagramTransport {
    fn drop(&mut self) {
        self.outbound.close();
    }
}

impl std::fmt::Debug for DatagramTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatagramTransport")
            .field("receive_capacity", &self.receive_capacity)
            .field("pending", &self.pending())
            .finish()
    }
}
