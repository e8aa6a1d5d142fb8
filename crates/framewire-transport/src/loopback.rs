//! In-memory byte pipe.
//!
//! [`pipe`] returns two connected endpoints. Bytes written on one become
//! readable on the other, in order, with blocking reads. Dropping or closing
//! an endpoint wakes a blocked reader on the peer, which then reports
//! [`TransportError::Closed`] once the buffered bytes run out.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::buffer::MessageBuffer;
use crate::error::{Result, TransportError};
use crate::traits::ByteTransport;

#[derive(Default)]
struct Queue {
    bytes: VecDeque<u8>,
    closed: bool,
}

#[derive(Default)]
struct Shared {
    queue: Mutex<Queue>,
    ready: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }
}

/// One end of an in-memory byte pipe.
pub struct LoopbackTransport {
    inbound: Arc<Shared>,
    outbound: Arc<Shared>,
}

/// Create a connected pair of loopback endpoints.
pub fn pipe() -> (LoopbackTransport, LoopbackTransport) {
    let a_to_b = Arc::new(Shared::default());
    let b_to_a = Arc::new(Shared::default());
    (
        LoopbackTransport {
            inbound: Arc::clone(&b_to_a),
            outbound: Arc::clone(&a_to_b),
        },
        LoopbackTransport {
            inbound: a_to_b,
            outbound: b_to_a,
        },
    )
}

impl LoopbackTransport {
    /// Stop sending. The peer drains what is buffered, then sees `Closed`.
    pub fn close(&self) {
        self.outbound.close();
    }

    /// Bytes written by the peer and not yet read.
    pub fn pending(&self) -> usize {
        self.inbound.lock().bytes.len()
    }
}

impl ByteTransport for LoopbackTransport {
    fn read(&self, buf: &mut MessageBuffer, count: usize, offset: usize) -> Result<()> {
        let dst = buf.range_mut(offset, count)?;

        let mut queue = self.inbound.lock();
        while queue.bytes.len() < count && !queue.closed {
            queue = self
                .inbound
                .ready
                .wait(queue)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if queue.bytes.len() < count {
            return Err(TransportError::Closed);
        }
        for (slot, byte) in dst.iter_mut().zip(queue.bytes.drain(..count)) {
            *slot = byte;
        }
        drop(queue);

        trace!(count, offset, "loopback read");
        buf.set_used(offset + count)
    }

    fn write(&self, buf: &MessageBuffer, count: usize, offset: usize) -> Result<()> {
        let src = buf.range(offset, count)?;

        let mut queue = self.outbound.lock();
        if queue.closed {
            return Err(TransportError::Closed);
        }
        queue.bytes.extend(src);
        drop(queue);
        self.outbound.ready.notify_all();

        trace!(count, offset, "loopback write");
        Ok(())
    }
}

impl Drop for LoopbackTransport {
    fn drop(&mut self) {
        self.outbound.close();
    }
}

impl std::fmt::Debug for LoopbackTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopbackTransport")
            .field("pending", &self.pending())
            .finish()
    }
}
