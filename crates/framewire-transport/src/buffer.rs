use bytes::{Bytes, BytesMut};

use crate::error::{Result, TransportError};

/// A fixed-capacity byte container shared between a caller and a transport.
///
/// The buffer tracks two lengths:
/// - `capacity`: total bytes available, header space included
/// - `used`: bytes logically occupied, set by the caller before a send and by
///   the transport during a receive
///
/// Storage may be absent. Transports that hand out their own receive buffers
/// attach storage during the read; every other transport rejects such a buffer.
/// Nothing in the framing layer ever grows or shrinks the storage.
#[derive(Debug, Default)]
pub struct MessageBuffer {
    storage: Option<BytesMut>,
    used: usize,
}

impl MessageBuffer {
    /// Allocate a zeroed buffer of `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Some(BytesMut::zeroed(capacity)),
            used: 0,
        }
    }

    /// A buffer with no storage, to be filled in by an allocating transport.
    pub fn unallocated() -> Self {
        Self::default()
    }

    /// Wrap existing storage. The capacity is the storage's current length.
    pub fn from_storage(storage: BytesMut) -> Self {
        Self {
            storage: Some(storage),
            used: 0,
        }
    }

    /// Whether the buffer has storage attached.
    pub fn is_allocated(&self) -> bool {
        self.storage.is_some()
    }

    /// Total bytes available, including header space.
    pub fn capacity(&self) -> usize {
        self.storage.as_ref().map_or(0, |s| s.len())
    }

    /// Bytes logically occupied.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Record how many bytes are occupied. Must not exceed the capacity.
    pub fn set_used(&mut self, used: usize) -> Result<()> {
        let capacity = self.capacity();
        if used > capacity {
            return Err(TransportError::OutOfBounds {
                offset: 0,
                count: used,
                capacity,
            });
        }
        self.used = used;
        Ok(())
    }

    /// Replace the storage (transport-side allocation). Resets `used`.
    pub fn attach(&mut self, storage: BytesMut) {
        self.storage = Some(storage);
        self.used = 0;
    }

    /// Forget the occupied bytes, keeping the storage.
    pub fn clear(&mut self) {
        self.used = 0;
    }

    /// The whole storage, regardless of `used`.
    pub fn as_slice(&self) -> &[u8] {
        match self.storage.as_deref() {
            Some(storage) => storage,
            None => &[],
        }
    }

    /// The whole storage, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match self.storage.as_deref_mut() {
            Some(storage) => storage,
            None => &mut [],
        }
    }

    /// The occupied prefix of the storage.
    pub fn used_bytes(&self) -> &[u8] {
        &self.as_slice()[..self.used]
    }

    /// The occupied bytes following a `header_size` prefix.
    pub fn payload(&self, header_size: usize) -> &[u8] {
        self.used_bytes().get(header_size..).unwrap_or(&[])
    }

    /// Copy of the occupied bytes.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.used_bytes())
    }

    /// Copy `payload` in right after a reserved `header_size` prefix and mark
    /// header plus payload as used.
    pub fn write_payload(&mut self, header_size: usize, payload: &[u8]) -> Result<()> {
        self.range_mut(header_size, payload.len())?
            .copy_from_slice(payload);
        self.used = header_size + payload.len();
        Ok(())
    }

    /// Checked view of `count` bytes starting at `offset`.
    pub fn range(&self, offset: usize, count: usize) -> Result<&[u8]> {
        let end = self.checked_end(offset, count)?;
        Ok(&self.as_slice()[offset..end])
    }

    /// Checked mutable view of `count` bytes starting at `offset`.
    pub fn range_mut(&mut self, offset: usize, count: usize) -> Result<&mut [u8]> {
        let end = self.checked_end(offset, count)?;
        Ok(&mut self.as_mut_slice()[offset..end])
    }

    fn checked_end(&self, offset: usize, count: usize) -> Result<usize> {
        if !self.is_allocated() {
            return Err(TransportError::Unallocated);
        }
        let capacity = self.capacity();
        match offset.checked_add(count) {
            Some(end) if end <= capacity => Ok(end),
            _ => Err(TransportError::OutOfBounds {
                offset,
                count,
                capacity,
            }),
        }
    }
}
