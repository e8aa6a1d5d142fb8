use std::sync::{Mutex, PoisonError};

use bytes::Bytes;
use framewire_transport::{ByteTransport, MessageBuffer};
use tracing::{trace, warn};

use crate::codec::{FrameCodec, FrameConfig, LengthPrefixCodec, MAX_PAYLOAD};
use crate::error::{FrameError, Result};

/// Sends and receives length-prefixed frames over a [`ByteTransport`].
///
/// Callers build outgoing messages in a [`MessageBuffer`], leaving
/// [`reserve_header_size`](Self::reserve_header_size) bytes at the front for
/// the header. Received messages land in the caller's buffer with the header
/// still in place; the payload starts right after it.
///
/// `receive` is serialized by an internal lock held across both transport
/// reads, so concurrent receivers never split one frame between them.
/// `send` is not serialized here: a transport shared by concurrent senders
/// must make each single write atomic, as every transport in
/// `framewire-transport` does.
pub struct FramedChannel<T, C = LengthPrefixCodec> {
    transport: T,
    codec: C,
    config: FrameConfig,
    receive_lock: Mutex<()>,
}

impl<T: ByteTransport> FramedChannel<T> {
    /// Create a channel with the default (little-endian) length prefix.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, FrameConfig::default())
    }

    /// Create a channel whose length prefix uses `config.byte_order`.
    pub fn with_config(transport: T, config: FrameConfig) -> Self {
        let codec = LengthPrefixCodec::new(config.byte_order);
        Self {
            transport,
            codec,
            config,
            receive_lock: Mutex::new(()),
        }
    }
}

impl<T: ByteTransport, C: FrameCodec> FramedChannel<T, C> {
    /// Create a channel with an explicit codec.
    ///
    /// The stored config is the default one. Its `byte_order` describes only
    /// the built-in [`LengthPrefixCodec`]; the injected codec owns its wire
    /// layout.
    pub fn with_codec(transport: T, codec: C) -> Self {
        Self {
            transport,
            codec,
            config: FrameConfig::default(),
            receive_lock: Mutex::new(()),
        }
    }

    /// Bytes to leave in front of the payload when building a message.
    pub fn reserve_header_size(&self) -> usize {
        self.codec.header_size()
    }

    /// Send the message held in `buf`.
    ///
    /// `buf.used()` covers the reserved header plus the payload. The header is
    /// filled in here and the whole used region goes out in a single write.
    pub fn send(&self, buf: &mut MessageBuffer) -> Result<()> {
        let header_size = self.codec.header_size();
        let used = buf.used();
        if used < header_size {
            return Err(FrameError::BufferTooSmall {
                required: header_size,
                available: used,
            });
        }

        let payload_len = used - header_size;
        let len = u16::try_from(payload_len).map_err(|_| FrameError::PayloadTooLarge {
            size: payload_len,
            max: MAX_PAYLOAD,
        })?;

        self.codec
            .encode_header(len, buf.range_mut(0, header_size)?);
        self.transport.write(buf, used, 0)?;

        trace!(payload_len, "frame sent");
        Ok(())
    }

    /// Receive one frame into `buf`.
    ///
    /// `buf` may arrive without storage when the transport allocates on
    /// receive. On success `buf.used()` is the header size plus the payload
    /// length and the payload follows the header in storage.
    pub fn receive(&self, buf: &mut MessageBuffer) -> Result<()> {
        let header_size = self.codec.header_size();
        if buf.is_allocated() && buf.capacity() < header_size {
            return Err(FrameError::BufferTooSmall {
                required: header_size,
                available: buf.capacity(),
            });
        }

        let _guard = self
            .receive_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        self.transport.read(buf, header_size, 0)?;
        if buf.used() < header_size {
            return Err(FrameError::BufferTooSmall {
                required: header_size,
                available: buf.used(),
            });
        }

        let payload_len = usize::from(self.codec.decode_header(&buf.as_slice()[..header_size]));
        let frame_len = header_size + payload_len;
        if frame_len > buf.capacity() {
            warn!(
                declared = frame_len,
                capacity = buf.capacity(),
                "received frame does not fit buffer"
            );
            return Err(FrameError::FrameTooLarge {
                declared: frame_len,
                capacity: buf.capacity(),
            });
        }

        // Single-shot transports may already have delivered the whole frame.
        if buf.used() < frame_len {
            self.transport.read(buf, payload_len, header_size)?;
        } else if buf.used() > frame_len {
            buf.set_used(frame_len)?;
        }

        trace!(payload_len, "frame received");
        Ok(())
    }

    /// Frame and send `payload`.
    pub fn send_payload(&self, payload: &[u8]) -> Result<()> {
        if payload.len() > MAX_PAYLOAD {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD,
            });
        }
        let header_size = self.codec.header_size();
        let mut buf = MessageBuffer::with_capacity(header_size + payload.len());
        buf.write_payload(header_size, payload)?;
        self.send(&mut buf)
    }

    /// Receive one frame into a fresh buffer of `capacity` bytes (header
    /// included) and return its payload.
    pub fn receive_payload(&self, capacity: usize) -> Result<Bytes> {
        let mut buf = MessageBuffer::with_capacity(capacity);
        self.receive(&mut buf)?;
        Ok(Bytes::copy_from_slice(buf.payload(self.codec.header_size())))
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Borrow the codec.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Channel configuration. For channels built with
    /// [`with_codec`](Self::with_codec) this is the default config.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Consume the channel and return the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }
}

#[cfg(unix)]
impl FramedChannel<framewire_transport::uds::UnixStreamTransport> {
    /// Create a channel over a Unix socket and apply the configured timeouts.
    pub fn with_config_unix(
        transport: framewire_transport::uds::UnixStreamTransport,
        config: FrameConfig,
    ) -> Result<Self> {
        transport.set_read_timeout(config.read_timeout)?;
        transport.set_write_timeout(config.write_timeout)?;
        Ok(Self::with_config(transport, config))
    }
}

impl<T, C: std::fmt::Debug> std::fmt::Debug for FramedChannel<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramedChannel")
            .field("codec", &self.codec)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
