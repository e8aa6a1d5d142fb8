//! Blocking byte transports for framewire.
//!
//! A transport is a duplex byte channel with no notion of message
//! boundaries. It exposes exactly two primitives, parameterized by a
//! [`MessageBuffer`], a byte count and an offset into that buffer:
//! - `read` fills `count` bytes at `offset` and records how much of the
//!   buffer is now occupied
//! - `write` sends `count` bytes starting at `offset`
//!
//! This is the lowest layer of framewire. The framing layer builds on top of
//! the [`ByteTransport`] trait provided here.

pub mod buffer;
pub mod datagram;
pub mod error;
pub mod loopback;
pub mod stream;
pub mod traits;

#[cfg(unix)]
pub mod uds;

pub use buffer::MessageBuffer;
pub use datagram::DatagramTransport;
pub use error::{Result, TransportError};
pub use loopback::{pipe, LoopbackTransport};
pub use stream::StreamTransport;
pub use traits::ByteTransport;

#[cfg(unix)]
pub use uds::UnixDomainSocket;
