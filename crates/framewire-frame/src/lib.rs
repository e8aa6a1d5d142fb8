//! Length-prefixed message framing over blocking byte transports.
//!
//! Every message is prefixed with a 2-byte payload length in a fixed wire
//! byte order. A [`FramedChannel`] receives in two phases: it reads the header,
//! checks the declared frame against the caller's buffer, then reads exactly
//! the payload. There is no checksum, magic number, or version field.

pub mod channel;
pub mod codec;
pub mod error;

pub use channel::FramedChannel;
pub use codec::{
    decode_length, encode_frame, encode_length, ByteOrder, FrameCodec, FrameConfig,
    LengthPrefixCodec, HEADER_SIZE, MAX_PAYLOAD,
};
pub use error::{FrameError, Result};

/// Largest frame on the wire: header plus maximum payload.
pub const MAX_FRAME: usize = HEADER_SIZE + MAX_PAYLOAD;
