use std::time::Duration;

use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: a single 16-bit payload length.
pub const HEADER_SIZE: usize = 2;

/// Largest payload the length field can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// Byte order of the length field on the wire.
///
/// Both endpoints must agree on it. The conversion covers the length field
/// only; payload bytes are never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

impl ByteOrder {
    /// The host's native byte order.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        }
    }
}

/// Encode a payload length into wire order.
pub fn encode_length(order: ByteOrder, value: u16) -> [u8; HEADER_SIZE] {
    match order {
        ByteOrder::Little => value.to_le_bytes(),
        ByteOrder::Big => value.to_be_bytes(),
    }
}

/// Decode a payload length from wire order.
pub fn decode_length(order: ByteOrder, bytes: [u8; HEADER_SIZE]) -> u16 {
    match order {
        ByteOrder::Little => u16::from_le_bytes(bytes),
        ByteOrder::Big => u16::from_be_bytes(bytes),
    }
}

/// Header layout of a framing variant.
///
/// A framed channel only needs to know how many leading bytes to reserve and
/// how to turn a payload length into those bytes and back. Variants that
/// carry more than a length report a larger header size.
pub trait FrameCodec: Send + Sync {
    /// Number of header bytes preceding every payload.
    fn header_size(&self) -> usize;

    /// Write the header for a payload of `payload_len` bytes.
    ///
    /// `header` is exactly `header_size()` bytes long.
    fn encode_header(&self, payload_len: u16, header: &mut [u8]);

    /// Read the payload length from a header of `header_size()` bytes.
    fn decode_header(&self, header: &[u8]) -> u16;
}

/// The plain length-prefix codec: `[len: u16][payload]`, no checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LengthPrefixCodec {
    order: ByteOrder,
}

impl LengthPrefixCodec {
    pub fn new(order: ByteOrder) -> Self {
        Self { order }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }
}

impl FrameCodec for LengthPrefixCodec {
    fn header_size(&self) -> usize {
        HEADER_SIZE
    }

    fn encode_header(&self, payload_len: u16, header: &mut [u8]) {
        header[..HEADER_SIZE].copy_from_slice(&encode_length(self.order, payload_len));
    }

    fn decode_header(&self, header: &[u8]) -> u16 {
        let mut raw = [0u8; HEADER_SIZE];
        raw.copy_from_slice(&header[..HEADER_SIZE]);
        decode_length(self.order, raw)
    }
}

/// Encode a complete frame into `dst`.
///
/// Wire format:
/// ```text
/// ┌──────────────────┬──────────────────┐
/// │ Length (2B)      │ Payload          │
/// │ u16, byte order  │ (Length bytes)   │
/// └──────────────────┴──────────────────┘
/// ```
pub fn encode_frame(order: ByteOrder, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let len = u16::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge {
        size: payload.len(),
        max: MAX_PAYLOAD,
    })?;
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&encode_length(order, len));
    dst.put_slice(payload);
    Ok(())
}

/// Configuration for a framed channel.
#[derive(Debug, Clone, Default)]
pub struct FrameConfig {
    /// Byte order of the length field. Default: little-endian.
    pub byte_order: ByteOrder,
    /// Read timeout applied to socket transports.
    pub read_timeout: Option<Duration>,
    /// Write timeout applied to socket transports.
    pub write_timeout: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_roundtrips_for_every_value() {
        for order in [ByteOrder::Little, ByteOrder::Big] {
            let codec = LengthPrefixCodec::new(order);
            let mut header = [0u8; HEADER_SIZE];
            for len in 0..=u16::MAX {
                codec.encode_header(len, &mut header);
                assert_eq!(codec.decode_header(&header), len);
            }
        }
    }

    #[test]
    fn wire_order_is_fixed_regardless_of_host() {
        assert_eq!(encode_length(ByteOrder::Little, 3), [0x03, 0x00]);
        assert_eq!(encode_length(ByteOrder::Big, 3), [0x00, 0x03]);
        assert_eq!(encode_length(ByteOrder::Little, 0x1234), [0x34, 0x12]);
        assert_eq!(decode_length(ByteOrder::Big, [0x12, 0x34]), 0x1234);
    }

    #[test]
    fn native_order_matches_host() {
        assert_eq!(
            encode_length(ByteOrder::native(), 0x0102),
            0x0102u16.to_ne_bytes()
        );
    }

    #[test]
    fn default_codec_is_little_endian() {
        let codec = LengthPrefixCodec::default();
        assert_eq!(codec.byte_order(), ByteOrder::Little);
        assert_eq!(codec.header_size(), 2);
    }

    #[test]
    fn encode_frame_abc() {
        let mut little = BytesMut::new();
        encode_frame(ByteOrder::Little, b"ABC", &mut little).unwrap();
        assert_eq!(little.as_ref(), &[0x03, 0x00, 0x41, 0x42, 0x43]);

        let mut big = BytesMut::new();
        encode_frame(ByteOrder::Big, b"ABC", &mut big).unwrap();
        assert_eq!(big.as_ref(), &[0x00, 0x03, 0x41, 0x42, 0x43]);
    }

    #[test]
    fn encode_frame_empty_payload_is_header_only() {
        let mut buf = BytesMut::new();
        encode_frame(ByteOrder::Little, b"", &mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[0x00, 0x00]);
    }

    #[test]
    fn encode_frame_rejects_oversized_payload() {
        let payload = vec![0u8; MAX_PAYLOAD + 1];
        let mut buf = BytesMut::new();
        let err = encode_frame(ByteOrder::Little, &payload, &mut buf).unwrap_err();
        assert!(matches!(
            err,
            FrameError::PayloadTooLarge {
                size,
                max: MAX_PAYLOAD
            } if size == MAX_PAYLOAD + 1
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn encode_frame_accepts_max_payload() {
        let payload = vec![0xAB; MAX_PAYLOAD];
        let mut buf = BytesMut::new();
        encode_frame(ByteOrder::Big, &payload, &mut buf).unwrap();
        assert_eq!(&buf[..HEADER_SIZE], &[0xFF, 0xFF]);
        assert_eq!(buf.len(), HEADER_SIZE + MAX_PAYLOAD);
    }
}
