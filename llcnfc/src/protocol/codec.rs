// llcnfc-rs/llcnfc/src/protocol/codec.rs

//! Codec seam between the link and the wire format.

use crate::Result;

use super::Frame;

/// Serialises logical frames to wire bytes and back.
///
/// The link engine only ever sees [`Frame`] values; the byte layout lives
/// behind this trait so an alternative framing can be plugged in.
pub trait FrameCodec {
    /// Produce wire bytes, length prefix and check bytes included.
    fn encode(&self, frame: &Frame) -> Result<Vec<u8>>;

    /// Parse a complete frame as read from the transport.
    fn decode(&self, bytes: &[u8]) -> Result<Frame>;
}

/// Codec for the LLC wire format with CRC-16 trailer.
#[derive(Debug, Clone, Copy, Default)]
pub struct LlcCodec;

impl FrameCodec for LlcCodec {
    fn encode(&self, frame: &Frame) -> Result<Vec<u8>> {
        frame.encode()
    }

    fn decode(&self, bytes: &[u8]) -> Result<Frame> {
        Frame::decode(bytes)
    }
}

impl<C: FrameCodec + ?Sized> FrameCodec for &C {
    fn encode(&self, frame: &Frame) -> Result<Vec<u8>> {
        (**self).encode(frame)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Frame> {
        (**self).decode(bytes)
    }
}
