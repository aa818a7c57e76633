// llcnfc-rs/llcnfc/src/transport/traits.rs

//! The start-only transport trait.

use crate::error::TransportError;

/// Result of starting or completing a transport operation.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Transport trait abstracts the byte link away from the protocol engine.
///
/// Both operations only *start* the I/O. Completion is fed back to the link
/// as [`Event::WriteComplete`](crate::link::Event::WriteComplete) and
/// [`Event::ReadComplete`](crate::link::Event::ReadComplete). An `Err`
/// returned directly means the operation was never started.
pub trait Transport {
    /// Start writing `data` to the controller.
    fn write(&mut self, data: &[u8]) -> TransportResult<()>;

    /// Start reading exactly `len` bytes.
    fn read(&mut self, len: usize) -> TransportResult<()>;

    /// Abort any in-flight write and read. Pending completions are dropped.
    fn abort(&mut self);
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, data: &[u8]) -> TransportResult<()> {
        (**self).write(data)
    }

    fn read(&mut self, len: usize) -> TransportResult<()> {
        (**self).read(len)
    }

    fn abort(&mut self) {
        (**self).abort()
    }
}
