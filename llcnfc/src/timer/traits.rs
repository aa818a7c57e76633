// llcnfc-rs/llcnfc/src/timer/traits.rs

//! Timer identities and the service trait.

use crate::types::SeqNum;
use derive_more::Display;
use std::time::Duration;

/// Timer identities used by one link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TimerId {
    /// Bounds the RSET/UA handshake.
    #[display(fmt = "connection")]
    Connection,
    /// Bounds the wait for an acknowledgment of the I-frame with this N(S).
    #[display(fmt = "guard({})", _0)]
    Guard(SeqNum),
    /// Bounds how long an accepted I-frame may stay unacknowledged.
    #[display(fmt = "delayed-ack")]
    DelayedAck,
    /// Re-pumps a write the driver kept refusing as busy.
    #[display(fmt = "write-retry")]
    WriteRetry,
}

/// One-shot named timers.
///
/// Expiry is fed back to the link as
/// [`Event::TimerExpired`](crate::link::Event::TimerExpired). Starting an
/// armed timer restarts it; cancelling an idle timer is a no-op.
pub trait TimerService {
    /// Arm `id` to fire once after `duration`.
    fn start(&mut self, id: TimerId, duration: Duration);

    /// Disarm `id`; a pending expiry must not be delivered.
    fn cancel(&mut self, id: TimerId);
}

impl<T: TimerService + ?Sized> TimerService for Box<T> {
    fn start(&mut self, id: TimerId, duration: Duration) {
        (**self).start(id, duration)
    }

    fn cancel(&mut self, id: TimerId) {
        (**self).cancel(id)
    }
}
