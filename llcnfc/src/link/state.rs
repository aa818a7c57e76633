// llcnfc-rs/llcnfc/src/link/state.rs

//! Observable link state.

use derive_more::Display;

/// Externally observable link state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum LinkState {
    /// Never opened, released, or down after a failed reset.
    Uninitialised,
    /// RSET sent, waiting for UA (or for the peer's own RSET).
    Initialising,
    /// Open and idle.
    Initialised,
    /// A physical write is outstanding.
    Sending,
    /// The upper layer registered for the next payload.
    Receiving,
    /// Length prefix received, frame body outstanding.
    ReceiveWait,
    /// Previously sent I-frames are queued for retransmission.
    Resending,
}

/// Lifecycle underneath [`LinkState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    /// `failed` distinguishes a link that went down from one never opened.
    Down { failed: bool },
    /// `explicit` is set for an `init()` call, clear for recovery resets.
    Opening { explicit: bool },
    Up,
}

impl Lifecycle {
    pub(crate) fn is_down(self) -> bool {
        matches!(self, Lifecycle::Down { .. })
    }

    pub(crate) fn is_up(self) -> bool {
        matches!(self, Lifecycle::Up)
    }
}
