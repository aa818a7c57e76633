// llcnfc-rs/llcnfc/src/error.rs

//! Error types shared by the link, codec and transports.

use thiserror::Error;

/// Failure reported by a [`Transport`](crate::transport::Transport).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The driver cannot accept the operation right now; retry immediately.
    #[error("transport busy")]
    Busy,

    /// Cancelled by [`Transport::abort`](crate::transport::Transport::abort).
    #[error("transport operation aborted")]
    Aborted,

    /// The byte link failed.
    #[error("transport i/o error: {0}")]
    Io(String),
}

impl TransportError {
    /// Transient conditions are retried in place and never reach the link state.
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Busy)
    }
}

/// 共通エラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// `init()` was never called or has not completed.
    #[error("link is not initialised")]
    NotInitialised,

    /// Recovery or initialisation gave up; call `init()` again.
    #[error("link is down")]
    LinkDown,

    /// Every window slot holds an unacknowledged frame.
    #[error("send window is full")]
    Busy,

    /// Every RSET of an `init()` went unanswered.
    #[error("link initialisation failed: no answer to reset")]
    InitFailed,

    /// The link was released while the operation was pending.
    #[error("operation cancelled by release")]
    Released,

    /// `send` was given no bytes.
    #[error("payload must not be empty")]
    EmptyPayload,

    /// `send` was given more than one I-frame can carry.
    #[error("payload too large: max {max}, got {actual}")]
    PayloadTooLarge {
        /// Largest payload one I-frame carries.
        max: usize,
        /// Length that was passed in.
        actual: usize,
    },

    /// A frame's length byte disagrees with the bytes received.
    #[error("invalid frame length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Length the frame should have.
        expected: usize,
        /// Length it has.
        actual: usize,
    },

    /// The frame's CRC does not match its bytes.
    #[error("checksum mismatch: expected {expected:#06x}, got {actual:#06x}")]
    ChecksumMismatch {
        /// CRC computed over the received bytes.
        expected: u16,
        /// CRC carried by the frame.
        actual: u16,
    },

    /// The header or parameters do not form a valid frame.
    #[error("frame format error: {0}")]
    FrameFormat(String),

    /// A [`LinkConfig`](crate::config::LinkConfig) value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The transport refused to start an operation.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
