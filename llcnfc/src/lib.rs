// llcnfc-rs/llcnfc/src/lib.rs

//! llcnfc
//!
//! HDLC-style logical link control for NFC controllers attached over a
//! byte-oriented serial link (I2C, UART). The [`link::Link`] engine turns
//! the unreliable byte stream into a reliable, ordered channel for short
//! messages: numbered I-frames in a sliding window, RR/REJ/RNR supervision,
//! and an RSET/UA handshake for connection setup and recovery.
//!
//! The engine never blocks and never spawns anything. It is driven by
//! upper-layer calls and by completion [`link::Event`]s from the
//! [`transport::Transport`] and [`timer::TimerService`] it owns. With the
//! `async` feature, [`runtime`] runs it as a tokio task over any byte stream.
#![warn(missing_docs)]

pub mod config;
#[allow(missing_docs)]
pub mod constants;
pub mod error;
pub mod link;
pub mod prelude;
pub mod protocol;
#[cfg(feature = "async")]
pub mod runtime;
#[allow(missing_docs)]
pub mod test_support;
pub mod timer;
pub mod transport;
pub mod types;
/// Formatting helpers for log lines.
pub mod utils;

// Re-export common types at crate root so `crate::Error`, `crate::Result`,
// and the newtypes in `types` are available for consumers and for
// convenient `prelude` re-exports.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;
