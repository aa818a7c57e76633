// llcnfc-rs/llcnfc/src/runtime/mod.rs

//! Tokio runtime for a [`Link`](crate::link::Link).
//!
//! [`LlcService::spawn`] moves the link into a task that owns it
//! exclusively. Reads and writes on the byte stream run in two helper
//! tasks, timers are tokio sleeps, and all of them report back to the link
//! task through one channel, so the link keeps its single mutation path.
//! Callers talk to it through a cloneable [`LlcHandle`].

mod channel;
mod clock;
mod io;
mod service;

pub use channel::LinkChannel;
pub use clock::TokioTimers;
pub use io::StreamTransport;
pub use service::{LlcHandle, LlcService};

use crate::link::Event;
use crate::timer::TimerId;

/// Completion routed back to the link task.
#[derive(Debug)]
pub(crate) enum Internal {
    /// Transport completion, tagged with the abort epoch it was issued in.
    Io { epoch: u64, event: Event },
    /// Timer expiry, tagged with the start that produced it.
    Timer { id: TimerId, token: u64 },
}
