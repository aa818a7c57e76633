// llcnfc-rs/llcnfc/src/prelude.rs

//! Common imports for users of the crate.

pub use crate::config::{LinkConfig, LinkConfigBuilder};
pub use crate::link::{Event, Link, LinkState, LinkStatus, Notification};
pub use crate::protocol::{Frame, FrameCodec, LlcCodec, SupervisoryKind};
pub use crate::timer::{TimerId, TimerService};
pub use crate::transport::Transport;
pub use crate::{BaudRate, Error, Result, SendId, SeqNum, TransportError};

#[cfg(feature = "async")]
pub use crate::runtime::{LinkChannel, LlcHandle, LlcService};
