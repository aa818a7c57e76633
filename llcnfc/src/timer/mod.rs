// llcnfc-rs/llcnfc/src/timer/mod.rs

//! Timer service abstraction and a recording mock.

#[allow(missing_docs)]
pub mod mock;
pub mod traits;

pub use mock::MockTimers;
pub use traits::{TimerId, TimerService};
