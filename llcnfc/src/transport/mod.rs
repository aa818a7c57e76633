// llcnfc-rs/llcnfc/src/transport/mod.rs

//! Byte transport abstraction and a recording mock.

#[allow(missing_docs)]
pub mod mock;
pub mod traits;

pub use mock::MockTransport;
pub use traits::{Transport, TransportResult};
