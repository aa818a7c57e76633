// llcnfc-rs/llcnfc/src/runtime/channel.rs

use crate::Result;
use async_trait::async_trait;

/// Reliable message channel as seen by the protocol layer above the LLC.
#[async_trait]
pub trait LinkChannel: Send + Sync {
    /// Run the RSET/UA handshake.
    async fn init(&self) -> Result<()>;

    /// Send one message; resolves once the peer acknowledged it.
    async fn send(&self, payload: &[u8]) -> Result<()>;

    /// Next in-order message from the peer.
    async fn receive(&self) -> Result<Vec<u8>>;

    /// Close the link and cancel every pending operation.
    async fn release(&self) -> Result<()>;
}
