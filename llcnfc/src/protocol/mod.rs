// llcnfc-rs/llcnfc/src/protocol/mod.rs

//! LLC frame format: checksum, typed frames and the codec seam.

pub mod checksum;
pub mod codec;
pub mod frame;
#[allow(missing_docs)]
pub mod parser;

pub use checksum::{crc16, crc16_bytes};
pub use codec::{FrameCodec, LlcCodec};
pub use frame::{Frame, ResetParams, SupervisoryKind, UnnumberedCmd};
