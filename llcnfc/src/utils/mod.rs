pub mod hex;

pub use hex::Hex;
