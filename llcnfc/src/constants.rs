// llcnfc-rs/llcnfc/src/constants.rs
//! Wire and protocol constants of the LLC link

/// Sequence numbers are three bits wide on the wire.
pub const SEQ_MODULUS: u8 = 8;

/// Largest window either side may announce in RSET.
pub const MAX_WINDOW_SIZE: u8 = 4;

/// Smallest usable window.
pub const MIN_WINDOW_SIZE: u8 = 1;

/// Size of the length prefix read before every frame body.
pub const LENGTH_PREFIX_LEN: usize = 1;

/// Header byte plus two CRC bytes.
pub const FRAME_OVERHEAD: usize = 3;

/// Largest total frame on the wire, length byte included (0x21).
pub const MAX_FRAME_LEN: usize = 33;

/// Largest value accepted in the length byte.
pub const MAX_LENGTH_FIELD: u8 = (MAX_FRAME_LEN - LENGTH_PREFIX_LEN) as u8;

/// Smallest value accepted in the length byte (header + CRC, no payload).
pub const MIN_LENGTH_FIELD: u8 = FRAME_OVERHEAD as u8;

/// Largest payload carried by an I-frame.
pub const MAX_PAYLOAD_LEN: usize = MAX_FRAME_LEN - LENGTH_PREFIX_LEN - FRAME_OVERHEAD;

/// Frame class selection on the header's top bits
pub const I_FRAME_MASK: u8 = 0xC0;
pub const I_FRAME_BITS: u8 = 0x80;
pub const SU_FRAME_MASK: u8 = 0xE0;
pub const S_FRAME_BITS: u8 = 0xC0;
pub const U_FRAME_BITS: u8 = 0xE0;

/// N(S) occupies bits 3..=5 of an I-frame header.
pub const NS_SHIFT: u8 = 3;
/// N(R) occupies bits 0..=2 of I and S headers.
pub const NR_MASK: u8 = 0x07;

/// S-frame type field (bits 3..=4)
pub const S_TYPE_MASK: u8 = 0x18;
pub const S_TYPE_RR: u8 = 0x00;
pub const S_TYPE_REJ: u8 = 0x08;
pub const S_TYPE_RNR: u8 = 0x10;
pub const S_TYPE_SREJ: u8 = 0x18;

/// U-frame modifier field (bits 0..=4)
pub const U_MODIFIER_MASK: u8 = 0x1F;
pub const U_MODIFIER_RSET: u8 = 0x19;
pub const U_MODIFIER_UA: u8 = 0x06;

/// RSET capabilities byte: selective reject not supported.
pub const RSET_CAPS_NO_SREJ: u8 = 0x00;

/// CRC-16 (ISO/IEC 13239) preset value.
pub const CRC_PRESET: u16 = 0xFFFF;
