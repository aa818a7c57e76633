// llcnfc-rs/llcnfc/src/protocol/checksum.rs

//! CRC-16 (ISO/IEC 13239) over frame bytes.

use crate::constants::CRC_PRESET;

/// Fold one byte into a running CRC-16 (ISO/IEC 13239, reflected 0x8408).
pub fn crc16_update(crc: u16, byte: u8) -> u16 {
    let mut b = byte ^ (crc & 0x00FF) as u8;
    b ^= b << 4;
    let b = u16::from(b);
    (crc >> 8) ^ (b << 8) ^ (b << 3) ^ (b >> 4)
}

/// CRC-16 over `data`, preset 0xFFFF, final complement.
pub fn crc16(data: &[u8]) -> u16 {
    !data.iter().fold(CRC_PRESET, |crc, &b| crc16_update(crc, b))
}

/// CRC as it appears on the wire: low byte first.
pub fn crc16_bytes(data: &[u8]) -> [u8; 2] {
    crc16(data).to_le_bytes()
}
