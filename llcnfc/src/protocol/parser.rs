// llcnfc-rs/llcnfc/src/protocol/parser.rs

use crate::constants::{LENGTH_PREFIX_LEN, MAX_LENGTH_FIELD, MIN_LENGTH_FIELD};
use crate::{Error, Result};

/// Ensure the slice has at least `min` bytes.
pub fn ensure_len(data: &[u8], min: usize) -> Result<()> {
    if data.len() < min {
        return Err(Error::InvalidLength {
            expected: min,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Read a single byte at `idx` with bounds checking.
pub fn byte_at(data: &[u8], idx: usize) -> Result<u8> {
    ensure_len(data, idx + 1)?;
    Ok(data[idx])
}

/// Return a subslice with bounds checking.
pub fn slice_at(data: &[u8], idx: usize, len: usize) -> Result<&[u8]> {
    ensure_len(data, idx + len)?;
    Ok(&data[idx..idx + len])
}

/// Validate a length prefix and return how many body bytes follow it.
pub fn body_len(prefix: u8) -> Result<usize> {
    if !(MIN_LENGTH_FIELD..=MAX_LENGTH_FIELD).contains(&prefix) {
        return Err(Error::FrameFormat(format!(
            "length byte {:#04x} outside {:#04x}..={:#04x}",
            prefix, MIN_LENGTH_FIELD, MAX_LENGTH_FIELD
        )));
    }
    Ok(prefix as usize)
}

/// Check that `frame` is exactly as long as its own length byte claims.
pub fn ensure_frame_len(frame: &[u8]) -> Result<usize> {
    let len = body_len(byte_at(frame, 0)?)?;
    let required = LENGTH_PREFIX_LEN + len;
    if frame.len() != required {
        return Err(Error::InvalidLength {
            expected: required,
            actual: frame.len(),
        });
    }
    Ok(len)
}
