// llcnfc-rs/llcnfc/src/types.rs

//! Sequence numbers, send handles and line rates.

use crate::Error;
use crate::constants::SEQ_MODULUS;
use derive_more::Display;
use std::convert::TryFrom;

/// Forward distance from `from` to `to` in the sequence space.
///
/// Every sequence comparison in the crate goes through this function:
/// `distance(a, b) == 0` iff `a == b`, and `distance(a, b) == k` means `b`
/// is `k` steps ahead of `a` once wraparound is accounted for.
pub const fn distance(from: SeqNum, to: SeqNum) -> u8 {
    (to.0 + SEQ_MODULUS - from.0) % SEQ_MODULUS
}

/// N(S) / N(R) sequence number, always reduced modulo [`SEQ_MODULUS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub struct SeqNum(u8);

impl SeqNum {
    /// First number after a reset.
    pub const ZERO: Self = Self(0);

    /// Build from any value; the value is reduced into the sequence space.
    pub const fn new(value: u8) -> Self {
        Self(value % SEQ_MODULUS)
    }

    /// Raw value in `0..SEQ_MODULUS`.
    pub const fn value(self) -> u8 {
        self.0
    }

    /// `self + n` with wraparound.
    pub const fn add(self, n: u8) -> Self {
        Self(((self.0 as u16 + n as u16) % SEQ_MODULUS as u16) as u8)
    }

    /// Successor with wraparound.
    pub const fn next(self) -> Self {
        self.add(1)
    }

    /// Predecessor with wraparound.
    pub const fn prev(self) -> Self {
        self.add(SEQ_MODULUS - 1)
    }

    /// Steps forward from `self` to `to`.
    pub const fn distance_to(self, to: SeqNum) -> u8 {
        distance(self, to)
    }
}

impl From<SeqNum> for u8 {
    fn from(s: SeqNum) -> Self {
        s.0
    }
}

/// Handle returned by `send`, echoed in the completion notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display(fmt = "send#{}", _0)]
pub struct SendId(pub(crate) u64);

impl SendId {
    /// Raw handle value, increasing per accepted send.
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Serial line rate announced as the optional third RSET parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum BaudRate {
    B9600 = 0x00,
    B19200 = 0x01,
    B28800 = 0x02,
    B38400 = 0x03,
    B57600 = 0x04,
    B115200 = 0x05,
    B230400 = 0x06,
    B460800 = 0x07,
    B921600 = 0x08,
    B1228000 = 0x09,
}

impl BaudRate {
    /// Parameter byte carried in RSET.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Line rate in bits per second.
    pub fn bits_per_second(self) -> u32 {
        match self {
            BaudRate::B9600 => 9_600,
            BaudRate::B19200 => 19_200,
            BaudRate::B28800 => 28_800,
            BaudRate::B38400 => 38_400,
            BaudRate::B57600 => 57_600,
            BaudRate::B115200 => 115_200,
            BaudRate::B230400 => 230_400,
            BaudRate::B460800 => 460_800,
            BaudRate::B921600 => 921_600,
            BaudRate::B1228000 => 1_228_000,
        }
    }
}

impl TryFrom<u8> for BaudRate {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0x00 => BaudRate::B9600,
            0x01 => BaudRate::B19200,
            0x02 => BaudRate::B28800,
            0x03 => BaudRate::B38400,
            0x04 => BaudRate::B57600,
            0x05 => BaudRate::B115200,
            0x06 => BaudRate::B230400,
            0x07 => BaudRate::B460800,
            0x08 => BaudRate::B921600,
            0x09 => BaudRate::B1228000,
            other => {
                return Err(Error::FrameFormat(format!(
                    "unknown baud rate code {:#04x}",
                    other
                )));
            }
        })
    }
}
