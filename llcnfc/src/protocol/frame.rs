// llcnfc-rs/llcnfc/src/protocol/frame.rs

//! Typed frames and their wire encoding.

use crate::constants::*;
use crate::protocol::checksum::crc16_bytes;
use crate::protocol::parser::{byte_at, ensure_frame_len, slice_at};
use crate::types::{BaudRate, SeqNum};
use crate::{Error, Result};
use derive_more::Display;
use std::convert::TryFrom;

/// Supervisory frame type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum SupervisoryKind {
    /// Acknowledges every frame before N(R).
    #[display(fmt = "RR")]
    ReceiveReady,
    /// Asks for retransmission starting at N(R).
    #[display(fmt = "REJ")]
    Reject,
    /// Acknowledges up to N(R) and asks the sender to hold back.
    #[display(fmt = "RNR")]
    ReceiveNotReady,
    /// Asks for the single frame N(R); answered with REJ.
    #[display(fmt = "SREJ")]
    SelectiveReject,
}

impl SupervisoryKind {
    fn bits(self) -> u8 {
        match self {
            SupervisoryKind::ReceiveReady => S_TYPE_RR,
            SupervisoryKind::Reject => S_TYPE_REJ,
            SupervisoryKind::ReceiveNotReady => S_TYPE_RNR,
            SupervisoryKind::SelectiveReject => S_TYPE_SREJ,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits & S_TYPE_MASK {
            S_TYPE_RR => SupervisoryKind::ReceiveReady,
            S_TYPE_REJ => SupervisoryKind::Reject,
            S_TYPE_RNR => SupervisoryKind::ReceiveNotReady,
            _ => SupervisoryKind::SelectiveReject,
        }
    }
}

/// RSET parameters: `[window_size, capabilities, (baud_rate)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetParams {
    /// Window the sender can receive.
    pub window_size: u8,
    /// Capability bits; this link never offers SREJ.
    pub capabilities: u8,
    /// Optional line-rate change.
    pub baud_rate: Option<BaudRate>,
}

impl ResetParams {
    /// Parameters with the default capabilities.
    pub fn new(window_size: u8, baud_rate: Option<BaudRate>) -> Self {
        Self {
            window_size,
            capabilities: RSET_CAPS_NO_SREJ,
            baud_rate,
        }
    }
}

/// Unnumbered command carried by a U-frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnnumberedCmd {
    /// RSET: open or reset the link.
    Reset(ResetParams),
    /// UA: answer to RSET.
    Ack,
}

/// Logical LLC frame.
///
/// Wire format: `[len] [header] [payload..] [crc1] [crc2]` where `len`
/// counts every byte after itself and the CRC covers `len`, header and
/// payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Frame {
    /// U-frame (RSET or UA).
    Unnumbered {
        cmd: UnnumberedCmd,
    },
    /// I-frame carrying one payload.
    Information {
        ns: SeqNum,
        nr: SeqNum,
        payload: Vec<u8>,
    },
    /// S-frame carrying only N(R).
    Supervisory {
        kind: SupervisoryKind,
        nr: SeqNum,
    },
}

impl Frame {
    /// RSET with `params`.
    pub fn reset(params: ResetParams) -> Self {
        Frame::Unnumbered {
            cmd: UnnumberedCmd::Reset(params),
        }
    }

    /// UA.
    pub fn unnumbered_ack() -> Self {
        Frame::Unnumbered {
            cmd: UnnumberedCmd::Ack,
        }
    }

    /// I-frame numbered `ns`, acknowledging up to `nr`.
    pub fn information(ns: SeqNum, nr: SeqNum, payload: impl Into<Vec<u8>>) -> Self {
        Frame::Information {
            ns,
            nr,
            payload: payload.into(),
        }
    }

    /// S-frame of `kind` acknowledging up to `nr`.
    pub fn supervisory(kind: SupervisoryKind, nr: SeqNum) -> Self {
        Frame::Supervisory { kind, nr }
    }

    /// Header byte for this frame.
    pub fn header(&self) -> u8 {
        match self {
            Frame::Unnumbered { cmd } => {
                let modifier = match cmd {
                    UnnumberedCmd::Reset(_) => U_MODIFIER_RSET,
                    UnnumberedCmd::Ack => U_MODIFIER_UA,
                };
                U_FRAME_BITS | modifier
            }
            Frame::Information { ns, nr, .. } => {
                I_FRAME_BITS | (ns.value() << NS_SHIFT) | nr.value()
            }
            Frame::Supervisory { kind, nr } => S_FRAME_BITS | kind.bits() | nr.value(),
        }
    }

    fn body(&self) -> Vec<u8> {
        match self {
            Frame::Unnumbered {
                cmd: UnnumberedCmd::Reset(p),
            } => {
                let mut out = vec![p.window_size, p.capabilities];
                if let Some(rate) = p.baud_rate {
                    out.push(rate.code());
                }
                out
            }
            Frame::Information { payload, .. } => payload.clone(),
            _ => Vec::new(),
        }
    }

    /// Encode into wire bytes including length prefix and CRC.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let body = self.body();
        if body.len() > MAX_PAYLOAD_LEN {
            return Err(Error::PayloadTooLarge {
                max: MAX_PAYLOAD_LEN,
                actual: body.len(),
            });
        }

        let len = (FRAME_OVERHEAD + body.len()) as u8;
        let mut out = Vec::with_capacity(LENGTH_PREFIX_LEN + len as usize);
        out.push(len);
        out.push(self.header());
        out.extend_from_slice(&body);
        let crc = crc16_bytes(&out);
        out.extend_from_slice(&crc);
        Ok(out)
    }

    /// Decode a complete frame (length byte included).
    pub fn decode(frame: &[u8]) -> Result<Frame> {
        let len = ensure_frame_len(frame)?;

        let crc_at = LENGTH_PREFIX_LEN + len - 2;
        let covered = slice_at(frame, 0, crc_at)?;
        let expected = u16::from_le_bytes(crc16_bytes(covered));
        let actual = u16::from_le_bytes([byte_at(frame, crc_at)?, byte_at(frame, crc_at + 1)?]);
        if expected != actual {
            return Err(Error::ChecksumMismatch { expected, actual });
        }

        let header = byte_at(frame, 1)?;
        let body = slice_at(frame, 2, len - FRAME_OVERHEAD)?;

        if header & I_FRAME_MASK == I_FRAME_BITS {
            return Ok(Frame::Information {
                ns: SeqNum::new((header >> NS_SHIFT) & NR_MASK),
                nr: SeqNum::new(header & NR_MASK),
                payload: body.to_vec(),
            });
        }

        match header & SU_FRAME_MASK {
            S_FRAME_BITS => {
                if !body.is_empty() {
                    return Err(Error::FrameFormat("supervisory frame with payload".into()));
                }
                Ok(Frame::Supervisory {
                    kind: SupervisoryKind::from_bits(header),
                    nr: SeqNum::new(header & NR_MASK),
                })
            }
            U_FRAME_BITS => Self::decode_unnumbered(header & U_MODIFIER_MASK, body),
            _ => Err(Error::FrameFormat(format!("invalid header {:#04x}", header))),
        }
    }

    fn decode_unnumbered(modifier: u8, body: &[u8]) -> Result<Frame> {
        match modifier {
            U_MODIFIER_RSET => {
                if body.is_empty() || body.len() > 3 {
                    return Err(Error::FrameFormat(format!(
                        "RSET carries {} parameter bytes",
                        body.len()
                    )));
                }
                let window_size = byte_at(body, 0)?;
                let capabilities = body.get(1).copied().unwrap_or(RSET_CAPS_NO_SREJ);
                let baud_rate = match body.get(2) {
                    Some(&code) => Some(BaudRate::try_from(code)?),
                    None => None,
                };
                Ok(Frame::reset(ResetParams {
                    window_size,
                    capabilities,
                    baud_rate,
                }))
            }
            U_MODIFIER_UA => {
                if !body.is_empty() {
                    return Err(Error::FrameFormat("UA frame with payload".into()));
                }
                Ok(Frame::unnumbered_ack())
            }
            other => Err(Error::FrameFormat(format!(
                "unknown unnumbered modifier {:#04x}",
                other
            ))),
        }
    }
}
