// fixtures.rs: frames the scripted peer sends in link tests

use llcnfc::protocol::{Frame, ResetParams, SupervisoryKind};
use llcnfc::SeqNum;

pub const RSET_WINDOW_4: &str = "05f90400c3e5";
pub const UA: &str = "03e617a7";

pub fn seq(n: u8) -> SeqNum {
    SeqNum::new(n)
}

pub fn rr(nr: u8) -> Frame {
    Frame::supervisory(SupervisoryKind::ReceiveReady, seq(nr))
}

pub fn rej(nr: u8) -> Frame {
    Frame::supervisory(SupervisoryKind::Reject, seq(nr))
}

pub fn rnr(nr: u8) -> Frame {
    Frame::supervisory(SupervisoryKind::ReceiveNotReady, seq(nr))
}

pub fn srej(nr: u8) -> Frame {
    Frame::supervisory(SupervisoryKind::SelectiveReject, seq(nr))
}

pub fn info(ns: u8, nr: u8, payload: &[u8]) -> Frame {
    Frame::information(seq(ns), seq(nr), payload.to_vec())
}

pub fn rset(window: u8) -> Frame {
    Frame::reset(ResetParams::new(window, None))
}

pub fn ua() -> Frame {
    Frame::unnumbered_ack()
}

pub fn bytes(hex_str: &str) -> Vec<u8> {
    hex::decode(hex_str).expect("fixture hex")
}
