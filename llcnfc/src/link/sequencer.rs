// llcnfc-rs/llcnfc/src/link/sequencer.rs

use crate::constants::MAX_WINDOW_SIZE;
use crate::link::ring::Ring;
use crate::types::{SeqNum, distance};

/// Where an incoming N(S) falls relative to `expected_recv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    InOrder,
    /// Already accepted; the peer missed our acknowledgment.
    Duplicate,
    /// Ahead of what we expect; something in between was lost.
    Gap,
}

/// Receive side: expected N(S), acknowledgments owed, reject condition.
#[derive(Debug)]
pub struct ReceiveSequencer {
    expected: SeqNum,
    /// Accepted frames whose acknowledgment has not gone out yet.
    pending: Ring<SeqNum, { MAX_WINDOW_SIZE as usize }>,
    window_size: u8,
    reject_sent: bool,
}

impl ReceiveSequencer {
    pub fn new(window_size: u8) -> Self {
        Self {
            expected: SeqNum::ZERO,
            pending: Ring::new(),
            window_size: window_size.min(MAX_WINDOW_SIZE),
            reject_sent: false,
        }
    }

    pub fn expected(&self) -> SeqNum {
        self.expected
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn reject_sent(&self) -> bool {
        self.reject_sent
    }

    pub fn set_reject_sent(&mut self, sent: bool) {
        self.reject_sent = sent;
    }

    /// Anything up to one window behind `expected` is a repeat; everything
    /// else that is not `expected` is ahead of it.
    pub fn classify(&self, ns: SeqNum) -> Disposition {
        match distance(ns, self.expected) {
            0 => Disposition::InOrder,
            d if d <= self.window_size => Disposition::Duplicate,
            _ => Disposition::Gap,
        }
    }

    /// `ns` is the frame accepted immediately before the current one.
    pub fn is_near_miss(&self, ns: SeqNum) -> bool {
        distance(ns, self.expected) == 1
    }

    /// Accept the in-order frame `ns`. Returns `true` once the number of
    /// unacknowledged frames reaches the window size.
    pub fn accept(&mut self, ns: SeqNum) -> bool {
        debug_assert_eq!(ns, self.expected);
        self.expected = self.expected.next();
        self.reject_sent = false;
        if self.pending.push(ns).is_err() {
            return true;
        }
        self.pending.len() >= self.window_size as usize
    }

    /// An acknowledgment carrying the current N(R) went out.
    pub fn acknowledged(&mut self) {
        self.pending.clear();
    }

    pub fn reset(&mut self, window_size: u8) {
        self.expected = SeqNum::ZERO;
        self.pending.clear();
        self.window_size = window_size.min(MAX_WINDOW_SIZE);
        self.reject_sent = false;
    }
}
