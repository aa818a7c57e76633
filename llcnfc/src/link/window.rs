// llcnfc-rs/llcnfc/src/link/window.rs

use crate::constants::MAX_WINDOW_SIZE;
use crate::link::ring::Ring;
use crate::types::{SendId, SeqNum, distance};
use crate::{Error, Result};
use derive_more::Display;

/// Why a slot is (or was last) transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SlotKind {
    #[display(fmt = "original")]
    Original,
    /// Retransmitted after a guard expiry or a link reset.
    #[display(fmt = "resend")]
    Resend,
    /// Retransmitted because the peer sent REJ.
    #[display(fmt = "rejected")]
    Rejected,
}

/// Outstanding I-frame.
#[derive(Debug, Clone)]
pub struct Slot {
    pub seq: SeqNum,
    pub id: SendId,
    pub payload: Vec<u8>,
    /// Bytes of the last transmission (N(R) is refreshed on every send).
    pub encoded: Vec<u8>,
    pub kind: SlotKind,
    /// Waiting for the write path.
    pub needs_tx: bool,
    /// Handed to the transport at least once since the last renumbering.
    pub sent: bool,
    /// Guard expiries since the last send error for this frame.
    pub expiries: u16,
}

/// Send side of the sliding window.
#[derive(Debug)]
pub struct SendWindow {
    ring: Ring<Slot, { MAX_WINDOW_SIZE as usize }>,
    window_size: u8,
    next_send: SeqNum,
}

impl SendWindow {
    pub fn new(window_size: u8) -> Self {
        Self {
            ring: Ring::new(),
            window_size: window_size.min(MAX_WINDOW_SIZE),
            next_send: SeqNum::ZERO,
        }
    }

    pub fn window_size(&self) -> u8 {
        self.window_size
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.ring.len() >= self.window_size as usize
    }

    pub fn next_send(&self) -> SeqNum {
        self.next_send
    }

    /// N(S) of the oldest unacknowledged frame, or `next_send` when empty.
    pub fn oldest(&self) -> SeqNum {
        self.ring.front().map_or(self.next_send, |s| s.seq)
    }

    /// Store a new frame under the next sequence number.
    pub fn submit(&mut self, id: SendId, payload: Vec<u8>) -> Result<SeqNum> {
        if self.is_full() {
            return Err(Error::Busy);
        }
        let seq = self.next_send;
        let slot = Slot {
            seq,
            id,
            payload,
            encoded: Vec::new(),
            kind: SlotKind::Original,
            needs_tx: true,
            sent: false,
            expiries: 0,
        };
        self.ring.push(slot).map_err(|_| Error::Busy)?;
        self.next_send = seq.next();
        Ok(seq)
    }

    /// Withdraw the newest frame (a submit whose first write failed).
    pub fn pop_newest(&mut self) -> Option<Slot> {
        let slot = self.ring.pop_back()?;
        self.next_send = slot.seq;
        Some(slot)
    }

    /// `nr` acknowledges `seq` when it lies past `seq` but not past the
    /// highest number handed out.
    pub fn is_acked_by(&self, seq: SeqNum, nr: SeqNum) -> bool {
        acknowledges(nr, seq, self.next_send)
    }

    /// Free the oldest slot if `nr` acknowledges it.
    pub fn pop_if_acked(&mut self, nr: SeqNum) -> Option<Slot> {
        let next_send = self.next_send;
        self.ring
            .pop_front_if(|s| acknowledges(nr, s.seq, next_send))
    }

    /// Free every slot acknowledged by `nr`, oldest first.
    pub fn ack(&mut self, nr: SeqNum) -> Vec<Slot> {
        let mut freed = Vec::new();
        while let Some(slot) = self.pop_if_acked(nr) {
            freed.push(slot);
        }
        freed
    }

    pub fn get(&self, seq: SeqNum) -> Option<&Slot> {
        self.ring.iter().find(|s| s.seq == seq)
    }

    pub fn get_mut(&mut self, seq: SeqNum) -> Option<&mut Slot> {
        self.ring.iter_mut().find(|s| s.seq == seq)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.ring.iter()
    }

    /// Queue every already-sent frame for retransmission, oldest first.
    pub fn mark_sent_for_resend(&mut self, kind: SlotKind) -> usize {
        let mut n = 0;
        for slot in self.ring.iter_mut().filter(|s| s.sent) {
            slot.needs_tx = true;
            slot.kind = kind;
            n += 1;
        }
        n
    }

    /// Oldest frame waiting for the write path. New frames are held back
    /// while the peer reports itself busy; retransmissions are not.
    pub fn next_to_transmit(&self, peer_busy: bool) -> Option<SeqNum> {
        self.ring
            .iter()
            .find(|s| s.needs_tx && !(peer_busy && s.kind == SlotKind::Original))
            .map(|s| s.seq)
    }

    /// A retransmission is queued and not yet handed to the transport.
    pub fn resending(&self) -> bool {
        self.ring
            .iter()
            .any(|s| s.needs_tx && s.kind != SlotKind::Original)
    }

    /// Renumber the outstanding frames from zero after a link reset and
    /// queue them all again. Frames that no longer fit into
    /// `window_size` are removed and returned, newest last.
    pub fn renumber(&mut self, window_size: u8) -> Vec<Slot> {
        self.window_size = window_size.min(MAX_WINDOW_SIZE);
        let mut dropped = Vec::new();
        while self.ring.len() > self.window_size as usize {
            if let Some(slot) = self.ring.pop_back() {
                dropped.push(slot);
            }
        }
        dropped.reverse();

        let mut seq = SeqNum::ZERO;
        for slot in self.ring.iter_mut() {
            slot.seq = seq;
            slot.needs_tx = true;
            if slot.sent {
                slot.kind = SlotKind::Resend;
            }
            slot.sent = false;
            slot.expiries = 0;
            seq = seq.next();
        }
        self.next_send = seq;
        dropped
    }

    /// Drop every frame and restart numbering at zero.
    pub fn clear(&mut self, window_size: u8) -> Vec<Slot> {
        self.window_size = window_size.min(MAX_WINDOW_SIZE);
        self.next_send = SeqNum::ZERO;
        self.ring.drain()
    }
}

/// `nr` lies past `seq` and no further than `next_send`.
fn acknowledges(nr: SeqNum, seq: SeqNum, next_send: SeqNum) -> bool {
    let d = distance(seq, nr);
    d >= 1 && d <= distance(seq, next_send)
}
