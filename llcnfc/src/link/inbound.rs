// llcnfc-rs/llcnfc/src/link/inbound.rs

use super::sequencer::Disposition;
use super::state::Lifecycle;
use super::timers::Expiry;
use super::window::SlotKind;
use super::{Link, Notification, ReadPhase};
use crate::constants::{LENGTH_PREFIX_LEN, MAX_WINDOW_SIZE, MIN_WINDOW_SIZE};
use crate::error::TransportError;
use crate::protocol::parser::body_len;
use crate::protocol::{Frame, FrameCodec, ResetParams, SupervisoryKind, UnnumberedCmd};
use crate::timer::{TimerId, TimerService};
use crate::transport::{Transport, TransportResult};
use crate::types::SeqNum;
use crate::utils::Hex;
use log::{debug, trace, warn};

impl<T: Transport, M: TimerService, C: FrameCodec> Link<T, M, C> {
    /// Two-phase read: the length prefix, then exactly that many bytes.
    pub(super) fn on_read_complete(&mut self, result: TransportResult<Vec<u8>>) {
        let phase = std::mem::replace(&mut self.read, ReadPhase::Idle);
        let bytes = match (phase, result) {
            (ReadPhase::Idle, _) => {
                debug!("read completion with no read outstanding");
                return;
            }
            (_, Err(TransportError::Aborted)) => return,
            (_, Err(e)) => {
                self.note_recv_error(&format!("read failed: {}", e));
                return;
            }
            (_, Ok(bytes)) => bytes,
        };

        match phase {
            ReadPhase::Length => {
                if bytes.len() != LENGTH_PREFIX_LEN {
                    self.note_recv_error(&format!("length prefix of {} bytes", bytes.len()));
                    return;
                }
                match body_len(bytes[0]) {
                    Ok(len) => self.request_read(ReadPhase::Body(len), len),
                    // the next pump re-reads the length byte
                    Err(e) => self.note_recv_error(&e.to_string()),
                }
            }
            ReadPhase::Body(len) => {
                if bytes.len() != len {
                    self.note_recv_error(&format!("expected {} body bytes, got {}", len, bytes.len()));
                    return;
                }
                let mut raw = Vec::with_capacity(LENGTH_PREFIX_LEN + len);
                raw.push(len as u8);
                raw.extend_from_slice(&bytes);
                trace!("rx [{}]", Hex(&raw));
                match self.codec.decode(&raw) {
                    Ok(frame) => self.process_frame(frame),
                    Err(e) => self.note_recv_error(&format!("discarding frame: {}", e)),
                }
            }
            ReadPhase::Idle => {}
        }
    }

    pub(super) fn process_frame(&mut self, frame: Frame) {
        match frame {
            Frame::Unnumbered { cmd } => self.on_unnumbered(cmd),
            Frame::Supervisory { kind, nr } => self.on_supervisory(kind, nr),
            Frame::Information { ns, nr, payload } => self.on_information(ns, nr, payload),
        }
    }

    /// RSET is honoured in every open state; UA only completes our own
    /// handshake.
    fn on_unnumbered(&mut self, cmd: UnnumberedCmd) {
        match cmd {
            UnnumberedCmd::Reset(params) => {
                debug!("peer RSET, window {}", params.window_size);
                let peer_window = Self::peer_window(&params);
                self.link_up(peer_window);
                self.ua_pending = true;
            }
            UnnumberedCmd::Ack => {
                if matches!(self.lifecycle, Lifecycle::Opening { .. }) {
                    debug!("UA received");
                    self.link_up(None);
                } else {
                    debug!("ignoring unsolicited UA");
                }
            }
        }
    }

    fn peer_window(params: &ResetParams) -> Option<u8> {
        if (MIN_WINDOW_SIZE..=MAX_WINDOW_SIZE).contains(&params.window_size) {
            Some(params.window_size)
        } else {
            warn!(
                "peer announced window {}, keeping the configured size",
                params.window_size
            );
            None
        }
    }

    fn on_supervisory(&mut self, kind: SupervisoryKind, nr: SeqNum) {
        if !self.lifecycle.is_up() {
            self.note_recv_error(&format!("{} before the link is up", kind));
            return;
        }
        trace!("{}({}) received", kind, nr);
        match kind {
            SupervisoryKind::ReceiveReady => {
                self.on_ack(nr);
                self.peer_busy = false;
                self.clear_error_counts();
            }
            SupervisoryKind::Reject => {
                self.on_reject(nr);
                self.note_recv_error(&format!("peer rejected from {}", nr));
            }
            SupervisoryKind::ReceiveNotReady => {
                self.on_ack(nr);
                self.peer_busy = true;
                self.note_recv_error("peer not ready");
            }
            SupervisoryKind::SelectiveReject => {
                self.send_reject();
                self.note_recv_error("SREJ is not supported");
            }
        }
    }

    fn on_information(&mut self, ns: SeqNum, nr: SeqNum, payload: Vec<u8>) {
        if !self.lifecycle.is_up() {
            self.note_recv_error(&format!("I({}) before the link is up", ns));
            return;
        }
        self.on_ack(nr);
        self.peer_busy = false;

        match self.sequencer.classify(ns) {
            Disposition::InOrder => {
                let batch_full = self.sequencer.accept(ns);
                self.clear_error_counts();
                trace!("accepted I({}), {} byte(s)", ns, payload.len());
                if payload.is_empty() {
                    debug!("empty I({}) acknowledged, nothing delivered", ns);
                } else {
                    self.deliver(payload);
                }
                if !self.config.piggyback_ack || batch_full {
                    self.ack_pending = true;
                    self.policy.disarm_ack(&mut self.timers);
                } else {
                    self.policy.arm_ack_if_idle(&mut self.timers);
                }
            }
            Disposition::Duplicate => {
                if self.config.reject_on_near_gap && self.sequencer.is_near_miss(ns) {
                    debug!("repeat of I({}), rejecting", ns);
                    self.send_reject();
                } else {
                    debug!("duplicate I({}) re-acknowledged", ns);
                    self.ack_pending = true;
                }
            }
            Disposition::Gap => {
                warn!("I({}) while expecting {}", ns, self.sequencer.expected());
                self.send_reject();
            }
        }
    }

    fn send_reject(&mut self) {
        if self.sequencer.reject_sent() || self.reject_pending {
            trace!("reject already outstanding");
            return;
        }
        self.reject_pending = true;
    }

    fn deliver(&mut self, payload: Vec<u8>) {
        if std::mem::replace(&mut self.receive_armed, false) {
            self.notify(Notification::ReceiveCompleted(payload));
        } else {
            self.notify(Notification::Received(payload));
        }
    }

    /// Free every slot `nr` acknowledges.
    pub(super) fn on_ack(&mut self, nr: SeqNum) {
        for slot in self.window.ack(nr) {
            self.policy.disarm_guard(&mut self.timers, slot.seq);
            debug!("I({}) acknowledged ({})", slot.seq, slot.id);
            self.notify(Notification::SendCompleted(slot.id));
        }
    }

    /// Ack up to `nr`, then queue everything still outstanding again.
    pub(super) fn on_reject(&mut self, nr: SeqNum) {
        self.on_ack(nr);
        self.peer_busy = false;
        let n = self.window.mark_sent_for_resend(SlotKind::Rejected);
        if n > 0 {
            debug!("resending {} frame(s) from {}", n, self.window.oldest());
        }
    }

    pub(super) fn on_timer_expired(&mut self, id: TimerId) {
        let Some(expiry) = self.policy.on_expiry(id) else {
            trace!("stale expiry of {}", id);
            return;
        };
        match expiry {
            Expiry::RetryReset => {
                warn!("no answer to RSET, retrying");
                self.begin_reset();
            }
            Expiry::ResetExhausted => self.fail_link(),
            Expiry::Guard(seq) => self.on_guard_timeout(seq),
            Expiry::FlushAck => {
                if self.sequencer.has_pending() {
                    trace!("delayed ack flushed");
                    self.ack_pending = true;
                }
            }
            // the pump that follows every event takes the write slot again
            Expiry::RetryWrite => trace!("retrying deferred write"),
        }
    }

    /// The frame `seq` went unacknowledged for a whole guard period.
    pub(super) fn on_guard_timeout(&mut self, seq: SeqNum) {
        let ceiling = self.config.retry_ceiling;
        let Some(slot) = self.window.get_mut(seq) else {
            self.policy.disarm_guard(&mut self.timers, seq);
            return;
        };
        slot.expiries += 1;
        slot.needs_tx = true;
        slot.kind = SlotKind::Resend;
        let exhausted = slot.expiries >= ceiling;
        if exhausted {
            slot.expiries = 0;
        }
        let duration = self.config.guard_timeout_after(slot.expiries);
        warn!("guard expired for I({})", seq);
        self.policy.arm_guard(&mut self.timers, seq, duration);

        if exhausted {
            self.note_send_error(&format!("I({}) unacknowledged after {} guard periods", seq, ceiling));
        }
    }
}
