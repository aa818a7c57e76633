// llcnfc-rs/llcnfc/src/link/outbound.rs

use super::state::Lifecycle;
use super::window::SlotKind;
use super::{InFlight, Link, ReadPhase, Transmit};
use crate::constants::LENGTH_PREFIX_LEN;
use crate::error::TransportError;
use crate::protocol::{Frame, FrameCodec, ResetParams, SupervisoryKind};
use crate::timer::TimerService;
use crate::transport::{Transport, TransportResult};
use crate::utils::Hex;
use log::{debug, error, trace, warn};

impl<T: Transport, M: TimerService, C: FrameCodec> Link<T, M, C> {
    /// Keep one read outstanding while the link is open.
    pub(super) fn ensure_read(&mut self) {
        if self.lifecycle.is_down() || self.read != ReadPhase::Idle {
            return;
        }
        self.request_read(ReadPhase::Length, LENGTH_PREFIX_LEN);
    }

    pub(super) fn request_read(&mut self, phase: ReadPhase, len: usize) {
        match self.transport.read(len) {
            Ok(()) => self.read = phase,
            Err(e) => {
                warn!("could not start read of {} byte(s): {}", len, e);
                self.read = ReadPhase::Idle;
            }
        }
    }

    /// Highest-priority transmission waiting for the write slot.
    ///
    /// Unnumbered frames go first. Before the link is up nothing else may
    /// be sent. An owed RR is only sent when no I-frame can carry it.
    fn next_transmit(&self) -> Option<Transmit> {
        if self.reset_pending {
            return Some(Transmit::Reset);
        }
        if self.ua_pending {
            return Some(Transmit::UnnumberedAck);
        }
        if !self.lifecycle.is_up() {
            return None;
        }
        if self.reject_pending {
            return Some(Transmit::Reject);
        }
        if let Some(seq) = self.window.next_to_transmit(self.peer_busy) {
            return Some(Transmit::Info(seq));
        }
        self.ack_pending.then_some(Transmit::Ack)
    }

    fn frame_for(&self, transmit: Transmit) -> Option<Frame> {
        let nr = self.sequencer.expected();
        Some(match transmit {
            Transmit::Reset => Frame::reset(ResetParams::new(
                self.config.window_size,
                self.config.baud_rate,
            )),
            Transmit::UnnumberedAck => Frame::unnumbered_ack(),
            Transmit::Ack => Frame::supervisory(SupervisoryKind::ReceiveReady, nr),
            Transmit::Reject => Frame::supervisory(SupervisoryKind::Reject, nr),
            Transmit::Info(seq) => {
                let slot = self.window.get(seq)?;
                Frame::information(seq, nr, slot.payload.clone())
            }
        })
    }

    /// Clear the reason `transmit` was queued.
    fn unqueue(&mut self, transmit: Transmit) {
        match transmit {
            Transmit::Reset => self.reset_pending = false,
            Transmit::UnnumberedAck => self.ua_pending = false,
            Transmit::Ack => self.ack_pending = false,
            Transmit::Reject => self.reject_pending = false,
            Transmit::Info(seq) => {
                if let Some(slot) = self.window.get_mut(seq) {
                    slot.needs_tx = false;
                }
            }
        }
    }

    /// Put `transmit` back in line after its write did not go through.
    fn requeue(&mut self, transmit: Transmit) {
        match transmit {
            Transmit::Reset => {
                self.reset_pending = matches!(self.lifecycle, Lifecycle::Opening { .. })
            }
            Transmit::UnnumberedAck => self.ua_pending = true,
            Transmit::Ack => self.ack_pending = true,
            Transmit::Reject => {
                self.reject_pending = true;
                self.sequencer.set_reject_sent(false);
            }
            Transmit::Info(seq) => {
                if let Some(slot) = self.window.get_mut(seq) {
                    slot.needs_tx = true;
                }
            }
        }
    }

    /// Move the next transmission into the write slot, if it is free.
    ///
    /// Returns the transmission and the error when the transport refused
    /// the write; its flag stays set so a later pump tries again.
    pub(super) fn dispatch(&mut self) -> Option<(Transmit, TransportError)> {
        if self.in_flight.is_some() {
            return None;
        }
        let transmit = self.next_transmit()?;
        let Some(frame) = self.frame_for(transmit) else {
            self.unqueue(transmit);
            return None;
        };
        let bytes = match self.codec.encode(&frame) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("cannot encode {}: {}", transmit, e);
                self.unqueue(transmit);
                return None;
            }
        };

        if let Err(e) = self.write_with_retry(&bytes) {
            return Some((transmit, e));
        }
        trace!("tx {} [{}]", transmit, Hex(&bytes));
        self.handed_off(transmit, &bytes);
        self.in_flight = Some(InFlight {
            transmit,
            bytes,
            busy_retries: 0,
            epoch: self.epoch,
        });
        None
    }

    /// Write, retrying in place while the driver reports busy.
    fn write_with_retry(&mut self, bytes: &[u8]) -> TransportResult<()> {
        let mut attempts = 0u8;
        loop {
            match self.transport.write(bytes) {
                Err(TransportError::Busy) if attempts < self.config.busy_retry_limit => {
                    attempts += 1;
                }
                other => return other,
            }
        }
    }

    /// Bookkeeping for a frame the transport accepted.
    fn handed_off(&mut self, transmit: Transmit, bytes: &[u8]) {
        self.unqueue(transmit);
        match transmit {
            Transmit::Reset | Transmit::UnnumberedAck => {}
            Transmit::Ack | Transmit::Reject | Transmit::Info(_) => {
                // every I and S frame carries the current N(R)
                self.ack_pending = false;
                self.sequencer.acknowledged();
                self.policy.disarm_ack(&mut self.timers);
            }
        }
        match transmit {
            Transmit::Reject => self.sequencer.set_reject_sent(true),
            Transmit::Info(seq) => {
                let Some(slot) = self.window.get_mut(seq) else {
                    return;
                };
                slot.sent = true;
                slot.encoded = bytes.to_vec();
                let duration = self.config.guard_timeout_after(slot.expiries);
                if slot.kind != SlotKind::Original {
                    debug!("retransmitting I({}) ({})", seq, slot.kind);
                }
                self.policy.arm_guard(&mut self.timers, seq, duration);
            }
            _ => {}
        }
    }

    pub(super) fn on_write_complete(&mut self, result: TransportResult<()>) {
        let Some(mut flight) = self.in_flight.take() else {
            debug!("write completion with no write outstanding");
            return;
        };
        let err = match result {
            Ok(()) => {
                trace!("{} written", flight.transmit);
                return;
            }
            Err(e) => e,
        };

        if flight.epoch != self.epoch {
            debug!("dropping failed write of {} from before a reset", flight.transmit);
            return;
        }
        if err.is_transient() && flight.busy_retries < self.config.busy_retry_limit {
            flight.busy_retries += 1;
            trace!("{} busy, retry {}", flight.transmit, flight.busy_retries);
            match self.transport.write(&flight.bytes) {
                Ok(()) => {
                    self.in_flight = Some(flight);
                    return;
                }
                Err(e) => {
                    self.requeue(flight.transmit);
                    self.on_write_failure(flight.transmit, e);
                    return;
                }
            }
        }
        self.requeue(flight.transmit);
        self.on_write_failure(flight.transmit, err);
    }
}
