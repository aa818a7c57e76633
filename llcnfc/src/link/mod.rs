// llcnfc-rs/llcnfc/src/link/mod.rs

//! Link engine: one reliable, ordered channel over a byte transport.
//!
//! The [`Link`] is a single-threaded reactive state machine. Upper-layer
//! calls (`init`, `send`, `receive`, `release`) and completions from the
//! transport and timer service ([`Event`]) are its only entry points; every
//! entry point runs to completion without blocking and leaves the results
//! for the upper layer in a [`Notification`] queue.

mod inbound;
mod outbound;
#[allow(missing_docs)]
pub mod ring;
#[allow(missing_docs)]
pub mod sequencer;
pub mod state;
#[allow(missing_docs)]
pub mod timers;
#[allow(missing_docs)]
pub mod window;

pub use state::LinkState;

use crate::config::LinkConfig;
use crate::constants::MAX_PAYLOAD_LEN;
use crate::error::TransportError;
use crate::protocol::{Frame, FrameCodec, LlcCodec};
use crate::timer::{TimerId, TimerService};
use crate::transport::{Transport, TransportResult};
use crate::types::{SendId, SeqNum};
use crate::{Error, Result};
use log::{debug, error, warn};
use sequencer::ReceiveSequencer;
use state::Lifecycle;
use std::collections::VecDeque;
use timers::TimerPolicy;
use window::{SendWindow, Slot};

/// Completion delivered to [`Link::handle_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The write started by the link finished.
    WriteComplete(TransportResult<()>),
    /// The read started by the link finished with these bytes.
    ReadComplete(TransportResult<Vec<u8>>),
    /// A timer started by the link fired.
    TimerExpired(TimerId),
}

/// Upward notification, drained with [`Link::poll_notification`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The handshake started by `init()` completed.
    InitCompleted,
    /// `init()` gave up after the configured number of RSET attempts.
    InitFailed,
    /// A recovery or peer-initiated reset completed; outstanding frames
    /// were renumbered and are being retransmitted.
    LinkReset,
    /// A recovery reset went unanswered; the link is unusable.
    LinkDown,
    /// The peer acknowledged this frame.
    SendCompleted(SendId),
    /// The frame was dropped without being acknowledged.
    SendFailed(SendId),
    /// Payload for a `receive()` registration.
    ReceiveCompleted(Vec<u8>),
    /// Payload that arrived with no `receive()` registered.
    Received(Vec<u8>),
}

/// Snapshot of the counters and rings, for diagnostics and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct LinkStatus {
    pub state: LinkState,
    /// Negotiated window.
    pub window_size: u8,
    /// N(S) of the next new I-frame.
    pub next_send: SeqNum,
    /// N(S) the next in-order I-frame must carry.
    pub expected_recv: SeqNum,
    /// Unacknowledged frames in the send window.
    pub outstanding: usize,
    /// Accepted frames whose acknowledgment is still held back.
    pub pending_acks: usize,
    pub recv_errors: u16,
    pub send_errors: u16,
    pub armed_timers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadPhase {
    /// No read outstanding.
    Idle,
    Length,
    Body(usize),
}

/// What occupies the single write slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
enum Transmit {
    #[display(fmt = "RSET")]
    Reset,
    #[display(fmt = "UA")]
    UnnumberedAck,
    #[display(fmt = "RR")]
    Ack,
    #[display(fmt = "REJ")]
    Reject,
    #[display(fmt = "I({})", _0)]
    Info(SeqNum),
}

#[derive(Debug)]
struct InFlight {
    transmit: Transmit,
    bytes: Vec<u8>,
    busy_retries: u8,
    epoch: u32,
}

/// LLC link over transport `T`, timer service `M` and frame codec `C`.
pub struct Link<T, M, C = LlcCodec> {
    config: LinkConfig,
    transport: T,
    timers: M,
    codec: C,
    lifecycle: Lifecycle,
    window: SendWindow,
    sequencer: ReceiveSequencer,
    policy: TimerPolicy,
    read: ReadPhase,
    in_flight: Option<InFlight>,
    reset_pending: bool,
    ua_pending: bool,
    ack_pending: bool,
    reject_pending: bool,
    peer_busy: bool,
    recv_errors: u16,
    send_errors: u16,
    receive_armed: bool,
    next_id: u64,
    /// Bumped whenever sequence numbers are reassigned or the link is torn
    /// down; completions of older writes are not retried.
    epoch: u32,
    notifications: VecDeque<Notification>,
}

impl<T: Transport, M: TimerService> Link<T, M, LlcCodec> {
    /// Create an unopened link using the LLC wire format.
    pub fn new(config: LinkConfig, transport: T, timers: M) -> Result<Self> {
        Self::with_codec(config, transport, timers, LlcCodec)
    }
}

impl<T: Transport, M: TimerService, C: FrameCodec> Link<T, M, C> {
    /// Create an unopened link with a custom frame codec.
    pub fn with_codec(config: LinkConfig, transport: T, timers: M, codec: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            window: SendWindow::new(config.window_size),
            sequencer: ReceiveSequencer::new(config.window_size),
            policy: TimerPolicy::new(&config),
            config,
            transport,
            timers,
            codec,
            lifecycle: Lifecycle::Down { failed: false },
            read: ReadPhase::Idle,
            in_flight: None,
            reset_pending: false,
            ua_pending: false,
            ack_pending: false,
            reject_pending: false,
            peer_busy: false,
            recv_errors: 0,
            send_errors: 0,
            receive_armed: false,
            next_id: 0,
            epoch: 0,
            notifications: VecDeque::new(),
        })
    }

    /// Configuration the link was created with.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// The owned transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the owned transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// The owned timer service.
    pub fn timers(&self) -> &M {
        &self.timers
    }

    /// Mutable access to the owned timer service.
    pub fn timers_mut(&mut self) -> &mut M {
        &mut self.timers
    }

    /// Current externally observable state.
    pub fn state(&self) -> LinkState {
        match self.lifecycle {
            Lifecycle::Down { .. } => LinkState::Uninitialised,
            Lifecycle::Opening { .. } => LinkState::Initialising,
            Lifecycle::Up if self.window.resending() => LinkState::Resending,
            Lifecycle::Up if self.in_flight.is_some() => LinkState::Sending,
            Lifecycle::Up if matches!(self.read, ReadPhase::Body(_)) => LinkState::ReceiveWait,
            Lifecycle::Up if self.receive_armed => LinkState::Receiving,
            Lifecycle::Up => LinkState::Initialised,
        }
    }

    /// The handshake completed and no reset is in progress.
    pub fn is_up(&self) -> bool {
        self.lifecycle.is_up()
    }

    /// Negotiated window size.
    pub fn window_size(&self) -> u8 {
        self.window.window_size()
    }

    /// Snapshot of state, counters and ring occupancy.
    pub fn status(&self) -> LinkStatus {
        LinkStatus {
            state: self.state(),
            window_size: self.window.window_size(),
            next_send: self.window.next_send(),
            expected_recv: self.sequencer.expected(),
            outstanding: self.window.len(),
            pending_acks: self.sequencer.pending_len(),
            recv_errors: self.recv_errors,
            send_errors: self.send_errors,
            armed_timers: self.policy.armed_count(),
        }
    }

    /// Timers the link currently considers armed.
    pub fn armed_timers(&self) -> Vec<TimerId> {
        self.policy.armed()
    }

    /// Outstanding frames, oldest first.
    pub fn outstanding(&self) -> impl Iterator<Item = &Slot> {
        self.window.iter()
    }

    /// A physical write is outstanding.
    pub fn write_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Oldest undelivered notification.
    pub fn poll_notification(&mut self) -> Option<Notification> {
        self.notifications.pop_front()
    }

    /// Every undelivered notification, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    /// Open the link: send RSET and wait for the peer's answer.
    ///
    /// Calling this on an open link first tears it down (dropping every
    /// buffered frame) and then starts over exactly like a fresh open.
    pub fn init(&mut self) -> Result<()> {
        if !self.lifecycle.is_down() {
            debug!("re-initialising link from {}", self.state());
            self.teardown();
        }
        debug!("opening link, window {}", self.config.window_size);
        self.lifecycle = Lifecycle::Opening { explicit: true };
        self.begin_reset();
        self.pump();
        Ok(())
    }

    /// Close the link. Every timer is cancelled, in-flight I/O aborted and
    /// all buffered frames and notifications discarded.
    pub fn release(&mut self) -> Result<()> {
        if !self.lifecycle.is_down() {
            debug!("releasing link");
            self.teardown();
        }
        self.notifications.clear();
        self.lifecycle = Lifecycle::Down { failed: false };
        Ok(())
    }

    fn check_usable(&self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Down { failed: true } => Err(Error::LinkDown),
            Lifecycle::Down { failed: false } | Lifecycle::Opening { explicit: true } => {
                Err(Error::NotInitialised)
            }
            Lifecycle::Opening { explicit: false } | Lifecycle::Up => Ok(()),
        }
    }

    /// Queue `payload` as the next I-frame.
    ///
    /// Fails with `Busy` when the window is full; the caller retries after
    /// a `SendCompleted`. `SendCompleted(id)` follows once the peer
    /// acknowledges the frame.
    pub fn send(&mut self, payload: &[u8]) -> Result<SendId> {
        self.check_usable()?;
        if payload.is_empty() {
            return Err(Error::EmptyPayload);
        }
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(Error::PayloadTooLarge {
                max: MAX_PAYLOAD_LEN,
                actual: payload.len(),
            });
        }

        let id = SendId(self.next_id);
        let seq = self.window.submit(id, payload.to_vec())?;
        self.next_id += 1;
        debug!("queued {} as I({}), {} outstanding", id, seq, self.window.len());

        self.ensure_read();
        match self.dispatch() {
            Some((Transmit::Info(failed), err)) if failed == seq && !err.is_transient() => {
                warn!("write of I({}) failed: {}", seq, err);
                self.window.pop_newest();
                self.next_id -= 1;
                Err(Error::Transport(err))
            }
            Some((transmit, err)) => {
                self.on_write_failure(transmit, err);
                Ok(id)
            }
            None => Ok(id),
        }
    }

    /// Register for the next in-order payload; it arrives as
    /// `ReceiveCompleted`.
    pub fn receive(&mut self) -> Result<()> {
        self.check_usable()?;
        self.receive_armed = true;
        Ok(())
    }

    /// Single mutation path for transport and timer completions.
    pub fn handle_event(&mut self, event: Event) {
        if self.lifecycle.is_down() {
            debug!("ignoring {:?} on a closed link", event);
            return;
        }
        match event {
            Event::WriteComplete(result) => self.on_write_complete(result),
            Event::ReadComplete(result) => self.on_read_complete(result),
            Event::TimerExpired(id) => self.on_timer_expired(id),
        }
        self.pump();
    }

    /// Feed a frame that was decoded outside the link's own read path.
    pub fn on_frame_decoded(&mut self, frame: Frame) {
        if self.lifecycle.is_down() {
            return;
        }
        self.process_frame(frame);
        self.pump();
    }

    fn notify(&mut self, n: Notification) {
        self.notifications.push_back(n);
    }

    /// Keep a read outstanding and the write slot busy.
    fn pump(&mut self) {
        self.ensure_read();
        if let Some((transmit, err)) = self.dispatch() {
            self.on_write_failure(transmit, err);
        }
    }

    /// Queue RSET and (re)start the connection timer.
    fn begin_reset(&mut self) {
        self.reset_pending = true;
        self.policy.arm_connection(&mut self.timers);
        debug!("RSET attempt {}", self.policy.reset_attempts());
    }

    /// Recover by redoing the handshake while keeping outstanding frames.
    fn restart(&mut self, reason: &str) {
        if !self.lifecycle.is_up() {
            return;
        }
        warn!("resetting link: {}", reason);
        self.lifecycle = Lifecycle::Opening { explicit: false };
        self.policy.disarm_ack(&mut self.timers);
        self.policy.disarm_all_guards(&mut self.timers);
        let window_size = self.window.window_size();
        let dropped = self.window.renumber(window_size);
        self.fail_slots(dropped);
        self.sequencer.reset(window_size);
        self.ua_pending = false;
        self.ack_pending = false;
        self.reject_pending = false;
        self.peer_busy = false;
        self.epoch = self.epoch.wrapping_add(1);
        self.begin_reset();
    }

    /// Handshake completed, by UA or by the peer's own RSET.
    fn link_up(&mut self, peer_window: Option<u8>) {
        let window_size = peer_window.map_or(self.config.window_size, |w| {
            w.min(self.config.window_size)
        });
        let previous = self.lifecycle;

        self.policy.disarm_connection(&mut self.timers);
        self.policy.disarm_ack(&mut self.timers);
        self.policy.disarm_all_guards(&mut self.timers);
        let dropped = self.window.renumber(window_size);
        self.fail_slots(dropped);
        self.sequencer.reset(window_size);
        self.reset_pending = false;
        self.ack_pending = false;
        self.reject_pending = false;
        self.peer_busy = false;
        self.recv_errors = 0;
        self.send_errors = 0;
        self.epoch = self.epoch.wrapping_add(1);
        self.lifecycle = Lifecycle::Up;

        debug!(
            "link up, window {}, {} frame(s) carried over",
            window_size,
            self.window.len()
        );
        match previous {
            Lifecycle::Opening { explicit: true } => self.notify(Notification::InitCompleted),
            _ => self.notify(Notification::LinkReset),
        }
    }

    /// RSET went unanswered too often.
    fn fail_link(&mut self) {
        let explicit = matches!(self.lifecycle, Lifecycle::Opening { explicit: true });
        error!(
            "no answer after {} RSET attempts, link {}",
            self.policy.reset_attempts(),
            if explicit { "initialisation failed" } else { "down" }
        );
        self.teardown();
        self.notify(if explicit {
            Notification::InitFailed
        } else {
            Notification::LinkDown
        });
        self.lifecycle = Lifecycle::Down { failed: true };
    }

    /// Release every resource; outstanding frames fail.
    fn teardown(&mut self) {
        self.policy.cancel_all(&mut self.timers);
        self.transport.abort();
        self.in_flight = None;
        self.read = ReadPhase::Idle;
        let dropped = self.window.clear(self.config.window_size);
        self.fail_slots(dropped);
        self.sequencer.reset(self.config.window_size);
        self.reset_pending = false;
        self.ua_pending = false;
        self.ack_pending = false;
        self.reject_pending = false;
        self.peer_busy = false;
        self.recv_errors = 0;
        self.send_errors = 0;
        self.receive_armed = false;
        self.epoch = self.epoch.wrapping_add(1);
    }

    fn fail_slots(&mut self, slots: Vec<Slot>) {
        for slot in slots {
            debug!("dropping {} ({})", slot.id, slot.seq);
            self.notify(Notification::SendFailed(slot.id));
        }
    }

    fn note_recv_error(&mut self, what: &str) {
        self.recv_errors = self.recv_errors.saturating_add(1);
        warn!("receive error {}/{}: {}", self.recv_errors, self.config.recv_error_ceiling, what);
        if self.recv_errors >= self.config.recv_error_ceiling {
            self.restart("receive error ceiling reached");
        }
    }

    fn note_send_error(&mut self, what: &str) {
        self.send_errors = self.send_errors.saturating_add(1);
        warn!("send error {}/{}: {}", self.send_errors, self.config.send_error_ceiling, what);
        if self.send_errors >= self.config.send_error_ceiling {
            self.restart("send error ceiling reached");
        }
    }

    fn clear_error_counts(&mut self) {
        self.recv_errors = 0;
        self.send_errors = 0;
    }

    fn on_write_failure(&mut self, transmit: Transmit, err: TransportError) {
        if err.is_transient() {
            debug!("{} deferred, transport still busy", transmit);
            self.policy.arm_write_retry_if_idle(&mut self.timers);
            return;
        }
        self.note_send_error(&format!("write of {} failed: {}", transmit, err));
    }
}

impl<T, M, C> std::fmt::Debug for Link<T, M, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link")
            .field("lifecycle", &self.lifecycle)
            .field("window", &self.window)
            .field("sequencer", &self.sequencer)
            .field("read", &self.read)
            .field("in_flight", &self.in_flight.as_ref().map(|f| f.transmit))
            .field("recv_errors", &self.recv_errors)
            .field("send_errors", &self.send_errors)
            .finish()
    }
}
