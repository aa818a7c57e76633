//! Test support helpers intended for use by unit and integration tests.
//!
//! These helpers centralize the MockTransport / MockTimers plumbing so tests
//! across the crate and tests/ directory drive a [`Link`] the same way: the
//! harness plays the transport driver and the timer service, delivering
//! completions by hand.
#![allow(dead_code)]

use crate::config::LinkConfig;
use crate::link::{Event, Link, Notification};
use crate::protocol::Frame;
use crate::protocol::parser::body_len;
use crate::timer::{MockTimers, TimerId};
use crate::transport::MockTransport;
use crate::{Result, TransportError};

/// Link wired to the recording mocks.
pub type MockLink = Link<MockTransport, MockTimers>;

/// Drives a [`MockLink`] by hand.
#[doc(hidden)]
pub struct Harness {
    pub link: MockLink,
}

impl Harness {
    /// Unopened link.
    pub fn new(config: LinkConfig) -> Result<Self> {
        let link = Link::new(config, MockTransport::new(), MockTimers::new())?;
        Ok(Self { link })
    }

    /// Link that completed the RSET/UA handshake. Notifications and the
    /// write log are cleared.
    pub fn opened(config: LinkConfig) -> Result<Self> {
        let mut h = Self::new(config)?;
        h.link.init()?;
        h.complete_write();
        h.deliver(&Frame::unnumbered_ack());
        h.link.drain_notifications();
        h.link.transport_mut().take_written();
        Ok(h)
    }

    /// Finish the outstanding write successfully. Returns the frame that
    /// was written, or `None` when nothing was outstanding.
    pub fn complete_write(&mut self) -> Option<Frame> {
        if !self.link.transport_mut().finish_write() {
            return None;
        }
        let frame = self
            .link
            .transport()
            .last_written()
            .and_then(|bytes| Frame::decode(bytes).ok());
        self.link.handle_event(Event::WriteComplete(Ok(())));
        frame
    }

    /// Finish the outstanding write with `err`.
    pub fn fail_write(&mut self, err: TransportError) -> bool {
        if !self.link.transport_mut().finish_write() {
            return false;
        }
        self.link.handle_event(Event::WriteComplete(Err(err)));
        true
    }

    /// Complete writes until the link stops issuing new ones.
    pub fn flush_writes(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        for _ in 0..64 {
            match self.complete_write() {
                Some(frame) => frames.push(frame),
                None => break,
            }
        }
        frames
    }

    /// Deliver `frame` from the peer through the two-phase read.
    pub fn deliver(&mut self, frame: &Frame) {
        match frame.encode() {
            Ok(bytes) => self.deliver_bytes(&bytes),
            Err(e) => panic!("test frame does not encode: {}", e),
        }
    }

    /// Deliver raw bytes: the first byte answers the length read, the rest
    /// answers the body read if the length was acceptable.
    pub fn deliver_bytes(&mut self, bytes: &[u8]) {
        let Some((&prefix, body)) = bytes.split_first() else {
            return;
        };
        self.feed_read(vec![prefix]);
        if body_len(prefix).is_ok() {
            self.feed_read(body.to_vec());
        }
    }

    fn feed_read(&mut self, data: Vec<u8>) {
        let pending = self.link.transport_mut().take_read();
        assert!(pending.is_some(), "link has no read outstanding");
        self.link.handle_event(Event::ReadComplete(Ok(data)));
    }

    /// Fire `id` as the timer service would.
    pub fn expire(&mut self, id: TimerId) {
        self.link.timers_mut().fire(id);
        self.link.handle_event(Event::TimerExpired(id));
    }

    /// Every frame written so far, decoded.
    pub fn written_frames(&self) -> Vec<Frame> {
        self.link
            .transport()
            .written
            .iter()
            .filter_map(|bytes| Frame::decode(bytes).ok())
            .collect()
    }

    /// Take the write log, decoded.
    pub fn take_frames(&mut self) -> Vec<Frame> {
        self.link
            .transport_mut()
            .take_written()
            .iter()
            .filter_map(|bytes| Frame::decode(bytes).ok())
            .collect()
    }

    pub fn notifications(&mut self) -> Vec<Notification> {
        self.link.drain_notifications()
    }

    /// Check the structural guarantees of the link; the message names the
    /// first one that does not hold.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        let link = &self.link;
        let status = link.status();
        if status.outstanding > status.window_size as usize {
            return Err(format!(
                "{} outstanding frames in a window of {}",
                status.outstanding, status.window_size
            ));
        }
        if link.transport().overlapping_writes > 0 {
            return Err("write started while another was outstanding".into());
        }
        if link.transport().write_outstanding != link.write_pending() {
            return Err("transport and link disagree about the outstanding write".into());
        }
        let armed = link.armed_timers();
        let mut sent = 0;
        for slot in link.outstanding() {
            let guard = armed.contains(&TimerId::Guard(slot.seq));
            if guard != slot.sent {
                return Err(format!(
                    "I({}) sent={} but guard armed={}",
                    slot.seq, slot.sent, guard
                ));
            }
            sent += usize::from(slot.sent);
        }
        let guards = armed
            .iter()
            .filter(|id| matches!(id, TimerId::Guard(_)))
            .count();
        if guards != sent {
            return Err(format!("{} guards armed for {} sent frames", guards, sent));
        }
        if armed.iter().filter(|id| **id == TimerId::Connection).count() > 1 {
            return Err("more than one connection timer".into());
        }
        if armed.len() != link.timers().armed_count() {
            return Err(format!(
                "link tracks {} timers, service has {}",
                armed.len(),
                link.timers().armed_count()
            ));
        }
        Ok(())
    }
}
