// llcnfc-rs/llcnfc/src/link/timers.rs

use crate::config::LinkConfig;
use crate::constants::SEQ_MODULUS;
use crate::timer::{TimerId, TimerService};
use crate::types::SeqNum;
use std::time::Duration;

/// Action owed to an expired timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Retransmit RSET and keep waiting.
    RetryReset,
    /// Every RSET attempt went unanswered.
    ResetExhausted,
    /// The frame with this N(S) is still unacknowledged.
    Guard(SeqNum),
    /// Send the acknowledgment that has been held back.
    FlushAck,
    /// Try the write slot again after the driver stayed busy.
    RetryWrite,
}

/// Bookkeeping for the connection, guard, delayed-ack and write-retry timers.
///
/// The link only talks to the [`TimerService`] through this type, so the
/// armed set seen here always matches what was started and not cancelled.
#[derive(Debug)]
pub struct TimerPolicy {
    connection_timeout: Duration,
    ack_timeout: Duration,
    retry_delay: Duration,
    max_reset_attempts: u16,
    connection: bool,
    delayed_ack: bool,
    write_retry: bool,
    guards: [bool; SEQ_MODULUS as usize],
    reset_attempts: u16,
}

impl TimerPolicy {
    pub fn new(config: &LinkConfig) -> Self {
        Self {
            connection_timeout: config.connection_timeout,
            ack_timeout: config.ack_timeout,
            retry_delay: config.busy_retry_delay,
            max_reset_attempts: config.max_reset_attempts,
            connection: false,
            delayed_ack: false,
            write_retry: false,
            guards: [false; SEQ_MODULUS as usize],
            reset_attempts: 0,
        }
    }

    pub fn reset_attempts(&self) -> u16 {
        self.reset_attempts
    }

    /// Start (or restart) the connection timer for one more RSET attempt.
    pub fn arm_connection<S: TimerService>(&mut self, timers: &mut S) {
        self.reset_attempts = self.reset_attempts.saturating_add(1);
        timers.start(TimerId::Connection, self.connection_timeout);
        self.connection = true;
    }

    pub fn disarm_connection<S: TimerService>(&mut self, timers: &mut S) {
        if std::mem::replace(&mut self.connection, false) {
            timers.cancel(TimerId::Connection);
        }
        self.reset_attempts = 0;
    }

    /// Start (or restart) the guard for `seq`.
    pub fn arm_guard<S: TimerService>(&mut self, timers: &mut S, seq: SeqNum, duration: Duration) {
        timers.start(TimerId::Guard(seq), duration);
        self.guards[seq.value() as usize] = true;
    }

    pub fn disarm_guard<S: TimerService>(&mut self, timers: &mut S, seq: SeqNum) {
        let armed = &mut self.guards[seq.value() as usize];
        if std::mem::replace(armed, false) {
            timers.cancel(TimerId::Guard(seq));
        }
    }

    pub fn disarm_all_guards<S: TimerService>(&mut self, timers: &mut S) {
        for n in 0..SEQ_MODULUS {
            self.disarm_guard(timers, SeqNum::new(n));
        }
    }

    /// Arm the delayed-ack timer unless it already runs.
    pub fn arm_ack_if_idle<S: TimerService>(&mut self, timers: &mut S) {
        if !self.delayed_ack {
            timers.start(TimerId::DelayedAck, self.ack_timeout);
            self.delayed_ack = true;
        }
    }

    pub fn disarm_ack<S: TimerService>(&mut self, timers: &mut S) {
        if std::mem::replace(&mut self.delayed_ack, false) {
            timers.cancel(TimerId::DelayedAck);
        }
    }

    /// Arm the write-retry timer unless it already runs.
    pub fn arm_write_retry_if_idle<S: TimerService>(&mut self, timers: &mut S) {
        if !self.write_retry {
            timers.start(TimerId::WriteRetry, self.retry_delay);
            self.write_retry = true;
        }
    }

    pub fn disarm_write_retry<S: TimerService>(&mut self, timers: &mut S) {
        if std::mem::replace(&mut self.write_retry, false) {
            timers.cancel(TimerId::WriteRetry);
        }
    }

    pub fn cancel_all<S: TimerService>(&mut self, timers: &mut S) {
        self.disarm_connection(timers);
        self.disarm_ack(timers);
        self.disarm_write_retry(timers);
        self.disarm_all_guards(timers);
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        match id {
            TimerId::Connection => self.connection,
            TimerId::DelayedAck => self.delayed_ack,
            TimerId::WriteRetry => self.write_retry,
            TimerId::Guard(seq) => self.guards[seq.value() as usize],
        }
    }

    pub fn armed(&self) -> Vec<TimerId> {
        let mut out = Vec::new();
        if self.connection {
            out.push(TimerId::Connection);
        }
        if self.delayed_ack {
            out.push(TimerId::DelayedAck);
        }
        if self.write_retry {
            out.push(TimerId::WriteRetry);
        }
        for n in 0..SEQ_MODULUS {
            if self.guards[n as usize] {
                out.push(TimerId::Guard(SeqNum::new(n)));
            }
        }
        out
    }

    pub fn armed_count(&self) -> usize {
        usize::from(self.connection)
            + usize::from(self.delayed_ack)
            + usize::from(self.write_retry)
            + self.guards.iter().filter(|g| **g).count()
    }

    /// Translate an expiry into the action it calls for. Expiries of
    /// timers that were cancelled in the meantime yield `None`.
    pub fn on_expiry(&mut self, id: TimerId) -> Option<Expiry> {
        match id {
            TimerId::Connection => {
                if !std::mem::replace(&mut self.connection, false) {
                    return None;
                }
                if self.reset_attempts >= self.max_reset_attempts {
                    Some(Expiry::ResetExhausted)
                } else {
                    Some(Expiry::RetryReset)
                }
            }
            TimerId::DelayedAck => {
                std::mem::replace(&mut self.delayed_ack, false).then_some(Expiry::FlushAck)
            }
            TimerId::WriteRetry => {
                std::mem::replace(&mut self.write_retry, false).then_some(Expiry::RetryWrite)
            }
            // the guard stays armed until the frame is acknowledged; the
            // link restarts it with a longer duration
            TimerId::Guard(seq) => self.guards[seq.value() as usize].then_some(Expiry::Guard(seq)),
        }
    }
}
