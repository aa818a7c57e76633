// llcnfc-rs/llcnfc/src/timer/mock.rs

use crate::timer::traits::{TimerId, TimerService};
use std::collections::HashMap;
use std::time::Duration;

/// Timer service that only records; tests fire expiries by hand.
#[derive(Debug, Default)]
pub struct MockTimers {
    /// Currently armed timers and their durations.
    pub armed: HashMap<TimerId, Duration>,
    /// Every `start` call, in order.
    pub started: Vec<(TimerId, Duration)>,
    /// Every `cancel` call, in order (including no-op cancels).
    pub cancelled: Vec<TimerId>,
}

impl MockTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.armed.contains_key(&id)
    }

    pub fn duration(&self, id: TimerId) -> Option<Duration> {
        self.armed.get(&id).copied()
    }

    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }

    /// Remove `id` as if it fired. Returns whether it was armed.
    pub fn fire(&mut self, id: TimerId) -> bool {
        self.armed.remove(&id).is_some()
    }
}

impl TimerService for MockTimers {
    fn start(&mut self, id: TimerId, duration: Duration) {
        self.armed.insert(id, duration);
        self.started.push((id, duration));
    }

    fn cancel(&mut self, id: TimerId) {
        self.armed.remove(&id);
        self.cancelled.push(id);
    }
}
