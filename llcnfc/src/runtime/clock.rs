// llcnfc-rs/llcnfc/src/runtime/clock.rs

use super::Internal;
use crate::timer::{TimerId, TimerService};
use log::trace;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// [`TimerService`] backed by `tokio::time::sleep` tasks.
///
/// Every start gets a fresh token. An expiry that raced with a later
/// `start` or `cancel` carries an outdated token and is discarded by
/// [`take_if_current`](Self::take_if_current).
pub struct TokioTimers {
    events: mpsc::UnboundedSender<Internal>,
    tasks: HashMap<TimerId, (u64, JoinHandle<()>)>,
    next_token: u64,
}

impl TokioTimers {
    pub(crate) fn new(events: mpsc::UnboundedSender<Internal>) -> Self {
        Self {
            events,
            tasks: HashMap::new(),
            next_token: 0,
        }
    }

    /// Consume the expiry of `id` if `token` belongs to its latest start.
    pub(crate) fn take_if_current(&mut self, id: TimerId, token: u64) -> bool {
        match self.tasks.get(&id) {
            Some((current, _)) if *current == token => {
                self.tasks.remove(&id);
                true
            }
            _ => {
                trace!("dropping stale expiry of {}", id);
                false
            }
        }
    }

    /// Timers started and neither fired nor cancelled.
    pub fn armed_count(&self) -> usize {
        self.tasks.len()
    }
}

impl TimerService for TokioTimers {
    fn start(&mut self, id: TimerId, duration: Duration) {
        if let Some((_, task)) = self.tasks.remove(&id) {
            task.abort();
        }
        let token = self.next_token;
        self.next_token = self.next_token.wrapping_add(1);
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            // the link task is gone when this fails
            let _ = events.send(Internal::Timer { id, token });
        });
        self.tasks.insert(id, (token, task));
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some((_, task)) = self.tasks.remove(&id) {
            task.abort();
        }
    }
}

impl Drop for TokioTimers {
    fn drop(&mut self) {
        for (_, (_, task)) in self.tasks.drain() {
            task.abort();
        }
    }
}
