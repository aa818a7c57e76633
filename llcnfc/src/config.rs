// llcnfc-rs/llcnfc/src/config.rs

//! Runtime-selectable link options and timer durations

use crate::constants::{MAX_WINDOW_SIZE, MIN_WINDOW_SIZE};
use crate::types::BaudRate;
use crate::{Error, Result};
use std::time::Duration;

/// Connection timer: bounds one RSET/UA exchange.
pub const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 500;

/// Guard timer: bounds the wait for an acknowledgment of one I-frame.
pub const DEFAULT_GUARD_TIMEOUT_MS: u64 = 1000;

/// Added to the guard timeout for every expiry of the same frame.
pub const DEFAULT_GUARD_BACKOFF_MS: u64 = 10;

/// Delayed-ack timer, only used with `piggyback_ack`.
pub const DEFAULT_ACK_TIMEOUT_MS: u64 = 50;

/// Guard expiries of one frame before it counts as a send error.
pub const DEFAULT_RETRY_CEILING: u16 = 3;
/// RSET transmissions per handshake.
pub const DEFAULT_MAX_RESET_ATTEMPTS: u16 = 3;
/// Receive errors tolerated before a recovery reset.
pub const DEFAULT_RECV_ERROR_CEILING: u16 = 10;
/// Send errors tolerated before a recovery reset.
pub const DEFAULT_SEND_ERROR_CEILING: u16 = 1;
/// Immediate re-issues of a busy write.
pub const DEFAULT_BUSY_RETRY_LIMIT: u8 = 8;

/// Pause before trying again once the busy retries are used up.
pub const DEFAULT_BUSY_RETRY_DELAY_MS: u64 = 10;

/// Options passed to [`Link::new`](crate::link::Link::new).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkConfig {
    /// Batch acknowledgments until the window fills or the ack timer fires.
    pub piggyback_ack: bool,
    /// Answer a repeat of the previous frame with REJ instead of RR.
    pub reject_on_near_gap: bool,
    /// Window announced in RSET.
    pub window_size: u8,
    /// Guard expiries of one frame before it counts as a send error.
    pub retry_ceiling: u16,
    /// RSET transmissions per handshake before giving up.
    pub max_reset_attempts: u16,
    /// Receive errors (bad frames, REJ from the peer) before a recovery reset.
    pub recv_error_ceiling: u16,
    /// Send errors (failed writes, exhausted guards) before a recovery reset.
    pub send_error_ceiling: u16,
    /// Immediate re-issues of a write the driver reported busy.
    pub busy_retry_limit: u8,
    /// Wait before the write slot is tried again after `busy_retry_limit`.
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub busy_retry_delay: Duration,
    /// Bounds one RSET/UA exchange.
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub connection_timeout: Duration,
    /// Base wait for the acknowledgment of one I-frame.
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub guard_timeout: Duration,
    /// Added to `guard_timeout` for each expiry of the same frame.
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub guard_backoff: Duration,
    /// Longest an acknowledgment is held back with `piggyback_ack`.
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub ack_timeout: Duration,
    /// Line rate announced in RSET; `None` omits the parameter.
    pub baud_rate: Option<BaudRate>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            piggyback_ack: false,
            reject_on_near_gap: false,
            window_size: MAX_WINDOW_SIZE,
            retry_ceiling: DEFAULT_RETRY_CEILING,
            max_reset_attempts: DEFAULT_MAX_RESET_ATTEMPTS,
            recv_error_ceiling: DEFAULT_RECV_ERROR_CEILING,
            send_error_ceiling: DEFAULT_SEND_ERROR_CEILING,
            busy_retry_limit: DEFAULT_BUSY_RETRY_LIMIT,
            busy_retry_delay: Duration::from_millis(DEFAULT_BUSY_RETRY_DELAY_MS),
            connection_timeout: Duration::from_millis(DEFAULT_CONNECTION_TIMEOUT_MS),
            guard_timeout: Duration::from_millis(DEFAULT_GUARD_TIMEOUT_MS),
            guard_backoff: Duration::from_millis(DEFAULT_GUARD_BACKOFF_MS),
            ack_timeout: Duration::from_millis(DEFAULT_ACK_TIMEOUT_MS),
            baud_rate: None,
        }
    }
}

impl LinkConfig {
    /// Builder starting from the defaults.
    pub fn builder() -> LinkConfigBuilder {
        LinkConfigBuilder::new()
    }

    /// Check ranges the engine relies on.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_WINDOW_SIZE..=MAX_WINDOW_SIZE).contains(&self.window_size) {
            return Err(Error::InvalidConfig(format!(
                "window_size {} outside {}..={}",
                self.window_size, MIN_WINDOW_SIZE, MAX_WINDOW_SIZE
            )));
        }
        let ceilings = [
            ("retry_ceiling", self.retry_ceiling),
            ("max_reset_attempts", self.max_reset_attempts),
            ("recv_error_ceiling", self.recv_error_ceiling),
            ("send_error_ceiling", self.send_error_ceiling),
        ];
        for (name, value) in ceilings {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{} must be at least 1", name)));
            }
        }
        if self.connection_timeout.is_zero() || self.guard_timeout.is_zero() {
            return Err(Error::InvalidConfig("timeouts must be non-zero".into()));
        }
        if self.piggyback_ack && self.ack_timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "ack_timeout must be non-zero with piggyback_ack".into(),
            ));
        }
        Ok(())
    }

    /// Guard duration for a frame that has already expired `expiries` times.
    pub fn guard_timeout_after(&self, expiries: u16) -> Duration {
        self.guard_timeout + self.guard_backoff * u32::from(expiries)
    }
}

/// Helper to assemble a [`LinkConfig`] starting from the defaults.
#[derive(Debug, Clone, Default)]
pub struct LinkConfigBuilder {
    config: LinkConfig,
}

impl LinkConfigBuilder {
    /// Same as [`LinkConfig::builder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets [`LinkConfig::piggyback_ack`].
    pub fn piggyback_ack(mut self, on: bool) -> Self {
        self.config.piggyback_ack = on;
        self
    }

    /// Sets [`LinkConfig::reject_on_near_gap`].
    pub fn reject_on_near_gap(mut self, on: bool) -> Self {
        self.config.reject_on_near_gap = on;
        self
    }

    /// Sets [`LinkConfig::window_size`].
    pub fn window_size(mut self, size: u8) -> Self {
        self.config.window_size = size;
        self
    }

    /// Sets [`LinkConfig::retry_ceiling`].
    pub fn retry_ceiling(mut self, n: u16) -> Self {
        self.config.retry_ceiling = n;
        self
    }

    /// Sets [`LinkConfig::max_reset_attempts`].
    pub fn max_reset_attempts(mut self, n: u16) -> Self {
        self.config.max_reset_attempts = n;
        self
    }

    /// Sets [`LinkConfig::recv_error_ceiling`].
    pub fn recv_error_ceiling(mut self, n: u16) -> Self {
        self.config.recv_error_ceiling = n;
        self
    }

    /// Sets [`LinkConfig::send_error_ceiling`].
    pub fn send_error_ceiling(mut self, n: u16) -> Self {
        self.config.send_error_ceiling = n;
        self
    }

    /// Sets [`LinkConfig::busy_retry_limit`].
    pub fn busy_retry_limit(mut self, n: u8) -> Self {
        self.config.busy_retry_limit = n;
        self
    }

    /// Sets [`LinkConfig::busy_retry_delay`].
    pub fn busy_retry_delay(mut self, d: Duration) -> Self {
        self.config.busy_retry_delay = d;
        self
    }

    /// Sets [`LinkConfig::connection_timeout`].
    pub fn connection_timeout(mut self, d: Duration) -> Self {
        self.config.connection_timeout = d;
        self
    }

    /// Sets [`LinkConfig::guard_timeout`].
    pub fn guard_timeout(mut self, d: Duration) -> Self {
        self.config.guard_timeout = d;
        self
    }

    /// Sets [`LinkConfig::guard_backoff`].
    pub fn guard_backoff(mut self, d: Duration) -> Self {
        self.config.guard_backoff = d;
        self
    }

    /// Sets [`LinkConfig::ack_timeout`].
    pub fn ack_timeout(mut self, d: Duration) -> Self {
        self.config.ack_timeout = d;
        self
    }

    /// Sets [`LinkConfig::baud_rate`].
    pub fn baud_rate(mut self, rate: Option<BaudRate>) -> Self {
        self.config.baud_rate = rate;
        self
    }

    /// Consume the builder; fails with `InvalidConfig` on out-of-range values.
    pub fn build(self) -> Result<LinkConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(feature = "serde")]
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
