use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{StoreError, StoreResult};

/// Bounded exponential backoff for transient object-store failures.
///
/// Only errors classified transient ([`StoreError::is_transient`]) are
/// retried. "Not found" is data, not a failure, and never reaches this
/// policy; permanent failures surface on the first attempt.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub base_delay: Duration,
    /// Backoff multiplier per subsequent attempt.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(200),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that never sleeps, for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    /// Backoff before the attempt following failure number `attempt`
    /// (1-indexed): `base_delay * multiplier^(attempt - 1)`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1) as i32;
        Duration::from_secs_f64(self.base_delay.as_secs_f64() * self.multiplier.powi(exp))
    }

    /// Run `op`, retrying transient failures until success or exhaustion.
    pub fn run<T>(&self, mut op: impl FnMut() -> StoreResult<T>) -> StoreResult<T> {
        let mut attempt = 1u32;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    let delay = self.delay_after(attempt);
                    warn!(attempt, ?delay, "transient backend failure, retrying: {err}");
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(err) if err.is_transient() => {
                    return Err(StoreError::RetriesExhausted {
                        attempts: self.max_attempts,
                        last: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }
}
