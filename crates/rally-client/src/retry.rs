//! Re-authentication retry policy with exponential backoff and jitter.

use std::time::Duration;

use rand::Rng;

/// Bounded retry policy for unauthorized-triggered re-authentication.
///
/// One policy instance covers one logical call: each 401 that is eligible
/// for re-authentication consumes an attempt, with a jittered exponential
/// delay before the next try. Once the ceiling is reached the rejection is
/// surfaced to the caller.
#[derive(Debug)]
pub struct ReauthPolicy {
    max_attempts: u32,
    attempt: u32,
    initial_delay: Duration,
    max_delay: Duration,
}

impl ReauthPolicy {
    /// Create a policy with the given attempt ceiling.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            attempt: 0,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(10),
        }
    }

    /// Attempts consumed so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Record an attempt and return the delay before the next retry, or
    /// `None` when the ceiling is reached.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_attempts {
            return None;
        }

        let base = self.initial_delay.as_secs_f64() * 2f64.powi(self.attempt as i32);
        let jitter = rand::rng().random::<f64>() * base;
        let delay = Duration::from_secs_f64(base + jitter).min(self.max_delay);

        self.attempt += 1;
        Some(delay)
    }
}
