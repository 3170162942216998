//! Retry and polling helpers
//!
//! `retry` re-runs a fallible operation a bounded number of times with
//! a linearly growing pause. `poll` waits for an external condition,
//! stretching the interval as polls accumulate so long waits back off
//! without a separate configuration knob.

use std::thread;
use std::time::Duration;

use log::{debug, info};

use super::TaskError;
use super::options::TaskOptions;

/// Retry behavior, read from the `retries`, `retry_interval`, and
/// `retry_interval_add` options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryOptions {
    /// Additional attempts after the first failure
    pub retries: u64,
    /// Seconds to sleep before the next attempt
    pub retry_interval: u64,
    /// Seconds added to the interval after every retry
    pub retry_interval_add: u64,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self { retries: 0, retry_interval: 1, retry_interval_add: 0 }
    }
}

impl RetryOptions {
    /// Read retry settings from task options, applying defaults.
    pub fn from_options(options: &TaskOptions) -> Result<Self, TaskError> {
        let defaults = Self::default();
        Ok(Self {
            retries: options.get_u64("retries")?.unwrap_or(defaults.retries),
            retry_interval: options.get_u64("retry_interval")?.unwrap_or(defaults.retry_interval),
            retry_interval_add: options
                .get_u64("retry_interval_add")?
                .unwrap_or(defaults.retry_interval_add),
        })
    }
}

/// Run an operation, retrying eligible failures.
pub fn retry<T>(
    options: RetryOptions,
    retryable: impl Fn(&TaskError) -> bool,
    mut operation: impl FnMut() -> Result<T, TaskError>,
) -> Result<T, TaskError> {
    let mut remaining = options.retries;
    let mut interval = options.retry_interval;
    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(err) => {
                if remaining == 0 || !retryable(&err) {
                    return Err(err);
                }
                info!("Sleeping for {interval} seconds before retry...");
                thread::sleep(Duration::from_secs(interval));
                interval += options.retry_interval_add;
                remaining -= 1;
                info!("Retrying ({remaining} attempts remaining)");
            }
        }
    }
}

/// Interval schedule for polling: starts at one second and grows by a
/// second for every three polls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollState {
    /// Polls performed so far
    pub count: u64,
    /// Current sleep between polls, in seconds
    pub interval: u64,
    level: u64,
}

impl Default for PollState {
    fn default() -> Self {
        Self::new()
    }
}

impl PollState {
    /// Fresh schedule
    #[must_use]
    pub const fn new() -> Self {
        Self { count: 0, interval: 1, level: 0 }
    }

    /// Record one completed poll, stretching the interval as needed.
    pub fn advance(&mut self) {
        self.count += 1;
        if self.count / 3 > self.level {
            self.level += 1;
            self.interval += 1;
            debug!("Increased polling interval to {} seconds", self.interval);
        }
    }
}

/// Poll until the action yields a value.
///
/// The action returns `Ok(None)` while the condition is pending. Gives
/// up after `max_attempts` polls.
pub fn poll<T>(
    max_attempts: u64,
    mut action: impl FnMut() -> Result<Option<T>, TaskError>,
) -> Result<T, TaskError> {
    let mut state = PollState::new();
    loop {
        if let Some(value) = action()? {
            return Ok(value);
        }
        state.advance();
        if state.count >= max_attempts {
            return Err(TaskError::PollTimeout { attempts: state.count });
        }
        thread::sleep(Duration::from_secs(state.interval));
    }
}
