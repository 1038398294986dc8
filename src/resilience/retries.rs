//! Proxy-driven retry coordination.
//!
//! # Responsibilities
//! - Read `x-lunar-retry-after` (seconds) and `x-lunar-sequence-id` from a response
//! - Wait the requested delay before handing back the sequence id
//! - Keep the sequence id that correlates the retry chain
//!
//! # Design Decisions
//! - Only the first value of each header counts; repeats are never combined
//! - A retry without a sequence id is not actionable and is skipped
//! - Parse problems skip the retry, they are never surfaced as failures
//! - The wait blocks only the calling thread; no lock is held across it

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use http::{HeaderMap, HeaderName};

use crate::config::RetryConfig;
use crate::observability::metrics;
use crate::resilience::clock::Clock;
use crate::routing::headers::{RETRY_AFTER, SEQUENCE_ID};

const MILLIS_PER_SEC: f64 = 1000.0;

/// Decides whether a proxied call should be retried, and waits for it.
#[derive(Debug)]
pub struct RetryCoordinator {
    clock: Arc<dyn Clock>,
    max_delay: Option<Duration>,
    sequence_id: Mutex<Option<String>>,
}

impl RetryCoordinator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            max_delay: None,
            sequence_id: Mutex::new(None),
        }
    }

    /// A cap that is not a positive, representable duration is ignored.
    pub fn from_config(config: &RetryConfig, clock: Arc<dyn Clock>) -> Self {
        let max_delay = config.max_delay_secs.and_then(max_delay_from_secs);
        Self::new(clock).with_max_delay(max_delay)
    }

    /// Clamp proxy-requested delays to `max_delay`.
    pub fn with_max_delay(mut self, max_delay: Option<Duration>) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn sequence_id(&self) -> Option<String> {
        self.lock().clone()
    }

    pub fn set_sequence_id(&self, sequence_id: Option<String>) {
        *self.lock() = sequence_id;
    }

    /// Returns the sequence id to send with the retry, or `None` when no retry
    /// is wanted. Sleeps for the requested delay before returning `Some`.
    ///
    /// The stored sequence id only changes when a retry is returned.
    pub fn prepare_for_retry(&self, headers: &HeaderMap) -> Option<String> {
        let raw_retry_after = first_value(headers, &RETRY_AFTER)?;

        let retry_after_secs = match raw_retry_after.trim().parse::<f64>() {
            Ok(secs) if secs.is_finite() => secs,
            _ => {
                tracing::debug!(
                    value = raw_retry_after,
                    "Retry required, but parsing x-lunar-retry-after failed"
                );
                return None;
            }
        };

        let retry_after_ms = retry_after_secs * MILLIS_PER_SEC;
        if retry_after_ms < 1.0 {
            tracing::debug!("Retry required but value is below 1ms, skipping retry flow");
            return None;
        }

        let Some(sequence_id) = first_value(headers, &SEQUENCE_ID) else {
            tracing::debug!(
                "Retry required, but x-lunar-sequence-id is missing, skipping retry flow"
            );
            return None;
        };

        let mut delay = Duration::from_millis(retry_after_ms as u64);
        if let Some(max_delay) = self.max_delay.filter(|max| delay > *max) {
            tracing::warn!(
                requested_ms = delay.as_millis() as u64,
                max_ms = max_delay.as_millis() as u64,
                "Proxy requested retry delay above the configured maximum, clamping"
            );
            delay = max_delay;
        }

        tracing::debug!(
            sequence_id,
            delay_ms = delay.as_millis() as u64,
            "Retry required, waiting before retrying"
        );
        self.clock.low_priority_sleep(delay);

        let sequence_id = sequence_id.to_string();
        *self.lock() = Some(sequence_id.clone());
        metrics::record_retry();
        Some(sequence_id)
    }

    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        self.sequence_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) fn max_delay_from_secs(secs: f64) -> Option<Duration> {
    match Duration::try_from_secs_f64(secs) {
        Ok(delay) if !delay.is_zero() => Some(delay),
        _ => {
            tracing::warn!(max_delay_secs = secs, "Ignoring unusable retry delay cap");
            None
        }
    }
}

/// First value of `name`, if present, readable and non-empty.
fn first_value<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}
