//! Circuit breaker for the proxy path (the fail-safe).
//!
//! # States
//! - Closed: calls are redirected through the proxy
//! - Open: calls go straight to their destination until the cooldown ends
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive errors reach threshold (cooldown starts)
//! Open → Closed: first state_ok() query once the cooldown has elapsed
//!                (error count resets)
//! ```
//!
//! # Design Decisions
//! - One breaker for the whole proxy path (not per destination)
//! - Open → Closed is evaluated lazily on query, no background timer
//! - Success resets the counter but never shortens a running cooldown
//! - Counter and cooldown live under one lock so queries see a consistent pair

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::config::FailSafeConfig;
use crate::observability::metrics;
use crate::resilience::clock::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
}

#[derive(Debug, Default)]
struct Inner {
    errors: u32,
    cooldown_started_at: Option<u64>,
}

/// Consecutive-failure breaker with a fixed cooldown.
#[derive(Debug)]
pub struct CircuitBreaker {
    threshold: u32,
    cooldown_ms: u64,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, cooldown: Duration, clock: Arc<dyn Clock>) -> Self {
        if threshold == 0 {
            tracing::warn!("Fail-safe threshold of 0 is not usable, using 1");
        }
        Self {
            threshold: threshold.max(1),
            cooldown_ms: u64::try_from(cooldown.as_millis()).unwrap_or(u64::MAX),
            clock,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn from_config(config: &FailSafeConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            config.error_threshold,
            Duration::from_secs(config.cooldown_secs),
            clock,
        )
    }

    /// True when calls may go through the proxy.
    pub fn state_ok(&self) -> bool {
        self.state() == BreakerState::Closed
    }

    pub fn state(&self) -> BreakerState {
        let mut inner = self.lock();
        let Some(started_at) = inner.cooldown_started_at else {
            return BreakerState::Closed;
        };

        let elapsed = self.clock.now_millis().saturating_sub(started_at);
        if elapsed < self.cooldown_ms {
            return BreakerState::Open;
        }

        inner.cooldown_started_at = None;
        inner.errors = 0;
        tracing::info!("Fail-safe cooldown ended, resuming proxy routing");
        BreakerState::Closed
    }

    /// Record a proxy failure for `request_id`.
    pub fn on_error(&self, request_id: &str) {
        tracing::error!(
            request_id,
            "Error communicating with the proxy, reverting the request to its original destination"
        );

        let mut inner = self.lock();
        inner.errors = inner.errors.saturating_add(1);
        if inner.cooldown_started_at.is_some() || inner.errors < self.threshold {
            return;
        }

        inner.cooldown_started_at = Some(self.clock.now_millis());
        drop(inner);

        tracing::warn!(
            request_id,
            threshold = self.threshold,
            cooldown_ms = self.cooldown_ms,
            "Error threshold reached, entering fail-safe cooldown"
        );
        metrics::record_failsafe_trip();
    }

    /// Record a successful proxy round trip for `request_id`.
    pub fn on_success(&self, request_id: &str) {
        tracing::debug!(request_id, "Got success, resetting error counter");
        self.lock().errors = 0;
    }

    pub fn error_count(&self) -> u32 {
        self.lock().errors
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
