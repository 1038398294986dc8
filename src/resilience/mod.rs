//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Before a redirected call:
//!     → circuit_breaker.rs (is the proxy path healthy?)
//!
//! After the call:
//!     → proxy_error.rs (x-lunar-error present?)
//!     → circuit_breaker.rs (on_error / on_success)
//!     → retries.rs (x-lunar-retry-after + x-lunar-sequence-id → wait, retry)
//! ```
//!
//! # Design Decisions
//! - Time is injected (clock.rs) so cooldowns and retry waits are testable
//! - Failures of the proxy path are absorbed here, never thrown at the caller
//! - Retries are proxy-directed: the proxy decides, the agent only waits

pub mod circuit_breaker;
pub mod clock;
pub mod proxy_error;
pub mod retries;

pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use clock::{Clock, MockClock, SystemClock};
pub use proxy_error::ProxyError;
pub use retries::RetryCoordinator;
