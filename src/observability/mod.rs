//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured log events)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → logging.rs subscriber (stderr) or the host's own subscriber
//!     → whatever metrics recorder the host installs
//! ```
//!
//! # Design Decisions
//! - The interceptor lives inside someone else's process: it never insists on
//!   owning the global subscriber or recorder
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
