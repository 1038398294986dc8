//! Security subsystem: which traffic may leave through the proxy.
//!
//! # Data Flow
//! ```text
//! Outbound call:
//!     → headers.rs (x-lunar-allow override, stripped from the request)
//!     → traffic_policy.rs (allow list / block list / classification)
//!     → Redirect or pass through untouched
//! ```
//!
//! # Design Decisions
//! - Fail closed: a malformed block list disables redirection entirely
//! - Lists are validated once, at construction
//! - No trust in entry syntax: hostnames and IPv4 literals only

pub mod headers;
pub mod lists;
pub mod traffic_policy;

pub use traffic_policy::TrafficPolicy;
