//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate (report every problem) → Build interceptor
//!         → Install process-wide → Handshake with the proxy
//!         → Apply the proxy's managed mode to the traffic policy
//! ```
//!
//! # Design Decisions
//! - Never fatal: the host application starts even when the interceptor
//!   cannot route anything
//! - Problems are logged once, at startup, not per call
//! - A failed handshake changes nothing; a successful one only reports the
//!   proxy's managed mode

pub mod startup;

pub use startup::{build, connect, handshake, start};
