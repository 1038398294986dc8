//! Proxy health subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (handshake.rs):
//!     ProxyRoute + handshake port
//!     → GET /handshake with tenant id
//!     → HandshakeOutcome { connected, managed }
//!
//! Per call:
//!     proxy failures are tracked by resilience::circuit_breaker
//! ```
//!
//! # Design Decisions
//! - The handshake is a one-shot diagnostic, not a periodic probe
//! - Passive failure tracking lives in the circuit breaker, not here

pub mod handshake;

pub use handshake::{HandshakeClient, HandshakeError, HandshakeOutcome};
