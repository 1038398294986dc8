//! In-process HTTP interception core.
//!
//! Decides, for each outbound HTTP call of the host application, whether it
//! goes through a remote API-management proxy or straight to its destination,
//! and builds the rewritten URL and routing headers when it is redirected.
//!
//! # Architecture Overview
//!
//! ```text
//!     Outbound call (host, scheme, port, path, query)
//!         │
//!         ▼
//!  ┌──────────────────────────────────────────────────────────────┐
//!  │                         Interceptor                           │
//!  │                                                               │
//!  │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐   │
//!  │  │   security   │──▶│  resilience  │──▶│     routing      │   │
//!  │  │TrafficPolicy │   │CircuitBreaker│   │  RouteBuilder    │   │
//!  │  └──────┬───────┘   └──────▲───────┘   └────────┬─────────┘   │
//!  │         │                  │                    │             │
//!  │  ┌──────▼───────┐   ┌──────┴───────┐            │             │
//!  │  │     net      │   │ on_response  │            │             │
//!  │  │  classifier  │   │ x-lunar-error│            │             │
//!  │  └──────────────┘   └──────────────┘            │             │
//!  │                                                 │             │
//!  │  Cross-cutting: config, observability, lifecycle, health      │
//!  └─────────────────────────────────────────────────┼─────────────┘
//!                                                    ▼
//!                   Redirect { url, x-lunar-* headers } or Bypass
//! ```

// Core subsystems
pub mod config;
pub mod interceptor;
pub mod net;
pub mod routing;

// Decision inputs
pub mod health;
pub mod resilience;
pub mod security;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::InterceptorConfig;
pub use interceptor::{BypassReason, Decision, Interceptor, OutboundCall, Redirect, ResponseOutcome};
