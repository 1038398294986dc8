//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     ProxyConnectionConfig
//!     → endpoint.rs (validate "host:port", derive base URL)
//!     → route.rs (ProxyRoute: endpoint + tenant id + agent identity)
//!
//! Per outbound call:
//!     Destination (host, scheme, port) + path + query
//!     → route.rs (RouteBuilder: redirect URL, x-lunar-* headers)
//! ```
//!
//! # Design Decisions
//! - Endpoint validated eagerly; routing is absent, not broken, when invalid
//! - Immutable after construction (thread-safe without locks)
//! - The original destination travels as headers, never in the URL

pub mod endpoint;
pub mod headers;
pub mod route;

pub use endpoint::{EndpointError, ProxyEndpoint};
pub use route::{Destination, ProxyRoute, RouteBuilder, RoutingError};
