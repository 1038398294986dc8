//! Header names exchanged with the managed proxy.

use http::HeaderName;

/// Original destination host (with port when not the scheme default).
pub const HOST: HeaderName = HeaderName::from_static("x-lunar-host");
/// Original destination scheme.
pub const SCHEME: HeaderName = HeaderName::from_static("x-lunar-scheme");
/// Agent identity, "<name>/<version>".
pub const INTERCEPTOR: HeaderName = HeaderName::from_static("x-lunar-interceptor");
pub const TENANT_ID: HeaderName = HeaderName::from_static("x-lunar-tenant-id");
/// Correlates a retried request with its sequence.
pub const SEQUENCE_ID: HeaderName = HeaderName::from_static("x-lunar-sequence-id");

/// Response: proxy-side failure code.
pub const ERROR: HeaderName = HeaderName::from_static("x-lunar-error");
/// Response: seconds to wait before retrying.
pub const RETRY_AFTER: HeaderName = HeaderName::from_static("x-lunar-retry-after");

/// Request: per-call redirect override, "true" forces redirection.
pub const ALLOW: HeaderName = HeaderName::from_static("x-lunar-allow");

/// Agent identity value sent in [`INTERCEPTOR`].
pub const AGENT_IDENTITY: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
