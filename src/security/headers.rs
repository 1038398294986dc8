//! Per-request header override.
//!
//! # Responsibilities
//! - Read the `x-lunar-allow` request header
//! - Strip it so it never reaches the destination or the proxy
//!
//! # Design Decisions
//! - Exact value "true" forces redirection, anything else forces bypass
//! - Absent header means "no opinion"; the traffic policy decides

use http::HeaderMap;

use crate::routing::headers::ALLOW;

const ALLOWED_VALUE: &[u8] = b"true";

/// Remove the override header and return its verdict.
pub fn take_allow_override(headers: &mut HeaderMap) -> Option<bool> {
    let value = headers.remove(ALLOW)?;
    Some(value.as_bytes() == ALLOWED_VALUE)
}
