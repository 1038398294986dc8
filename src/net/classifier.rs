//! Internal/external address classification.
//!
//! # Responsibilities
//! - Parse strict dotted-decimal IPv4 literals, resolve everything else
//! - Check the address against the private range table
//! - Memoize definite answers per classifier instance
//!
//! # Design Decisions
//! - Resolution failures are `Unknown` and never cached, so the next call retries
//! - Cache key is the exact input string (no case folding)
//! - Concurrent first lookups of the same host may both resolve; last write wins

use std::net::Ipv4Addr;
use std::sync::Arc;

use dashmap::DashMap;

use crate::net::ranges::PrivateRangeTable;
use crate::net::resolver::{Resolver, SystemResolver};

/// Where a destination lives relative to the private network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    External,
    Internal,
    /// The host could not be resolved.
    Unknown,
}

impl Classification {
    /// Only a definite `External` counts; `Unknown` is treated as internal.
    pub fn is_external(self) -> bool {
        matches!(self, Classification::External)
    }
}

/// Classifies hosts and IPs, caching the results.
#[derive(Debug)]
pub struct AddressClassifier {
    resolver: Arc<dyn Resolver>,
    ranges: &'static PrivateRangeTable,
    cache: DashMap<String, bool>,
}

impl Default for AddressClassifier {
    fn default() -> Self {
        Self::new(Arc::new(SystemResolver))
    }
}

impl AddressClassifier {
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self {
            resolver,
            ranges: PrivateRangeTable::shared(),
            cache: DashMap::new(),
        }
    }

    /// Classify without consulting or filling the cache.
    pub fn classify(&self, host_or_ip: &str) -> Classification {
        let addr = match parse_ipv4_literal(host_or_ip) {
            Some(addr) => addr,
            None => match self.resolver.resolve(host_or_ip) {
                Ok(addr) => addr,
                Err(e) => {
                    tracing::debug!(host = host_or_ip, error = %e, "Could not resolve host");
                    return Classification::Unknown;
                }
            },
        };
        self.classify_addr(addr)
    }

    pub fn classify_addr(&self, addr: Ipv4Addr) -> Classification {
        if self.ranges.is_private(addr) {
            Classification::Internal
        } else {
            Classification::External
        }
    }

    /// Memoized external check. `Unknown` answers `false` and is not stored.
    pub fn is_external(&self, host_or_ip: &str) -> bool {
        if let Some(hit) = self.cache.get(host_or_ip) {
            return *hit;
        }

        let external = match self.classify(host_or_ip) {
            Classification::Unknown => return false,
            other => other.is_external(),
        };
        self.cache.insert(host_or_ip.to_string(), external);
        external
    }

    /// The cached answer for `host_or_ip`, if one exists.
    pub fn cached(&self, host_or_ip: &str) -> Option<bool> {
        self.cache.get(host_or_ip).map(|hit| *hit)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn reset_cache(&self) {
        self.cache.clear();
    }
}

/// Strict dotted-decimal IPv4 literal.
pub fn parse_ipv4_literal(raw: &str) -> Option<Ipv4Addr> {
    raw.parse().ok()
}
