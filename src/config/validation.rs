//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the proxy address is a single `host:port` pair
//! - Check destination list entries are hostnames or IPv4 literals
//! - Validate value ranges (threshold >= 1, retry cap > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Problems never abort startup: each one disables the feature it belongs to
//! - Validation is pure function: InterceptorConfig → Result<(), Vec<ValidationError>>

use std::time::Duration;

use crate::config::schema::InterceptorConfig;
use crate::routing::endpoint::{EndpointError, ProxyEndpoint};
use crate::security::lists::is_valid_entry;

/// A single configuration problem.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("proxy host: {0}")]
    ProxyHost(#[from] EndpointError),
    #[error("allow list entry '{0}' is not a hostname or IPv4 address")]
    AllowListEntry(String),
    #[error("block list entry '{0}' is not a hostname or IPv4 address")]
    BlockListEntry(String),
    #[error("fail_safe.error_threshold must be at least 1")]
    ZeroThreshold,
    #[error("retry.max_delay_secs must be a positive number of seconds within range, got {0}")]
    RetryCap(f64),
}

/// Collect every problem in `config`.
pub fn validate_config(config: &InterceptorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = ProxyEndpoint::from_config(&config.proxy) {
        errors.push(ValidationError::ProxyHost(e));
    }

    let traffic = &config.traffic;
    for entry in traffic.allow_list.iter().flatten() {
        if !is_valid_entry(entry) {
            errors.push(ValidationError::AllowListEntry(entry.clone()));
        }
    }
    // The block list is ignored entirely once an allow list exists.
    if traffic.allow_list.is_none() {
        for entry in traffic.block_list.iter().flatten() {
            if !is_valid_entry(entry) {
                errors.push(ValidationError::BlockListEntry(entry.clone()));
            }
        }
    }

    if config.fail_safe.error_threshold == 0 {
        errors.push(ValidationError::ZeroThreshold);
    }

    if let Some(cap) = config.retry.max_delay_secs {
        let usable = Duration::try_from_secs_f64(cap).is_ok_and(|delay| !delay.is_zero());
        if !usable {
            errors.push(ValidationError::RetryCap(cap));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
