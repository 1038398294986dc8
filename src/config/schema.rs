//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the interceptor.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the interceptor.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct InterceptorConfig {
    /// Managed proxy connection settings.
    pub proxy: ProxyConnectionConfig,

    /// Allow-list / block-list settings.
    pub traffic: TrafficConfig,

    /// Circuit breaker settings.
    pub fail_safe: FailSafeConfig,

    /// Retry settings.
    pub retry: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Managed proxy connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProxyConnectionConfig {
    /// Proxy address as a single "host:port" pair. Redirection is disabled when unset.
    pub host: Option<String>,

    /// Talk to the proxy over https instead of http.
    pub tls: bool,

    /// Tenant identifier sent with every redirected request.
    pub tenant_id: String,

    /// Port of the proxy handshake endpoint.
    pub handshake_port: u16,
}

impl Default for ProxyConnectionConfig {
    fn default() -> Self {
        Self {
            host: None,
            tls: false,
            tenant_id: "unknown".to_string(),
            handshake_port: 8040,
        }
    }
}

/// Destination lists controlling which traffic goes through the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TrafficConfig {
    /// Only these hosts/IPs are redirected. Takes precedence over `block_list`.
    pub allow_list: Option<Vec<String>>,

    /// These hosts/IPs are never redirected.
    pub block_list: Option<Vec<String>>,
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct FailSafeConfig {
    /// Consecutive proxy failures before the breaker opens.
    pub error_threshold: u32,

    /// How long the breaker stays open, in seconds.
    pub cooldown_secs: u64,
}

impl Default for FailSafeConfig {
    fn default() -> Self {
        Self {
            error_threshold: 5,
            cooldown_secs: 10,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Upper bound for a proxy-requested retry delay, in seconds.
    /// Unset means the delay is taken as-is.
    pub max_delay_secs: Option<f64>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
