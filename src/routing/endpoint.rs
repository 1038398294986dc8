//! Managed proxy endpoint resolution.
//!
//! # Responsibilities
//! - Parse the configured proxy address ("host:port", nothing more)
//! - Derive the base URL every redirected call is sent to
//! - Derive the handshake URL on the separate health-check port
//!
//! # Design Decisions
//! - Parsed once at startup; a bad value disables redirection with a diagnostic
//! - Scheme comes from the TLS flag, never from the address itself

use std::fmt;

use url::Url;

use crate::config::ProxyConnectionConfig;

const HANDSHAKE_PATH: &str = "/handshake";

/// Why the proxy address could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("not configured; set LUNAR_PROXY_HOST to the proxy's host:port")]
    Missing,
    #[error("'{0}' has no port; expected host:port")]
    MissingPort(String),
    #[error("'{0}' must be exactly one host:port pair, without scheme or path")]
    Malformed(String),
    #[error("'{0}' has an empty host")]
    EmptyHost(String),
    #[error("'{0}' has a port that is not an integer")]
    InvalidPort(String),
}

/// A validated proxy address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    host: String,
    port: u16,
    scheme: &'static str,
    base_url: String,
}

impl ProxyEndpoint {
    pub fn from_config(config: &ProxyConnectionConfig) -> Result<Self, EndpointError> {
        let raw = config.host.as_deref().ok_or(EndpointError::Missing)?;
        Self::parse(raw, config.tls)
    }

    pub fn parse(raw: &str, tls: bool) -> Result<Self, EndpointError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(EndpointError::Missing);
        }

        let parts: Vec<&str> = raw.split(':').collect();
        let (host, port) = match parts.as_slice() {
            [_] => return Err(EndpointError::MissingPort(raw.to_string())),
            [host, port] => (*host, *port),
            _ => return Err(EndpointError::Malformed(raw.to_string())),
        };
        if host.is_empty() {
            return Err(EndpointError::EmptyHost(raw.to_string()));
        }
        if host.contains('/') {
            return Err(EndpointError::Malformed(raw.to_string()));
        }
        let port: u16 = port
            .parse()
            .map_err(|_| EndpointError::InvalidPort(raw.to_string()))?;

        let scheme = if tls { "https" } else { "http" };
        Ok(Self {
            host: host.to_string(),
            port,
            scheme,
            base_url: format!("{scheme}://{host}:{port}"),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn scheme(&self) -> &'static str {
        self.scheme
    }

    /// "<scheme>://<host>:<port>", no trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Handshake endpoint on `handshake_port` of the same host.
    pub fn handshake_url(&self, handshake_port: u16) -> Result<Url, url::ParseError> {
        Url::parse(&format!(
            "{}://{}:{}{}",
            self.scheme, self.host, handshake_port, HANDSHAKE_PATH
        ))
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let endpoint = ProxyEndpoint::parse("lunar-proxy:8000", false).unwrap();
        assert_eq!(endpoint.host(), "lunar-proxy");
        assert_eq!(endpoint.port(), 8000);
        assert_eq!(endpoint.base_url(), "http://lunar-proxy:8000");

        let tls = ProxyEndpoint::parse("10.0.0.5:443", true).unwrap();
        assert_eq!(tls.base_url(), "https://10.0.0.5:443");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(ProxyEndpoint::parse("", false), Err(EndpointError::Missing));
        assert_eq!(
            ProxyEndpoint::parse("lunar-proxy", false),
            Err(EndpointError::MissingPort("lunar-proxy".into()))
        );
        assert_eq!(
            ProxyEndpoint::parse("http://lunar-proxy:8000", false),
            Err(EndpointError::Malformed("http://lunar-proxy:8000".into()))
        );
        assert_eq!(
            ProxyEndpoint::parse(":8000", false),
            Err(EndpointError::EmptyHost(":8000".into()))
        );
        assert_eq!(
            ProxyEndpoint::parse("lunar-proxy:http", false),
            Err(EndpointError::InvalidPort("lunar-proxy:http".into()))
        );
        assert_eq!(
            ProxyEndpoint::parse("lunar-proxy:99999", false),
            Err(EndpointError::InvalidPort("lunar-proxy:99999".into()))
        );
    }

    #[test]
    fn test_from_config_missing() {
        let config = ProxyConnectionConfig::default();
        assert_eq!(ProxyEndpoint::from_config(&config), Err(EndpointError::Missing));
    }

    #[test]
    fn test_handshake_url() {
        let endpoint = ProxyEndpoint::parse("lunar-proxy:8000", false).unwrap();
        let url = endpoint.handshake_url(8040).unwrap();
        assert_eq!(url.as_str(), "http://lunar-proxy:8040/handshake");
    }
}
