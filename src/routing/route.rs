//! Redirect URL and header construction.
//!
//! # Responsibilities
//! - Rewrite a call's URL onto the proxy base URL
//! - Carry the original destination as `x-lunar-host` / `x-lunar-scheme`
//! - Attach the static agent identity and tenant id headers
//!
//! # Design Decisions
//! - `ProxyRoute` is process-wide and immutable; `RouteBuilder` is per call
//! - Default ports are omitted from the host header, per scheme

use std::sync::Arc;

use http::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use url::Url;

use crate::config::ProxyConnectionConfig;
use crate::routing::endpoint::{EndpointError, ProxyEndpoint};
use crate::routing::headers::{self, AGENT_IDENTITY};

const HTTP_PORT: u16 = 80;
const HTTPS_PORT: u16 = 443;

/// Where the application meant to send a call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Destination {
    pub host: String,
    pub scheme: String,
    pub port: u16,
}

impl Destination {
    pub fn new(host: impl Into<String>, scheme: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            scheme: scheme.into(),
            port,
        }
    }

    /// Destination of an absolute URL. `None` without a host or a known port.
    pub fn from_url(url: &Url) -> Option<Self> {
        Some(Self::new(
            url.host_str()?,
            url.scheme(),
            url.port_or_known_default()?,
        ))
    }

    fn is_default_port(&self) -> bool {
        match self.scheme.to_ascii_lowercase().as_str() {
            "http" => self.port == HTTP_PORT,
            "https" => self.port == HTTPS_PORT,
            _ => false,
        }
    }
}

/// A header value that could not be encoded.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("invalid value for header {name}: {value:?}")]
    InvalidHeader { name: HeaderName, value: String },
}

/// Process-wide routing settings.
#[derive(Debug, Clone)]
pub struct ProxyRoute {
    endpoint: Arc<ProxyEndpoint>,
    tenant_id: String,
    agent_identity: String,
}

impl ProxyRoute {
    pub fn new(endpoint: ProxyEndpoint, tenant_id: impl Into<String>) -> Self {
        Self {
            endpoint: Arc::new(endpoint),
            tenant_id: tenant_id.into(),
            agent_identity: AGENT_IDENTITY.to_string(),
        }
    }

    pub fn from_config(config: &ProxyConnectionConfig) -> Result<Self, EndpointError> {
        let endpoint = ProxyEndpoint::from_config(config)?;
        Ok(Self::new(endpoint, config.tenant_id.clone()))
    }

    pub fn endpoint(&self) -> &ProxyEndpoint {
        &self.endpoint
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn agent_identity(&self) -> &str {
        &self.agent_identity
    }

    /// Route a single call to `destination`.
    pub fn builder<'a>(&'a self, destination: &'a Destination) -> RouteBuilder<'a> {
        RouteBuilder {
            route: self,
            destination,
        }
    }
}

/// Per-call redirect construction.
#[derive(Debug, Clone, Copy)]
pub struct RouteBuilder<'a> {
    route: &'a ProxyRoute,
    destination: &'a Destination,
}

impl RouteBuilder<'_> {
    /// Proxy base URL followed by the original path and query.
    pub fn build_redirect_url(&self, path: Option<&str>, query: Option<&str>) -> String {
        let path = with_prefix(path, '/');
        let query = with_prefix(query, '?');
        let url = format!("{}{}{}", self.route.endpoint.base_url(), path, query);
        tracing::debug!(url = %url, "Built redirect url");
        url
    }

    /// "host" on the scheme's default port, "host:port" otherwise.
    pub fn host_header_value(&self) -> String {
        if self.destination.is_default_port() {
            self.destination.host.clone()
        } else {
            format!("{}:{}", self.destination.host, self.destination.port)
        }
    }

    /// Headers to add to the redirected request.
    pub fn header_set(&self) -> Result<HeaderMap, RoutingError> {
        let mut map = HeaderMap::with_capacity(4);
        insert(&mut map, headers::HOST, self.host_header_value())?;
        insert(&mut map, headers::SCHEME, self.destination.scheme.clone())?;
        insert(&mut map, headers::INTERCEPTOR, self.route.agent_identity.clone())?;
        insert(&mut map, headers::TENANT_ID, self.route.tenant_id.clone())?;
        Ok(map)
    }
}

fn with_prefix(part: Option<&str>, prefix: char) -> String {
    match part {
        None | Some("") => String::new(),
        Some(part) if part.starts_with(prefix) => part.to_string(),
        Some(part) => format!("{prefix}{part}"),
    }
}

pub(crate) fn insert(
    map: &mut HeaderMap,
    name: HeaderName,
    value: String,
) -> Result<(), RoutingError> {
    match HeaderValue::try_from(value.as_str()) {
        Ok(header_value) => {
            map.insert(name, header_value);
            Ok(())
        }
        Err(_) => Err(RoutingError::InvalidHeader { name, value }),
    }
}
