//! Handshake with the managed proxy.
//!
//! # Responsibilities
//! - Probe `<scheme>://<proxy-host>:<handshake-port>/handshake`
//! - Identify the tenant with the `x-lunar-tenant-id` header
//! - Report whether the proxy answered and whether it runs in managed mode
//!
//! # Design Decisions
//! - Diagnostic only: a failed handshake never disables redirection by itself
//! - Goes direct, never through an HTTP proxy configured in the environment

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::routing::headers::TENANT_ID;
use crate::routing::ProxyRoute;

/// Result of a handshake attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HandshakeOutcome {
    pub connected: bool,
    pub managed: bool,
}

#[derive(Debug, Deserialize)]
struct HandshakeResponse {
    #[serde(default)]
    managed: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("invalid handshake url: {0}")]
    Url(#[from] url::ParseError),
    #[error("handshake request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("proxy answered the handshake with status {0}")]
    Status(reqwest::StatusCode),
    #[error("unexpected handshake body: {0}")]
    Body(#[from] serde_json::Error),
}

/// Client for the proxy's handshake endpoint.
#[derive(Debug, Clone)]
pub struct HandshakeClient {
    client: reqwest::Client,
    url: Url,
    tenant_id: String,
}

impl HandshakeClient {
    pub fn new(
        route: &ProxyRoute,
        handshake_port: u16,
        timeout: Duration,
    ) -> Result<Self, HandshakeError> {
        let url = route.endpoint().handshake_url(handshake_port)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            url,
            tenant_id: route.tenant_id().to_string(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn try_handshake(&self) -> Result<HandshakeOutcome, HandshakeError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(TENANT_ID, &self.tenant_id)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HandshakeError::Status(status));
        }

        let body = response.text().await?;
        let parsed: HandshakeResponse = serde_json::from_str(&body)?;
        Ok(HandshakeOutcome {
            connected: true,
            managed: parsed.managed,
        })
    }

    /// Like [`try_handshake`](Self::try_handshake), folding failures into
    /// `connected: false`.
    pub async fn handshake(&self) -> HandshakeOutcome {
        tracing::debug!(url = %self.url, "Testing the communication with the proxy");
        match self.try_handshake().await {
            Ok(outcome) => {
                tracing::debug!(
                    managed = outcome.managed,
                    "Successfully communicated with the proxy"
                );
                outcome
            }
            Err(e) => {
                tracing::warn!(
                    url = %self.url,
                    error = %e,
                    "Failed to communicate with the proxy, check that it is running and \
                     that the handshake port is its healthcheck port"
                );
                HandshakeOutcome::default()
            }
        }
    }
}
