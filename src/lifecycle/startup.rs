//! Startup orchestration.
//!
//! # Responsibilities
//! - Report configuration problems with descriptive diagnostics
//! - Build the interceptor and install it process-wide
//! - Run the proxy handshake once and apply the managed mode it reports
//!
//! # Design Decisions
//! - Validation problems are warnings; each component degrades on its own
//! - Startup runs once per process; a second call returns the first instance

use std::time::Duration;

use crate::config::{validate_config, InterceptorConfig};
use crate::health::{HandshakeClient, HandshakeOutcome};
use crate::interceptor::{self, Interceptor};

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Validate `config` and build an interceptor from it.
pub fn build(config: &InterceptorConfig) -> Interceptor {
    if let Err(problems) = validate_config(config) {
        for problem in &problems {
            tracing::warn!(problem = %problem, "Configuration problem");
        }
    }
    Interceptor::new(config)
}

/// Build, install and handshake. Returns the process-wide interceptor and the
/// handshake result (`connected: false` when routing is unavailable).
pub async fn start(config: &InterceptorConfig) -> (&'static Interceptor, HandshakeOutcome) {
    let installed = interceptor::install(build(config));
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        routing = installed.is_routing_available(),
        "Interceptor installed"
    );

    let outcome = connect(installed, config.proxy.handshake_port).await;
    (installed, outcome)
}

/// Handshake, then apply the reported managed mode to `interceptor`.
///
/// A failed handshake leaves the interceptor as it was.
pub async fn connect(interceptor: &Interceptor, handshake_port: u16) -> HandshakeOutcome {
    let outcome = handshake(interceptor, handshake_port).await;
    if outcome.connected {
        interceptor.set_managed(outcome.managed);
    }
    outcome
}

/// Run the proxy handshake for `interceptor`, if it has a route.
pub async fn handshake(interceptor: &Interceptor, handshake_port: u16) -> HandshakeOutcome {
    let Some(route) = interceptor.route() else {
        return HandshakeOutcome::default();
    };

    match HandshakeClient::new(route, handshake_port, HANDSHAKE_TIMEOUT) {
        Ok(client) => client.handshake().await,
        Err(e) => {
            tracing::warn!(error = %e, "Could not prepare the proxy handshake");
            HandshakeOutcome::default()
        }
    }
}
