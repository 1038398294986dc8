//! The decision core the calling layer talks to.
//!
//! # Data Flow
//! ```text
//! decide(call)
//!     → routing available?          (proxy endpoint parsed at startup)
//!     → x-lunar-allow override, else TrafficPolicy::is_allowed
//!     → CircuitBreaker::state_ok
//!     → RouteBuilder: redirect URL + x-lunar-* headers
//!
//! on_response(headers) / on_transport_error()
//!     → CircuitBreaker::on_error / on_success
//!
//! retry_coordinator().prepare_for_retry(headers)
//!     → sequence id for the next attempt, after the proxy's delay
//!
//! reconfigure_traffic(lists) / set_managed(handshake result)
//!     → rebuild TrafficPolicy → swap
//! ```
//!
//! # Design Decisions
//! - One explicitly constructed context object; the process-wide instance is
//!   just one of these installed once
//! - The traffic policy is swapped atomically, readers never see a half-built one
//! - Every failure degrades to "leave the call alone"

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;

use arc_swap::ArcSwap;
use http::HeaderMap;
use serde::Serialize;
use url::Url;
use uuid::Uuid;

use crate::config::{InterceptorConfig, TrafficConfig};
use crate::net::resolver::{Resolver, SystemResolver};
use crate::observability::metrics;
use crate::resilience::retries::max_delay_from_secs;
use crate::resilience::{CircuitBreaker, Clock, ProxyError, RetryCoordinator, SystemClock};
use crate::routing::headers::SEQUENCE_ID;
use crate::routing::route::insert;
use crate::routing::{Destination, ProxyRoute};
use crate::security::TrafficPolicy;

/// One outbound call, as seen before it executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCall {
    pub destination: Destination,
    pub path: Option<String>,
    pub query: Option<String>,
    /// Destination is known-safe regardless of its address.
    pub managed_hint: bool,
    /// Value of the `x-lunar-allow` request header, if the caller sent one.
    pub allow_override: Option<bool>,
    /// Sequence id of the retry chain this call belongs to.
    pub sequence_id: Option<String>,
}

impl OutboundCall {
    pub fn new(destination: Destination) -> Self {
        Self {
            destination,
            path: None,
            query: None,
            managed_hint: false,
            allow_override: None,
            sequence_id: None,
        }
    }

    /// Destination, path and query of an absolute URL.
    pub fn from_url(url: &Url) -> Option<Self> {
        let destination = Destination::from_url(url)?;
        Some(Self {
            path: Some(url.path().to_string()),
            query: url.query().map(str::to_string),
            ..Self::new(destination)
        })
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_managed_hint(mut self, managed_hint: bool) -> Self {
        self.managed_hint = managed_hint;
        self
    }

    pub fn with_allow_override(mut self, allow_override: Option<bool>) -> Self {
        self.allow_override = allow_override;
        self
    }

    pub fn with_sequence_id(mut self, sequence_id: Option<String>) -> Self {
        self.sequence_id = sequence_id;
        self
    }
}

/// Why a call was left on its original path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BypassReason {
    /// No usable proxy endpoint was configured.
    RoutingUnavailable,
    /// The traffic policy or the allow override said no.
    PolicyDenied,
    /// The circuit breaker is open.
    FailSafeOpen,
    /// The destination could not be encoded into routing headers.
    InvalidHeaders,
}

impl BypassReason {
    fn as_label(self) -> &'static str {
        match self {
            BypassReason::RoutingUnavailable => "routing_unavailable",
            BypassReason::PolicyDenied => "policy_denied",
            BypassReason::FailSafeOpen => "fail_safe_open",
            BypassReason::InvalidHeaders => "invalid_headers",
        }
    }
}

/// How to send a redirected call.
#[derive(Debug, Clone)]
pub struct Redirect {
    pub request_id: Uuid,
    pub url: String,
    pub headers: HeaderMap,
}

#[derive(Debug, Clone)]
pub enum Decision {
    Redirect(Redirect),
    Bypass(BypassReason),
}

impl Decision {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Decision::Redirect(_))
    }
}

/// What a proxied response said about the proxy path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    Success,
    ProxyError(ProxyError),
}

/// Inputs the traffic policy is rebuilt from.
#[derive(Debug, Default)]
struct TrafficSettings {
    lists: TrafficConfig,
    managed: bool,
}

/// Shared decision state for every outbound call of one client (or process).
#[derive(Debug)]
pub struct Interceptor {
    route: Option<ProxyRoute>,
    policy: ArcSwap<TrafficPolicy>,
    traffic: Mutex<TrafficSettings>,
    resolver: Arc<dyn Resolver>,
    breaker: CircuitBreaker,
    clock: Arc<dyn Clock>,
    max_retry_delay: Option<Duration>,
}

impl Interceptor {
    /// Build with the system clock and the OS resolver.
    pub fn new(config: &InterceptorConfig) -> Self {
        Self::with_parts(config, Arc::new(SystemClock), Arc::new(SystemResolver))
    }

    pub fn with_parts(
        config: &InterceptorConfig,
        clock: Arc<dyn Clock>,
        resolver: Arc<dyn Resolver>,
    ) -> Self {
        let route = match ProxyRoute::from_config(&config.proxy) {
            Ok(route) => {
                tracing::info!(
                    proxy = %route.endpoint(),
                    tenant_id = route.tenant_id(),
                    "Proxy routing enabled"
                );
                Some(route)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Proxy routing disabled, calls will not be redirected");
                None
            }
        };

        Self {
            route,
            policy: ArcSwap::from_pointee(TrafficPolicy::with_resolver(
                &config.traffic,
                resolver.clone(),
            )),
            traffic: Mutex::new(TrafficSettings {
                lists: config.traffic.clone(),
                managed: false,
            }),
            resolver,
            breaker: CircuitBreaker::from_config(&config.fail_safe, clock.clone()),
            clock,
            max_retry_delay: config.retry.max_delay_secs.and_then(max_delay_from_secs),
        }
    }

    pub fn is_routing_available(&self) -> bool {
        self.route.is_some()
    }

    pub fn route(&self) -> Option<&ProxyRoute> {
        self.route.as_ref()
    }

    pub fn policy(&self) -> Arc<TrafficPolicy> {
        self.policy.load_full()
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Replace the allow/block lists. The classification cache starts empty.
    pub fn reconfigure_traffic(&self, traffic: &TrafficConfig) {
        let mut settings = self.traffic_settings();
        settings.lists = traffic.clone();
        self.rebuild_policy(&settings);
        tracing::info!("Traffic policy reconfigured");
    }

    /// Record whether the proxy runs in managed mode. A managed proxy with no
    /// allow list disables redirection.
    pub fn set_managed(&self, managed: bool) {
        let mut settings = self.traffic_settings();
        if settings.managed == managed {
            return;
        }
        settings.managed = managed;
        self.rebuild_policy(&settings);
        tracing::info!(managed, "Proxy mode updated");
    }

    pub fn is_managed(&self) -> bool {
        self.policy.load().is_managed()
    }

    fn rebuild_policy(&self, settings: &TrafficSettings) {
        let policy = TrafficPolicy::with_resolver(&settings.lists, self.resolver.clone())
            .with_managed(settings.managed);
        self.policy.store(Arc::new(policy));
    }

    fn traffic_settings(&self) -> MutexGuard<'_, TrafficSettings> {
        self.traffic.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Decide whether `call` goes through the proxy, and how.
    pub fn decide(&self, call: &OutboundCall) -> Decision {
        let decision = self.evaluate(call);
        let label = match &decision {
            Decision::Redirect(_) => "redirect",
            Decision::Bypass(reason) => reason.as_label(),
        };
        metrics::record_decision(label);
        decision
    }

    fn evaluate(&self, call: &OutboundCall) -> Decision {
        let Some(route) = &self.route else {
            return Decision::Bypass(BypassReason::RoutingUnavailable);
        };

        let host = call.destination.host.as_str();
        let policy = self.policy.load();
        let allowed = match call.allow_override {
            Some(allowed) if policy.is_enabled() => allowed,
            _ => policy.is_allowed(host, call.managed_hint),
        };
        if !allowed {
            tracing::trace!(host, "Destination not allowed through the proxy");
            return Decision::Bypass(BypassReason::PolicyDenied);
        }

        if !self.breaker.state_ok() {
            tracing::debug!(host, "Fail-safe is open, skipping the proxy");
            return Decision::Bypass(BypassReason::FailSafeOpen);
        }

        let builder = route.builder(&call.destination);
        let mut headers = match builder.header_set() {
            Ok(headers) => headers,
            Err(e) => {
                tracing::warn!(host, error = %e, "Could not build routing headers");
                return Decision::Bypass(BypassReason::InvalidHeaders);
            }
        };
        if let Some(sequence_id) = &call.sequence_id {
            if let Err(e) = insert(&mut headers, SEQUENCE_ID, sequence_id.clone()) {
                tracing::warn!(host, error = %e, "Could not attach sequence id");
                return Decision::Bypass(BypassReason::InvalidHeaders);
            }
        }

        Decision::Redirect(Redirect {
            request_id: Uuid::new_v4(),
            url: builder.build_redirect_url(call.path.as_deref(), call.query.as_deref()),
            headers,
        })
    }

    /// Feed a proxied response's headers back into the circuit breaker.
    pub fn on_response(&self, request_id: Uuid, headers: &HeaderMap) -> ResponseOutcome {
        let request_id = request_id.to_string();
        match ProxyError::from_headers(headers) {
            Some(error) => {
                tracing::warn!(
                    request_id = %request_id,
                    code = %error.code,
                    message = error.message(),
                    "Error communicating with the proxy"
                );
                metrics::record_proxy_error(error.code_label());
                self.breaker.on_error(&request_id);
                ResponseOutcome::ProxyError(error)
            }
            None => {
                self.breaker.on_success(&request_id);
                ResponseOutcome::Success
            }
        }
    }

    /// The redirected call failed before a response arrived.
    pub fn on_transport_error(&self, request_id: Uuid) {
        self.breaker.on_error(&request_id.to_string());
    }

    /// A fresh coordinator for one call's retry chain.
    pub fn retry_coordinator(&self) -> RetryCoordinator {
        RetryCoordinator::new(self.clock.clone()).with_max_delay(self.max_retry_delay)
    }
}

static GLOBAL: OnceLock<Interceptor> = OnceLock::new();

/// Install the process-wide interceptor. The first install wins; later ones
/// are dropped and the existing instance is returned.
pub fn install(interceptor: Interceptor) -> &'static Interceptor {
    let mut installed = false;
    let global = GLOBAL.get_or_init(|| {
        installed = true;
        interceptor
    });
    if !installed {
        tracing::warn!("Interceptor already installed, keeping the existing instance");
    }
    global
}

/// The process-wide interceptor, if one was installed.
pub fn global() -> Option<&'static Interceptor> {
    GLOBAL.get()
}
