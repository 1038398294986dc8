//! End-to-end decision flows through the interceptor.

use std::time::Duration;

use http::{HeaderMap, HeaderValue};
use lunar_interceptor::config::TrafficConfig;
use lunar_interceptor::interceptor::{BypassReason, Decision, OutboundCall, ResponseOutcome};
use lunar_interceptor::resilience::Clock;
use lunar_interceptor::routing::headers;
use lunar_interceptor::routing::Destination;
use lunar_interceptor::security::headers::take_allow_override;
use url::Url;

mod common;

fn call(host: &str) -> OutboundCall {
    OutboundCall::new(Destination::new(host, "https", 443)).with_path("/v1/items")
}

fn proxy_error(code: &'static str) -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(headers::ERROR, HeaderValue::from_static(code));
    map
}

#[test]
fn test_fail_safe_trip_and_recovery() {
    let mut config = common::proxy_config();
    config.fail_safe.error_threshold = 2;
    config.fail_safe.cooldown_secs = 4;
    let (interceptor, clock) = common::interceptor(&config);

    let Decision::Redirect(first) = interceptor.decide(&call("api.example.com")) else {
        panic!("expected redirect");
    };
    assert!(matches!(
        interceptor.on_response(first.request_id, &proxy_error("2")),
        ResponseOutcome::ProxyError(ref e) if e.code == "2"
    ));
    interceptor.on_response(first.request_id, &proxy_error("3"));

    assert!(matches!(
        interceptor.decide(&call("api.example.com")),
        Decision::Bypass(BypassReason::FailSafeOpen)
    ));

    clock.advance(Duration::from_secs(4));
    let Decision::Redirect(second) = interceptor.decide(&call("api.example.com")) else {
        panic!("expected redirect after cooldown");
    };
    assert_ne!(first.request_id, second.request_id);

    // The counter restarted with the cooldown, so one error is not enough.
    interceptor.on_transport_error(second.request_id);
    assert!(interceptor.decide(&call("api.example.com")).is_redirect());
    interceptor.on_transport_error(second.request_id);
    assert!(!interceptor.decide(&call("api.example.com")).is_redirect());
}

#[test]
fn test_managed_hint_for_internal_name() {
    let (interceptor, _) = common::interceptor(&common::proxy_config());
    let plain = OutboundCall::new(Destination::new("httpbinmock", "http", 80));

    assert!(matches!(
        interceptor.decide(&plain),
        Decision::Bypass(BypassReason::PolicyDenied)
    ));

    let Decision::Redirect(redirect) = interceptor.decide(&plain.with_managed_hint(true)) else {
        panic!("expected redirect");
    };
    assert_eq!(redirect.url, "http://lunar-proxy:8000");
    assert_eq!(redirect.headers[headers::HOST], "httpbinmock");
    assert_eq!(redirect.headers[headers::SCHEME], "http");
}

#[test]
fn test_block_list_beats_managed_hint() {
    let mut config = common::proxy_config();
    config.traffic.block_list = Some(vec!["payments.example.org".into()]);
    let (interceptor, _) = common::interceptor(&config);

    assert!(!interceptor
        .decide(&call("payments.example.org").with_managed_hint(true))
        .is_redirect());
    assert!(interceptor.decide(&call("api.example.com")).is_redirect());
}

#[test]
fn test_allow_list_limits_redirection() {
    let mut config = common::proxy_config();
    config.traffic.allow_list = Some(vec!["db.internal".into()]);
    config.traffic.block_list = Some(vec!["db.internal".into()]);
    let (interceptor, _) = common::interceptor(&config);

    assert!(interceptor.decide(&call("db.internal")).is_redirect());
    assert!(!interceptor.decide(&call("api.example.com")).is_redirect());
}

#[test]
fn test_non_default_port_in_host_header() {
    let (interceptor, _) = common::interceptor(&common::proxy_config());
    let url = Url::parse("https://api.example.com:8443/orders?id=7").unwrap();
    let call = OutboundCall::from_url(&url).unwrap();

    let Decision::Redirect(redirect) = interceptor.decide(&call) else {
        panic!("expected redirect");
    };
    assert_eq!(redirect.url, "http://lunar-proxy:8000/orders?id=7");
    assert_eq!(redirect.headers[headers::HOST], "api.example.com:8443");
}

#[test]
fn test_allow_header_consumed_from_request() {
    let (interceptor, _) = common::interceptor(&common::proxy_config());
    let mut request_headers = HeaderMap::new();
    request_headers.insert(headers::ALLOW, HeaderValue::from_static("true"));

    let allow = take_allow_override(&mut request_headers);
    assert!(request_headers.get(headers::ALLOW).is_none());

    let call = call("db.internal").with_allow_override(allow);
    assert!(interceptor.decide(&call).is_redirect());
}

#[test]
fn test_retry_chain_carries_sequence_id() {
    let (interceptor, clock) = common::interceptor(&common::proxy_config());
    let start = clock.now_millis();

    let mut response = HeaderMap::new();
    response.insert(headers::RETRY_AFTER, HeaderValue::from_static("0.25"));
    response.insert(headers::SEQUENCE_ID, HeaderValue::from_static("chain-42"));

    let retry = interceptor.retry_coordinator();
    let sequence_id = retry.prepare_for_retry(&response);
    assert_eq!(sequence_id.as_deref(), Some("chain-42"));
    assert_eq!(clock.now_millis() - start, 250);

    let Decision::Redirect(redirect) =
        interceptor.decide(&call("api.example.com").with_sequence_id(sequence_id))
    else {
        panic!("expected redirect");
    };
    assert_eq!(redirect.headers[headers::SEQUENCE_ID], "chain-42");
}

#[test]
fn test_reconfigure_traffic_clears_state() {
    let (interceptor, _) = common::interceptor(&common::proxy_config());
    assert!(interceptor.decide(&call("api.example.com")).is_redirect());
    assert_eq!(interceptor.policy().classifier().cached("api.example.com"), Some(true));

    interceptor.reconfigure_traffic(&TrafficConfig {
        allow_list: None,
        block_list: Some(vec!["api.example.com".into()]),
    });
    assert_eq!(interceptor.policy().classifier().cache_len(), 0);
    assert!(!interceptor.decide(&call("api.example.com")).is_redirect());
}

#[test]
fn test_no_proxy_configured() {
    let (interceptor, _) = common::interceptor(&Default::default());
    assert!(matches!(
        interceptor.decide(&call("api.example.com")),
        Decision::Bypass(BypassReason::RoutingUnavailable)
    ));
}
