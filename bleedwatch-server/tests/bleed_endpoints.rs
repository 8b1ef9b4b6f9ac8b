use std::{future::IntoFuture, sync::Arc, time::Duration};

use bleedwatch_core::{
    CacheEntry, CacheStore, Classification, Counter, InMemoryCacheStore,
    ProbeSignal,
};
use serde_json::{Value, json};

mod common;
use common::{
    BrokenCacheStore, StubProber, build_test_app, build_test_app_with_store,
};

#[tokio::test]
async fn query_form_with_url_probes_parsed_host() {
    let app = build_test_app(StubProber::new("", ProbeSignal::Vulnerable));

    let response = app
        .server
        .get("/bleed/query")
        .add_query_param("u", "https://example.com")
        .add_query_param("skip", "1")
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "code": 0,
        "data": "",
        "error": "",
        "host": "example.com"
    }));

    let seen = app.prober.seen();
    assert_eq!(seen.len(), 1);
    let (target, payload, skip) = &seen[0];
    assert_eq!(target.host, "example.com");
    assert_eq!(target.service, "https");
    assert_eq!(payload.as_slice(), b"bleedwatch.probe");
    assert!(*skip);
}

#[tokio::test]
async fn cached_verdict_is_served_without_probing() {
    let store = Arc::new(InMemoryCacheStore::new());
    store
        .set(CacheEntry::new(
            "example.com",
            Classification::Safe,
            Duration::from_secs(600),
        ))
        .await
        .expect("seed cache");

    let app = build_test_app_with_store(
        StubProber::new("", ProbeSignal::Vulnerable),
        store,
    );

    let response = app
        .server
        .get("/bleed/query")
        .add_query_param("u", "example.com")
        .await;

    response.assert_json(&json!({
        "code": 1,
        "data": "",
        "error": "",
        "host": "example.com"
    }));
    assert_eq!(app.prober.calls(), 0);

    let snapshot = app.state.metrics.snapshot();
    assert_eq!(snapshot.get(Counter::Cached), 1);
    assert_eq!(snapshot.get(Counter::Total), 0);
}

#[tokio::test]
async fn path_form_reports_probe_failure_text() {
    let app = build_test_app(StubProber::new("", ProbeSignal::failed("boom")));

    let response = app.server.get("/bleed/10.0.0.5").await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "code": 2,
        "data": "",
        "error": "boom",
        "host": "10.0.0.5"
    }));

    let seen = app.prober.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0.service, "https");
    assert!(seen[0].2, "path form always skips the confirmation round");
}

#[tokio::test]
async fn leaked_memory_never_reaches_the_response() {
    let app = build_test_app(StubProber::new(
        "secret session cookie",
        ProbeSignal::Vulnerable,
    ));

    let response = app.server.get("/bleed/leaky.example").await;
    let body: Value = response.json();

    assert_eq!(body["code"], 0);
    assert_eq!(body["data"], "");
    assert!(!response.text().contains("secret"));
}

#[tokio::test]
async fn closed_port_is_reported_safe() {
    let app = build_test_app(StubProber::new("", ProbeSignal::Closed));

    let response = app.server.get("/bleed/closed.example").await;
    response.assert_json(&json!({
        "code": 1,
        "data": "",
        "error": "",
        "host": "closed.example"
    }));
}

#[tokio::test]
async fn retry_mismatch_is_reported_as_error() {
    let app = build_test_app(StubProber::new(
        "",
        ProbeSignal::failed("Please try again"),
    ));

    let response = app.server.get("/bleed/flaky.example").await;
    response.assert_json(&json!({
        "code": 2,
        "data": "",
        "error": "Please try again",
        "host": "flaky.example"
    }));
}

#[tokio::test]
async fn missing_u_yields_empty_body_and_no_side_effects() {
    let app = build_test_app(StubProber::new("", ProbeSignal::Vulnerable));

    let response = app
        .server
        .get("/bleed/query")
        .add_query_param("skip", "1")
        .await;

    response.assert_status_ok();
    assert!(response.text().is_empty());
    assert_eq!(app.prober.calls(), 0);

    let snapshot = app.state.metrics.snapshot();
    assert!(snapshot.iter().all(|(_, value)| value == 0));
}

#[tokio::test]
async fn repeated_u_yields_empty_body_and_no_side_effects() {
    let app = build_test_app(StubProber::new("", ProbeSignal::Vulnerable));

    let response = app
        .server
        .get("/bleed/query")
        .add_query_param("u", "a.example")
        .add_query_param("u", "b.example")
        .await;

    response.assert_status_ok();
    assert!(response.text().is_empty());
    assert_eq!(app.prober.calls(), 0);
    assert_eq!(app.state.metrics.snapshot().get(Counter::Total), 0);
}

#[tokio::test]
async fn query_form_without_skip_does_not_skip() {
    let app = build_test_app(StubProber::new("", ProbeSignal::Safe));

    app.server
        .get("/bleed/query")
        .add_query_param("u", "example.com")
        .await
        .assert_status_ok();

    let seen = app.prober.seen();
    assert!(!seen[0].2);
}

#[tokio::test]
async fn url_scheme_and_port_are_taken_from_u() {
    let app = build_test_app(StubProber::new("", ProbeSignal::Safe));

    let response = app
        .server
        .get("/bleed/query")
        .add_query_param("u", "imaps://mail.example:993/inbox")
        .await;

    let body: Value = response.json();
    assert_eq!(body["host"], "mail.example:993");

    let (target, _, _) = &app.prober.seen()[0];
    assert_eq!(target.host, "mail.example:993");
    assert_eq!(target.service, "imaps");
}

#[tokio::test]
async fn second_request_within_ttl_hits_cache() {
    let app = build_test_app(StubProber::new("", ProbeSignal::Vulnerable));

    let first: Value = app.server.get("/bleed/twice.example").await.json();
    let second: Value = app.server.get("/bleed/twice.example").await.json();

    assert_eq!(first, second);
    assert_eq!(app.prober.calls(), 1);

    let snapshot = app.state.metrics.snapshot();
    assert_eq!(snapshot.get(Counter::Total), 1);
    assert_eq!(snapshot.get(Counter::Vulnerable), 1);
    assert_eq!(snapshot.get(Counter::Cached), 1);
}

/// Concurrent misses for one host are not coalesced; each probes.
#[tokio::test]
async fn concurrent_misses_each_probe() {
    let app = build_test_app(
        StubProber::new("", ProbeSignal::Safe)
            .with_delay(Duration::from_millis(100)),
    );

    let (first, second) = tokio::join!(
        app.server.get("/bleed/busy.example").into_future(),
        app.server.get("/bleed/busy.example").into_future(),
    );
    first.assert_status_ok();
    second.assert_status_ok();

    assert_eq!(app.prober.calls(), 2);
    assert_eq!(app.state.metrics.snapshot().get(Counter::Total), 2);
}

#[tokio::test]
async fn cache_write_failure_does_not_change_response() {
    let app = build_test_app_with_store(
        StubProber::new("", ProbeSignal::Vulnerable),
        Arc::new(BrokenCacheStore),
    );

    let response = app.server.get("/bleed/unlucky.example").await;
    response.assert_status_ok();
    response.assert_json(&json!({
        "code": 0,
        "data": "",
        "error": "",
        "host": "unlucky.example"
    }));
}

#[tokio::test]
async fn classification_endpoints_allow_any_origin() {
    let app = build_test_app(StubProber::new("", ProbeSignal::Safe));

    let response = app
        .server
        .get("/bleed/cors.example")
        .add_header("origin", "https://elsewhere.example")
        .await;

    response.assert_status_ok();
    let allow_origin = response
        .headers()
        .get("access-control-allow-origin")
        .and_then(|value| value.to_str().ok());
    assert_eq!(allow_origin, Some("*"));
}

#[tokio::test]
async fn undecodable_path_host_still_classifies() {
    let app = build_test_app(StubProber::new("", ProbeSignal::failed("no such host")));

    let response = app.server.get("/bleed/%FF").await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "code": 2,
        "data": "",
        "error": "no such host",
        "host": "\u{FFFD}"
    }));
    assert_eq!(app.prober.calls(), 1);
}

#[tokio::test]
async fn empty_path_host_is_classified() {
    let app = build_test_app(StubProber::new("", ProbeSignal::failed("empty host")));

    let response = app.server.get("/bleed/").await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "code": 2,
        "data": "",
        "error": "empty host",
        "host": ""
    }));
    let seen = app.prober.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0.host, "");
    assert!(seen[0].2);
}

#[tokio::test]
async fn url_host_is_reported_as_written() {
    let app = build_test_app(StubProber::new("", ProbeSignal::Safe));

    let response = app
        .server
        .get("/bleed/query")
        .add_query_param("u", "https://Example.COM:443/")
        .await;

    let body: Value = response.json();
    assert_eq!(body["host"], "Example.COM:443");
    assert_eq!(app.prober.seen()[0].0.host, "Example.COM:443");
}
