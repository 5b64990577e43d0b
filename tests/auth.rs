//! API key authentication on the routing endpoint.

mod common;

use common::{config_for, metric_sum, with_keys, MockReply, MockUpstream, TestRouter};
use serde_json::Value;

const KEY: &str = "k-7f3a9c2e-secret";

async fn secured() -> (MockUpstream, TestRouter) {
    let upstream = MockUpstream::start(MockReply::json(r#"{"ok": true}"#)).await;
    let config = with_keys(config_for(&[("1", upstream.url())]), &[(KEY, "alice")]);
    let router = TestRouter::start(config).await;
    (upstream, router)
}

#[tokio::test]
async fn test_missing_key_is_401() {
    let (upstream, router) = secured().await;

    let response = router.route("1", None).await;
    assert_eq!(response.status(), 401);
    assert_eq!(response.headers()["www-authenticate"], "ApiKey");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "API key required");

    let response = router.route("1", Some("")).await;
    assert_eq!(response.status(), 401);

    assert_eq!(upstream.api_calls(), 0);
    let metrics = router.metrics().await;
    assert_eq!(
        metric_sum(&metrics, "router_auth_failures_total", &[r#"reason="missing_key""#]),
        2.0
    );
}

#[tokio::test]
async fn test_unknown_key_is_403() {
    let (upstream, router) = secured().await;

    let response = router.route("1", Some("guess")).await;
    assert_eq!(response.status(), 403);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Invalid API key");

    assert_eq!(upstream.api_calls(), 0);
    let metrics = router.metrics().await;
    assert_eq!(
        metric_sum(&metrics, "router_auth_failures_total", &[r#"reason="invalid_key""#]),
        1.0
    );
    assert_eq!(
        metric_sum(&metrics, "router_requests_total", &[r#"cell_id="1""#, r#"status="403""#, r#"client="unknown""#]),
        1.0
    );
}

#[tokio::test]
async fn test_valid_key_routes_without_leaking_it() {
    let (upstream, router) = secured().await;

    let response = router.route("1", Some(KEY)).await;
    assert_eq!(response.status(), 200);
    let headers = format!("{:?}", response.headers());
    let body = response.text().await.unwrap();
    assert!(!body.contains(KEY));
    assert!(!headers.contains(KEY));

    let forwarded = upstream
        .requests()
        .into_iter()
        .find(|r| r.path == "/api")
        .unwrap();
    assert_eq!(forwarded.headers["x-client-id"], "alice");
    assert!(!forwarded.headers.values().any(|v| v.contains(KEY)));

    let metrics = router.metrics().await;
    assert!(!metrics.contains(KEY));
    assert_eq!(
        metric_sum(&metrics, "router_requests_total", &[r#"client="alice""#, r#"status="200""#]),
        1.0
    );
    assert_eq!(metric_sum(&metrics, "router_auth_failures_total", &[]), 0.0);
}

#[tokio::test]
async fn test_disabled_auth_ignores_key() {
    let upstream = MockUpstream::start(MockReply::json("{}")).await;
    let router = TestRouter::start(config_for(&[("1", upstream.url())])).await;

    let response = router.route("1", Some("whatever")).await;
    assert_eq!(response.status(), 200);
    let forwarded = upstream.requests().into_iter().find(|r| r.path == "/api").unwrap();
    assert_eq!(forwarded.headers["x-client-id"], "anonymous");
}

#[tokio::test]
async fn test_non_ascii_key_is_invalid_not_missing() {
    let (upstream, router) = secured().await;

    let response = router
        .client
        .post(router.url("/api/route"))
        .header(
            "x-api-key",
            reqwest::header::HeaderValue::from_bytes(b"k\xff-opaque").unwrap(),
        )
        .json(&serde_json::json!({ "cellID": "1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    assert_eq!(upstream.api_calls(), 0);
    let metrics = router.metrics().await;
    assert_eq!(
        metric_sum(&metrics, "router_auth_failures_total", &[r#"reason="invalid_key""#]),
        1.0
    );
    assert_eq!(
        metric_sum(&metrics, "router_auth_failures_total", &[r#"reason="missing_key""#]),
        0.0
    );
}
