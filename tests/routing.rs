//! End-to-end routing against mock upstreams.

mod common;

use common::{config_for, metric_sum, MockReply, MockUpstream, TestRouter};
use serde_json::Value;

#[tokio::test]
async fn test_every_cell_routes_to_its_upstream() {
    let mut upstreams = Vec::new();
    for n in 1..=3 {
        upstreams.push(MockUpstream::start(MockReply::json(&format!(r#"{{"served_by": {n}}}"#))).await);
    }
    let config = config_for(&[
        ("1", upstreams[0].url()),
        ("2", upstreams[1].url()),
        ("3", upstreams[2].url()),
    ]);
    let router = TestRouter::start(config).await;

    for n in 1..=3 {
        let response = router.route(&n.to_string(), None).await;
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["cellID"], n.to_string());
        assert_eq!(body["upstream"], format!("nginx-{n}"));
        assert_eq!(body["status"], 200);
        assert_eq!(body["response"]["served_by"], n);
    }

    for upstream in &upstreams {
        assert_eq!(upstream.api_calls(), 1);
    }
}

#[tokio::test]
async fn test_text_body_is_passed_as_string() {
    let upstream = MockUpstream::start(MockReply::text("hello from cell")).await;
    let router = TestRouter::start(config_for(&[("1", upstream.url())])).await;

    let body: Value = router.route("1", None).await.json().await.unwrap();
    assert_eq!(body["response"], "hello from cell");
}

#[tokio::test]
async fn test_upstream_status_is_relayed() {
    let upstream = MockUpstream::start(MockReply::json(r#"{"error": "nope"}"#).with_status(404)).await;
    let router = TestRouter::start(config_for(&[("1", upstream.url())])).await;

    let response = router.route("1", None).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], 404);
    assert_eq!(body["response"]["error"], "nope");
}

#[tokio::test]
async fn test_invalid_cells_never_reach_upstream() {
    let upstream = MockUpstream::start(MockReply::json("{}")).await;
    let router = TestRouter::start(config_for(&[("1", upstream.url()), ("2", upstream.url())])).await;

    for cell in ["", "9", "x", "y", "waytoolongcellid"] {
        let response = router.route(cell, None).await;
        assert_eq!(response.status(), 422, "cell {cell:?}");
        let body: Value = response.json().await.unwrap();
        assert!(body["detail"].is_string());
    }

    let response = router
        .client
        .post(router.url("/api/route"))
        .header("content-type", "application/json")
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);

    assert_eq!(upstream.api_calls(), 0);

    let body: Value = router.route("9", None).await.json().await.unwrap();
    assert_eq!(body["detail"], "cellID must be one of: 1, 2");
}

#[tokio::test]
async fn test_invalid_cells_share_one_label() {
    let upstream = MockUpstream::start(MockReply::json("{}")).await;
    let router = TestRouter::start(config_for(&[("1", upstream.url())])).await;

    router.route("x", None).await;
    router.route("y", None).await;
    router.route("", None).await;

    let metrics = router.metrics().await;
    assert_eq!(
        metric_sum(&metrics, "router_requests_total", &[r#"cell_id="invalid""#, r#"status="422""#]),
        2.0
    );
    assert_eq!(
        metric_sum(&metrics, "router_requests_total", &[r#"cell_id="none""#, r#"status="422""#]),
        1.0
    );
    assert!(!metrics.contains(r#"cell_id="x""#));
    assert!(!metrics.contains(r#"cell_id="y""#));
}

#[tokio::test]
async fn test_forwarded_request_shape() {
    let upstream = MockUpstream::start(MockReply::json("{}")).await;
    let router = TestRouter::start(config_for(&[("1", upstream.url())])).await;

    router.route("1", None).await;

    let requests = upstream.requests();
    let forwarded = requests
        .iter()
        .find(|r| r.path == "/api")
        .expect("upstream saw no /api call");
    assert_eq!(forwarded.method, "POST");
    assert_eq!(forwarded.headers["x-cell-id"], "1");
    assert_eq!(forwarded.headers["x-client-id"], "anonymous");
    assert_eq!(forwarded.headers["x-forwarded-for"], "127.0.0.1");
    assert!(forwarded.headers["x-original-uri"].ends_with("/api/route"));

    let payload: Value = serde_json::from_str(&forwarded.body).unwrap();
    assert_eq!(payload["cellID"], "1");
    assert!(payload["timestamp"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_success_is_counted_per_cell() {
    let upstream = MockUpstream::start(MockReply::json("{}")).await;
    let router = TestRouter::start(config_for(&[("1", upstream.url()), ("2", upstream.url())])).await;

    router.route("1", None).await;
    router.route("1", None).await;
    router.route("2", None).await;

    let metrics = router.metrics().await;
    let labels = [r#"cell_id="1""#, r#"status="200""#, r#"method="POST""#, r#"client="anonymous""#];
    assert_eq!(metric_sum(&metrics, "router_requests_total", &labels), 2.0);
    assert_eq!(
        metric_sum(&metrics, "router_requests_total", &[r#"cell_id="2""#, r#"status="200""#]),
        1.0
    );
    assert_eq!(
        metric_sum(&metrics, "router_request_duration_seconds_count", &[r#"cell_id="1""#]),
        2.0
    );
}
