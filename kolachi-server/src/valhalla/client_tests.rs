//! Tests for the routing engine client against an in-process engine.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};

use super::*;

/// A canned engine body with spacing that re-serialisation would change.
const ROUTE_BODY: &str = r#"{"trip":{"status":0,  "legs":[]},"id":"x"}"#;

/// Serve `router` on an ephemeral port and return its base URL.
async fn spawn_engine(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

/// Base URL of a port nothing is listening on.
async fn dead_engine() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn client(base_url: &str) -> ValhallaClient {
    ValhallaClient::new(ValhallaConfig::new(base_url)).unwrap()
}

fn karachi_route(costing: &str) -> RouteRequest {
    shape_route(
        Location::new(24.87, 67.02),
        Location::new(24.86, 67.01),
        costing,
        None,
    )
}

#[tokio::test]
async fn route_body_passed_through() {
    let received: Arc<Mutex<Option<Value>>> = Arc::default();

    let router = Router::new()
        .route(
            "/route",
            post(
                |State(seen): State<Arc<Mutex<Option<Value>>>>, Json(body): Json<Value>| async move {
                    *seen.lock().unwrap() = Some(body);
                    ROUTE_BODY
                },
            ),
        )
        .with_state(received.clone());
    let base = spawn_engine(router).await;

    let body = client(&base).route(&karachi_route("multimodal")).await.unwrap();
    assert_eq!(body, ROUTE_BODY);

    let sent = received.lock().unwrap().take().unwrap();
    assert_eq!(sent["costing"], "multimodal");
    assert_eq!(sent["locations"][1], json!({"lat": 24.86, "lon": 67.01}));
    assert_eq!(sent["costing_options"]["transit"]["use_rail"], 1);
}

#[tokio::test]
async fn isochrone_posts_contours() {
    let router = Router::new().route(
        "/isochrone",
        post(|Json(body): Json<Value>| async move {
            Json(json!({"type": "FeatureCollection", "echo": body}))
        }),
    );
    let base = spawn_engine(router).await;

    let request = shape_isochrone(Location::new(24.86, 67.01), "pedestrian", &[5, 10], true);
    let body = client(&base).isochrone(&request).await.unwrap();

    let parsed: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed["type"], "FeatureCollection");
    assert_eq!(parsed["echo"]["contours"], json!([{"time": 5}, {"time": 10}]));
    assert_eq!(parsed["echo"]["polygons"], true);
}

#[tokio::test]
async fn error_status_is_reported() {
    let router = Router::new().route(
        "/route",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                r#"{"error_code":171,"error":"No suitable edges near location"}"#,
            )
        }),
    );
    let base = spawn_engine(router).await;

    let err = client(&base)
        .route(&karachi_route("auto"))
        .await
        .unwrap_err();

    match &err {
        ValhallaError::Status { status, body } => {
            assert_eq!(*status, 400);
            assert!(body.contains("No suitable edges"));
        }
        other => panic!("expected Status, got {other:?}"),
    }
    assert!(err.to_string().starts_with("routing engine error"));
}

#[tokio::test]
async fn slow_engine_times_out() {
    let router = Router::new().route(
        "/route",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            ROUTE_BODY
        }),
    );
    let base = spawn_engine(router).await;

    let client = ValhallaClient::new(
        ValhallaConfig::new(&base).with_timeout(Duration::from_millis(200)),
    )
    .unwrap();

    let err = client.route(&karachi_route("auto")).await.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {err:?}");
    assert!(err.to_string().starts_with("routing engine error"));
}

#[tokio::test]
async fn unreachable_engine_is_transport_error() {
    let base = dead_engine().await;

    let err = client(&base)
        .route(&karachi_route("auto"))
        .await
        .unwrap_err();

    assert!(matches!(err, ValhallaError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn probe_healthy_engine() {
    let router = Router::new().route(
        "/status",
        get(|| async { Json(json!({"version": "3.4.0"})) }),
    );
    let base = spawn_engine(router).await;

    assert!(client(&base).probe().await);
}

#[tokio::test]
async fn probe_unreachable_engine() {
    let base = dead_engine().await;
    assert!(!client(&base).probe().await);
}

#[tokio::test]
async fn probe_failing_engine() {
    let router = Router::new().route(
        "/status",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let base = spawn_engine(router).await;

    assert!(!client(&base).probe().await);
}

#[tokio::test]
async fn probe_slow_engine() {
    let router = Router::new().route(
        "/status",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "{}"
        }),
    );
    let base = spawn_engine(router).await;

    let client = ValhallaClient::new(
        ValhallaConfig::new(&base).with_probe_timeout(Duration::from_millis(200)),
    )
    .unwrap();

    assert!(!client.probe().await);
}
