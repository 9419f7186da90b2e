//! Root and `/health` endpoint tests.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use honeypipes::{create_router, AppState, ServiceConfig};
use serde_json::Value;
use tower::ServiceExt;

fn config(extra: &str) -> ServiceConfig {
    let toml_content = format!(
        r#"
[server]
environment = "testing"

[surveymonkey]
access_token = "sm-token"

[attio]
api_key = "attio-key"
{}
"#,
        extra
    );
    ServiceConfig::from_toml_str(&toml_content).expect("config should parse")
}

async fn get_json(config: ServiceConfig, uri: &str) -> (StatusCode, Value) {
    let app = create_router(AppState::from_config(config).expect("clients should build"));

    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.expect("failed to make request");
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");

    (
        status,
        serde_json::from_slice(&body_bytes).expect("response should be valid JSON"),
    )
}

#[tokio::test]
async fn root_returns_static_status() {
    let (status, body) = get_json(config(""), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "HoneyPipes Webhook Processor");

    let timestamp = body["timestamp"].as_str().expect("timestamp should be a string");
    assert!(
        chrono::DateTime::parse_from_rfc3339(timestamp).is_ok(),
        "timestamp should be RFC 3339, got: {}",
        timestamp
    );
}

#[tokio::test]
async fn health_reports_environment_without_database() {
    let (status, body) = get_json(config(""), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["environment"], "testing");
    assert_eq!(body["checks"]["database"], "not_configured");
}

#[tokio::test]
async fn health_reports_reachable_database() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let extra = format!(
        "[health]\ndatabase_url = \"postgres://127.0.0.1:{}/honeypipes\"\n",
        port
    );
    let (status, body) = get_json(config(&extra), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["database"], "connected");
}

#[tokio::test]
async fn health_reports_unreachable_database() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let extra = format!(
        "[health]\ndatabase_url = \"postgres://127.0.0.1:{}/honeypipes\"\n",
        port
    );
    let (status, body) = get_json(config(&extra), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["database"], "disconnected");
}

#[tokio::test]
async fn webhook_route_rejects_get() {
    let app = create_router(AppState::from_config(config("")).unwrap());
    let request = Request::builder()
        .method("GET")
        .uri("/webhook/surveymonkey")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
