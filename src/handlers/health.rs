//! Liveness and health endpoints.
//!
//! The service owns no database. When a `database_url` is configured the
//! health check reports whether its host and port accept TCP connections.

use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tokio::net::TcpStream;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::server::AppState;

pub const SERVICE_NAME: &str = "HoneyPipes Webhook Processor";

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: DatabaseStatus,
    pub environment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseStatus {
    Connected,
    Disconnected,
    NotConfigured,
}

/// `GET /`
#[instrument(name = "root", skip_all)]
pub async fn root() -> Response {
    let response = RootResponse {
        status: "ok",
        service: SERVICE_NAME,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// `GET /health`
#[instrument(name = "health_check", skip_all)]
pub async fn health_check(State(state): State<AppState>) -> Response {
    let health = &state.config.health;
    let database = probe_database(
        health.database_url.as_deref(),
        Duration::from_secs(health.probe_timeout_seconds),
    )
    .await;

    debug!(database = ?database, "Health check completed");

    let response = HealthResponse {
        status: "healthy",
        checks: HealthChecks {
            database,
            environment: state.config.server.environment.clone(),
        },
    };

    (StatusCode::OK, Json(response)).into_response()
}

pub async fn probe_database(database_url: Option<&str>, timeout: Duration) -> DatabaseStatus {
    let Some(raw) = database_url else {
        return DatabaseStatus::NotConfigured;
    };

    let Some((host, port)) = database_address(raw) else {
        warn!("Database URL has no usable host and port");
        return DatabaseStatus::Disconnected;
    };

    match tokio::time::timeout(timeout, TcpStream::connect((host.as_str(), port))).await {
        Ok(Ok(_)) => DatabaseStatus::Connected,
        Ok(Err(e)) => {
            warn!(error = %e, "Database probe failed");
            DatabaseStatus::Disconnected
        }
        Err(_) => {
            warn!("Database probe timed out");
            DatabaseStatus::Disconnected
        }
    }
}

fn database_address(raw: &str) -> Option<(String, u16)> {
    let url = Url::parse(raw).ok()?;
    let host = url.host_str()?.trim_matches(|c| c == '[' || c == ']').to_string();
    let port = url.port().or(match url.scheme() {
        "postgres" | "postgresql" => Some(5432),
        "mysql" | "mariadb" => Some(3306),
        "redis" => Some(6379),
        _ => None,
    })?;
    Some((host, port))
}
