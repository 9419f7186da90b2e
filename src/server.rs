//! HTTP server setup and request routing.
//!
//! Requests flow through the middleware in order:
//! 1. Request/response tracing
//! 2. Timeout enforcement (`server.request_timeout_seconds`)
//! 3. Panic capture, rendered as `{"error": "Processing failed"}`
//! 4. Handler execution

use std::{any::Any, sync::Arc};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::adapters::{AttioClient, SurveyMonkeyClient};
use crate::config::ServiceConfig;
use crate::core::processor::WebhookProcessor;
use crate::handlers;
use crate::utils::error::{BridgeError, Result};

/// Shared, immutable state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub processor: WebhookProcessor,
}

impl AppState {
    pub fn new(config: ServiceConfig, processor: WebhookProcessor) -> Self {
        Self {
            config: Arc::new(config),
            processor,
        }
    }

    /// Wires the production SurveyMonkey and Attio clients from configuration.
    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        let survey = SurveyMonkeyClient::new(&config.surveymonkey)?;
        let crm = AttioClient::new(&config.attio)?;
        let processor = WebhookProcessor::new(Arc::new(survey), Arc::new(crm));
        Ok(Self::new(config, processor))
    }
}

pub fn create_router(state: AppState) -> Router {
    let request_timeout = state.config.request_timeout();

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/webhook/surveymonkey", post(handlers::handle_surveymonkey))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    let error = BridgeError::UnhandledError { message };
    error!(error = %error, "Exception processing webhook");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": error.public_message() })),
    )
        .into_response()
}

/// Binds to `server.host:server.port` and serves until Ctrl-C or SIGTERM.
pub async fn start_server(state: AppState) -> Result<()> {
    let addr = state.config.bind_address();
    let app = create_router(state);

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received CTRL+C, starting graceful shutdown"),
        () = terminate => info!("Received SIGTERM, starting graceful shutdown"),
    }

    warn!("Waiting for in-flight webhook deliveries to complete");
}
