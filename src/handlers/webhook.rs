//! `POST /webhook/surveymonkey`

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{instrument, warn};

use crate::domain::model::ProcessOutcome;
use crate::server::AppState;
use crate::utils::error::BridgeError;

/// Accepts a SurveyMonkey notification and answers with the fixed status/body
/// pair for whichever stage finished the request.
#[instrument(name = "surveymonkey_webhook", skip_all, fields(body_size = body.len()))]
pub async fn handle_surveymonkey(State(state): State<AppState>, body: Bytes) -> Response {
    // A non-JSON body is treated as a payload with every field missing.
    let payload: Value = serde_json::from_slice(&body).unwrap_or_else(|e| {
        warn!(error = %e, "Webhook body is not valid JSON");
        Value::Null
    });

    match state.processor.process(&payload).await {
        Ok(outcome) => outcome_response(&outcome),
        Err(e) => error_response(&e),
    }
}

fn outcome_response(outcome: &ProcessOutcome) -> Response {
    let message = match outcome {
        ProcessOutcome::Ignored { .. } => "Event ignored",
        ProcessOutcome::Created { .. } => "Success",
    };
    (StatusCode::OK, Json(json!({ "message": message }))).into_response()
}

fn error_response(error: &BridgeError) -> Response {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    warn!(
        stage = %error.stage(),
        category = ?error.category(),
        status = status.as_u16(),
        error = %error,
        "Webhook rejected"
    );

    (status, Json(json!({ "error": error.public_message() }))).into_response()
}
