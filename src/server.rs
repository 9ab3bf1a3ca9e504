//! HTTP surface: routing and the outcome-to-response mapping.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::delivery::DeliveryStrategy;
use crate::intake::{
    self, FormKind, SubmissionOutcome, GENERIC_ERROR_MESSAGE, VALIDATION_ERROR_MESSAGE,
};

#[derive(Clone)]
pub struct AppState {
    pub strategy: Arc<dyn DeliveryStrategy>,
}

pub fn build_router(strategy: Arc<dyn DeliveryStrategy>) -> Router {
    let state = AppState { strategy };

    Router::new()
        .route("/health", get(health))
        .route("/leads", post(submit_lead))
        .route("/support", post(submit_support))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn submit_lead(State(state): State<AppState>, Json(payload): Json<Value>) -> Response {
    let outcome = intake::process_submission(FormKind::Lead, &payload, &*state.strategy).await;
    respond(FormKind::Lead, outcome)
}

async fn submit_support(State(state): State<AppState>, Json(payload): Json<Value>) -> Response {
    let outcome = intake::process_submission(FormKind::Support, &payload, &*state.strategy).await;
    respond(FormKind::Support, outcome)
}

/// Map an intake outcome to the wire response. Only lead acceptances
/// expose the delivery id to the caller.
fn respond(kind: FormKind, outcome: SubmissionOutcome) -> Response {
    match outcome {
        SubmissionOutcome::Accepted { id, message } => {
            let body = match kind {
                FormKind::Lead => json!({
                    "success": true,
                    "message": message,
                    "leadId": id,
                }),
                FormKind::Support => json!({
                    "success": true,
                    "message": message,
                }),
            };
            (StatusCode::CREATED, Json(body)).into_response()
        }
        SubmissionOutcome::Rejected { details } => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": VALIDATION_ERROR_MESSAGE,
                "details": details,
            })),
        )
            .into_response(),
        SubmissionOutcome::Conflict { message } => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": message })),
        )
            .into_response(),
        SubmissionOutcome::Fault => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": GENERIC_ERROR_MESSAGE })),
        )
            .into_response(),
    }
}
