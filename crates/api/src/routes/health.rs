//! Health check endpoint

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub smtp: String,
}

/// Health check endpoint
///
/// Always 200; `smtp` reports whether host, username and sender are set.
/// No connection to the SMTP server is made.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let smtp = if state.settings.is_complete() {
        "configured"
    } else {
        tracing::warn!("Health check: SMTP configuration is incomplete");
        "incomplete"
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        smtp: smtp.to_string(),
    })
}

/// Health check routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
