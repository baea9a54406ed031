//! SendMail endpoint
//!
//! Accepts `{to, subject, body}` as JSON and relays it over SMTP. The route
//! takes every method so CORS preflight and the 405 case are answered with
//! the same JSON shapes as the rest of the endpoint.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{
        Method, StatusCode,
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS},
    },
    response::{IntoResponse, Response},
    routing::any,
};
use mailer::compose;
use sendmail_core::{EmailResponse, parse_email_request};

use crate::AppState;
use crate::error::ApiError;

/// Handle a SendMail request
async fn send_mail(
    State(state): State<AppState>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    tracing::info!("SendMail function triggered");

    if method == Method::OPTIONS {
        return preflight();
    }

    if method != Method::POST {
        return ApiError::MethodNotAllowed.into_response();
    }

    match deliver(&state, body).await {
        Ok(message_id) => (StatusCode::OK, Json(EmailResponse::sent(message_id))).into_response(),
        Err(err) => err.into_response(),
    }
}

/// CORS preflight answer
fn preflight() -> Response {
    (
        StatusCode::OK,
        [
            (ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, Authorization"),
        ],
    )
        .into_response()
}

/// Validate, render, compose and send; returns the message id
async fn deliver(
    state: &AppState,
    body: Result<Bytes, BytesRejection>,
) -> Result<String, ApiError> {
    let body = body.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            tracing::warn!("Rejected request body: {}", e.body_text());
            ApiError::PayloadTooLarge(format!(
                "Request body exceeds the {} byte limit",
                state.body_limit
            ))
        } else {
            ApiError::Internal(e.body_text())
        }
    })?;

    let request = parse_email_request(&body).map_err(|e| {
        if e.is_parse_error() {
            tracing::error!("Invalid request body: {}", e);
        } else {
            tracing::warn!("Rejected email request: {}", e);
        }
        ApiError::from(e)
    })?;

    tracing::info!(
        "Sending email to {} with subject '{}'",
        request.to,
        request.subject
    );

    let html = state.renderer.render(&request.subject, &request.body).await;
    let message = compose(&state.settings, &request, html);

    let message_id = state.mailer.send(&message).await.map_err(|e| {
        tracing::error!("Failed to send email to {}: {}", request.to, e);
        ApiError::from(e)
    })?;

    tracing::info!(
        "Email sent successfully to {}, MessageId: {}",
        request.to,
        message_id
    );

    Ok(message_id)
}

/// SendMail routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/SendMail", any(send_mail))
}
