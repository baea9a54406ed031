//! Error handling for API endpoints
//!
//! Every failure of the SendMail endpoint ends up here and is rendered as an
//! [`EmailResponse`] with `error` and optional `details`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mailer::MailerError;
use sendmail_core::{EmailResponse, RequestError};

/// API error type that can be converted to HTTP responses
#[derive(Debug)]
pub enum ApiError {
    MethodNotAllowed,
    PayloadTooLarge(String),
    EmptyBody,
    InvalidJson(String),
    MissingFields,
    InvalidRecipient(String),
    SendFailed(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::EmptyBody
            | ApiError::InvalidJson(_)
            | ApiError::MissingFields
            | ApiError::InvalidRecipient(_) => StatusCode::BAD_REQUEST,
            ApiError::SendFailed(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_body(self) -> EmailResponse {
        match self {
            ApiError::MethodNotAllowed => EmailResponse::failure(
                "Method not allowed. Only POST requests are accepted.",
                None,
            ),
            ApiError::PayloadTooLarge(details) => {
                EmailResponse::failure("Request body is too large", Some(details))
            }
            ApiError::EmptyBody => EmailResponse::failure("Request body is empty", None),
            ApiError::InvalidJson(details) => {
                EmailResponse::failure("Invalid JSON format in request body", Some(details))
            }
            ApiError::MissingFields => {
                EmailResponse::failure("Missing required fields: to, subject, body", None)
            }
            ApiError::InvalidRecipient(to) => EmailResponse::failure(
                "Invalid required fields: to must be a valid email address",
                Some(format!("'{}' is not a valid email address", to)),
            ),
            ApiError::SendFailed(details) => {
                EmailResponse::failure("Failed to send email", Some(details))
            }
            ApiError::Internal(details) => {
                EmailResponse::failure("Internal server error", Some(details))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Internal(msg) = &self {
            tracing::error!("Internal server error: {}", msg);
        }

        (status, Json(self.into_body())).into_response()
    }
}

/// Convert request parsing failures to ApiError
impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::EmptyBody => ApiError::EmptyBody,
            RequestError::InvalidJson(details) => ApiError::InvalidJson(details),
            RequestError::MissingFields => ApiError::MissingFields,
            RequestError::InvalidRecipient(to) => ApiError::InvalidRecipient(to),
        }
    }
}

/// Convert delivery failures to ApiError
///
/// Transport failures pass the server's text through unchanged as `details`.
impl From<MailerError> for ApiError {
    fn from(err: MailerError) -> Self {
        match err {
            MailerError::SendFailed(details) => ApiError::SendFailed(details),
            other => ApiError::SendFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_method_not_allowed_response() {
        let response = ApiError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let json = body_json(response).await;
        assert_eq!(
            json["error"],
            "Method not allowed. Only POST requests are accepted."
        );
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_payload_too_large_response() {
        let response =
            ApiError::PayloadTooLarge("Request body exceeds the 64 byte limit".to_string())
                .into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Request body is too large");
        assert_eq!(json["details"], "Request body exceeds the 64 byte limit");
    }

    #[tokio::test]
    async fn test_invalid_json_carries_details() {
        let response = ApiError::InvalidJson("EOF while parsing".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid JSON format in request body");
        assert_eq!(json["details"], "EOF while parsing");
    }

    #[test]
    fn test_request_error_conversion() {
        let api_err: ApiError = RequestError::MissingFields.into();
        assert!(matches!(api_err, ApiError::MissingFields));
        assert_eq!(api_err.status(), StatusCode::BAD_REQUEST);

        let api_err: ApiError = RequestError::InvalidRecipient("bad".to_string()).into();
        match api_err {
            ApiError::InvalidRecipient(to) => assert_eq!(to, "bad"),
            _ => panic!("Expected InvalidRecipient error"),
        }
    }

    #[tokio::test]
    async fn test_mailer_error_conversion() {
        let api_err: ApiError = MailerError::MissingAccessToken.into();
        assert_eq!(api_err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(api_err.into_response()).await;
        assert_eq!(json["error"], "Failed to send email");
        assert_eq!(
            json["details"],
            "OAuth2 access token is required for OAuth2 authentication."
        );
    }

    #[tokio::test]
    async fn test_transport_failure_details_are_not_prefixed() {
        let api_err: ApiError = MailerError::SendFailed(
            "permanent error (535): 5.7.8 Authentication credentials invalid".to_string(),
        )
        .into();

        let json = body_json(api_err.into_response()).await;
        assert_eq!(json["error"], "Failed to send email");
        assert_eq!(
            json["details"],
            "permanent error (535): 5.7.8 Authentication credentials invalid"
        );
    }

    #[tokio::test]
    async fn test_internal_error_response() {
        let response = ApiError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Internal server error");
        assert_eq!(json["details"], "boom");
    }
}
