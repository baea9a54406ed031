//! Error types for incoming email requests

use thiserror::Error;

/// Reasons an incoming send request is rejected before any mail work starts
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RequestError {
    #[error("Request body is empty")]
    EmptyBody,

    #[error("Invalid JSON format in request body: {0}")]
    InvalidJson(String),

    #[error("Missing required fields: to, subject, body")]
    MissingFields,

    #[error("Invalid email address: {0}")]
    InvalidRecipient(String),
}

impl RequestError {
    /// Malformed input (empty or unparseable body), as opposed to a
    /// well-formed request with bad field values
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::EmptyBody | Self::InvalidJson(_))
    }
}

/// Result type alias for request parsing
pub type RequestResult<T> = Result<T, RequestError>;
