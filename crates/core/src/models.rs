//! Request and response payloads for the SendMail endpoint

use serde::{Deserialize, Serialize};

/// Incoming email request
///
/// Field names are matched case-insensitively when parsed from a request
/// body, see [`crate::validation::parse_email_request`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// JSON body returned by the SendMail endpoint
///
/// Either `message` + `message_id` (success) or `error` with optional
/// `details` (failure) is populated, never both. Absent fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl EmailResponse {
    pub const SENT_MESSAGE: &'static str = "Email sent successfully";

    /// Successful delivery carrying the generated message id
    pub fn sent(message_id: impl Into<String>) -> Self {
        Self {
            message: Some(Self::SENT_MESSAGE.to_string()),
            message_id: Some(message_id.into()),
            ..Self::default()
        }
    }

    /// Failure summary with an optional diagnostic cause
    pub fn failure(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            error: Some(error.into()),
            details,
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.message_id.is_some()
    }
}
