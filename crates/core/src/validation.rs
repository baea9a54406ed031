//! Parsing and validation of incoming send requests

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};

use crate::error::{RequestError, RequestResult};
use crate::models::EmailRequest;

/// Shape check only (`local@domain.tld`), not RFC 5322 validation
pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(EMAIL_PATTERN)
        .case_insensitive(true)
        .build()
        .expect("email pattern is a valid regex")
});

/// Check that `email` looks like `local@domain.tld`
pub fn is_valid_email(email: &str) -> bool {
    !email.trim().is_empty() && EMAIL_REGEX.is_match(email)
}

/// Parse a raw request body into a validated [`EmailRequest`]
///
/// Field names are matched case-insensitively and unknown fields are ignored.
/// When the same field appears more than once the last occurrence wins.
pub fn parse_email_request(raw: &[u8]) -> RequestResult<EmailRequest> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| RequestError::InvalidJson(format!("body is not valid UTF-8: {e}")))?;

    if text.trim().is_empty() {
        return Err(RequestError::EmptyBody);
    }

    let value: Value =
        serde_json::from_str(text).map_err(|e| RequestError::InvalidJson(e.to_string()))?;

    let fields = match value {
        Value::Object(fields) => fields,
        Value::Null => return Err(RequestError::MissingFields),
        other => {
            return Err(RequestError::InvalidJson(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            )));
        }
    };

    let request = extract_fields(fields)?;
    validate_email_request(&request)?;
    Ok(request)
}

/// Check required fields and recipient shape
pub fn validate_email_request(request: &EmailRequest) -> RequestResult<()> {
    if request.to.trim().is_empty()
        || request.subject.trim().is_empty()
        || request.body.trim().is_empty()
    {
        return Err(RequestError::MissingFields);
    }

    if !is_valid_email(&request.to) {
        return Err(RequestError::InvalidRecipient(request.to.clone()));
    }

    Ok(())
}

fn extract_fields(fields: Map<String, Value>) -> RequestResult<EmailRequest> {
    let mut request = EmailRequest::default();

    for (key, value) in fields {
        let slot = if key.eq_ignore_ascii_case("to") {
            &mut request.to
        } else if key.eq_ignore_ascii_case("subject") {
            &mut request.subject
        } else if key.eq_ignore_ascii_case("body") {
            &mut request.body
        } else {
            continue;
        };

        *slot = match value {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => {
                return Err(RequestError::InvalidJson(format!(
                    "field '{key}' must be a string, found {}",
                    json_kind(&other)
                )));
            }
        };
    }

    Ok(request)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
