//! Message composition
//!
//! Builds the outgoing message from settings, the validated request and the
//! rendered HTML body. The generated Message-ID is kept on the composed
//! message so it can be reported back to the caller after delivery.

use lettre::message::{Mailbox, header::ContentType};
use lettre::{Address, Message};
use sendmail_core::{EmailRequest, SmtpSettings};
use uuid::Uuid;

use crate::{MailerError, Result};

/// A single outgoing HTML email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    pub from_name: String,
    pub from_email: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub message_id: String,
}

/// Compose a message for `request` using the sender identity from `settings`
pub fn compose(
    settings: &SmtpSettings,
    request: &EmailRequest,
    html_body: String,
) -> ComposedMessage {
    ComposedMessage {
        from_name: settings.from_name.clone(),
        from_email: settings.from_email.clone(),
        to: request.to.clone(),
        subject: request.subject.clone(),
        html_body,
        message_id: generate_message_id(&settings.host),
    }
}

/// `<uuid@host>` with a random v4 UUID
pub fn generate_message_id(host: &str) -> String {
    format!("<{}@{}>", Uuid::new_v4(), host)
}

impl ComposedMessage {
    /// Build the `lettre` message: HTML body only, no plain-text alternative
    pub fn to_message(&self) -> Result<Message> {
        let from_address: Address = self.from_email.parse().map_err(|e| {
            MailerError::InvalidAddress(format!(
                "Invalid from address '{}': {}",
                self.from_email, e
            ))
        })?;
        let to_address: Address = self.to.parse().map_err(|e| {
            MailerError::InvalidAddress(format!("Invalid to address '{}': {}", self.to, e))
        })?;

        let from_name = (!self.from_name.is_empty()).then(|| self.from_name.clone());

        Message::builder()
            .from(Mailbox::new(from_name, from_address))
            .to(Mailbox::new(None, to_address))
            .subject(&self.subject)
            .message_id(Some(self.message_id.clone()))
            .header(ContentType::TEXT_HTML)
            .body(self.html_body.clone())
            .map_err(|e| MailerError::Build(e.to_string()))
    }
}
