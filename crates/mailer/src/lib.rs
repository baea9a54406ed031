//! SendMail Mailer - message composition and SMTP delivery
//!
//! This crate turns a validated request into a MIME message and hands it to
//! an SMTP server using `lettre`. One connection is opened per send.

use thiserror::Error;

pub mod compose;
pub mod smtp;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use compose::{ComposedMessage, compose, generate_message_id};
pub use smtp::{MailSender, SmtpMailer};

/// Mailer errors
#[derive(Error, Debug)]
pub enum MailerError {
    #[error("SMTP configuration is incomplete. Please check environment variables.")]
    IncompleteConfig,
    #[error("OAuth2 access token is required for OAuth2 authentication.")]
    MissingAccessToken,
    #[error("SMTP password is required for basic authentication.")]
    MissingPassword,
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
    #[error("Failed to build message: {0}")]
    Build(String),
    #[error("SMTP connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Failed to send email: {0}")]
    SendFailed(String),
}

impl MailerError {
    /// Raised before any connection attempt because settings are unusable
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::IncompleteConfig | Self::MissingAccessToken | Self::MissingPassword
        )
    }
}

/// Result type for mailer operations
pub type Result<T> = std::result::Result<T, MailerError>;
