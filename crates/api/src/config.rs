//! Server configuration from environment variables

use anyhow::{Context, Result};
use sendmail_core::SmtpSettings;
use sendmail_core::settings::resolve_recipient_email;
use sendmail_core::template::DEFAULT_TEMPLATE_PATH;
use std::env;
use std::path::PathBuf;

/// Default request body limit (2 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,

    /// Largest SendMail request body accepted; larger bodies get 413
    pub max_body_bytes: usize,

    /// Email body template, relative paths resolve against the working directory
    pub template_path: PathBuf,

    /// Entity-encode subject and body before templating
    pub escape_html: bool,

    /// Address the contact page submits to
    pub recipient_email: String,

    pub smtp: SmtpSettings,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// `FUNCTIONS_CUSTOMHANDLER_PORT` takes precedence over `API_PORT` so the
    /// binary can run as a serverless custom handler unchanged.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("FUNCTIONS_CUSTOMHANDLER_PORT")
                .or_else(|| lookup("API_PORT"))
                .unwrap_or_else(|| "3000".to_string())
                .trim()
                .parse()
                .context("Failed to parse API port as u16")?,
            max_body_bytes: lookup("API_MAX_BODY_BYTES")
                .map(|v| v.trim().parse::<usize>())
                .transpose()
                .context("Failed to parse API_MAX_BODY_BYTES as a byte count")?
                .unwrap_or(DEFAULT_MAX_BODY_BYTES),
            template_path: lookup("EMAIL_TEMPLATE_PATH")
                .unwrap_or_else(|| DEFAULT_TEMPLATE_PATH.to_string())
                .into(),
            escape_html: lookup("EMAIL_ESCAPE_HTML")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
            recipient_email: resolve_recipient_email(&lookup),
            smtp: SmtpSettings::from_lookup(&lookup),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
