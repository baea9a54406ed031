//! SMTP and contact-form settings
//!
//! Resolved once from environment variables at startup and passed around
//! explicitly. Resolution never fails: missing values fall back to defaults
//! or empty strings and are checked when a message is actually sent.

use std::env;
use std::fmt;
use std::time::Duration;

/// Default SMTP submission port
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Default SMTP connect/command timeout in seconds
pub const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 60;

/// Recipient shown on the contact page when nothing is configured
pub const DEFAULT_RECIPIENT_EMAIL: &str = "contact@yourcompany.com";

/// SMTP authentication strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthType {
    /// Username + password (PLAIN/LOGIN)
    #[default]
    Basic,
    /// SASL XOAUTH2 with a bearer access token
    OAuth2,
}

impl AuthType {
    /// Anything other than `oauth2` (any case) selects basic auth
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("oauth2") {
            Self::OAuth2
        } else {
            Self::Basic
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::OAuth2 => "oauth2",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SMTP connection settings
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    /// Implicit TLS when true, STARTTLS otherwise
    pub use_ssl: bool,
    pub username: String,
    pub password: String,
    pub auth_type: AuthType,
    pub from_email: String,
    pub from_name: String,

    // OAuth2 settings (Gmail and friends)
    pub oauth2_client_id: Option<String>,
    pub oauth2_client_secret: Option<String>,
    pub oauth2_refresh_token: Option<String>,
    pub oauth2_access_token: Option<String>,

    /// Plaintext SMTP without TLS, for local relays such as Mailpit
    pub allow_insecure: bool,
    /// Connect and per-command timeout
    pub timeout: Duration,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_SMTP_PORT,
            use_ssl: true,
            username: String::new(),
            password: String::new(),
            auth_type: AuthType::Basic,
            from_email: String::new(),
            from_name: String::new(),
            oauth2_client_id: None,
            oauth2_client_secret: None,
            oauth2_refresh_token: None,
            oauth2_access_token: None,
            allow_insecure: false,
            timeout: Duration::from_secs(DEFAULT_SMTP_TIMEOUT_SECS),
        }
    }
}

impl SmtpSettings {
    /// Load settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str| lookup(key).unwrap_or_default();

        Self {
            host: string("SMTP_HOST"),
            port: lookup("SMTP_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            use_ssl: lookup("SMTP_USE_SSL")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(true),
            username: string("SMTP_USERNAME"),
            password: string("SMTP_PASSWORD"),
            auth_type: lookup("AUTH_TYPE")
                .map(|v| AuthType::parse(&v))
                .unwrap_or_default(),
            from_email: string("FROM_EMAIL"),
            from_name: string("FROM_NAME"),
            oauth2_client_id: lookup("OAUTH2_CLIENT_ID"),
            oauth2_client_secret: lookup("OAUTH2_CLIENT_SECRET"),
            oauth2_refresh_token: lookup("OAUTH2_REFRESH_TOKEN"),
            oauth2_access_token: lookup("OAUTH2_ACCESS_TOKEN"),
            allow_insecure: lookup("SMTP_ALLOW_INSECURE")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(false),
            timeout: Duration::from_secs(
                lookup("SMTP_TIMEOUT_SECS")
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(DEFAULT_SMTP_TIMEOUT_SECS),
            ),
        }
    }

    /// Host, username and sender address are all set
    pub fn is_complete(&self) -> bool {
        !self.host.is_empty() && !self.username.is_empty() && !self.from_email.is_empty()
    }

    /// Access token, or an empty string when none is configured
    pub fn access_token(&self) -> &str {
        self.oauth2_access_token.as_deref().unwrap_or_default()
    }
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");

        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_ssl", &self.use_ssl)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("auth_type", &self.auth_type)
            .field("from_email", &self.from_email)
            .field("from_name", &self.from_name)
            .field("oauth2_client_id", &self.oauth2_client_id)
            .field("oauth2_client_secret", &redact(&self.oauth2_client_secret))
            .field("oauth2_refresh_token", &redact(&self.oauth2_refresh_token))
            .field("oauth2_access_token", &redact(&self.oauth2_access_token))
            .field("allow_insecure", &self.allow_insecure)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Recipient the contact page submits to
///
/// `CONTACT_RECIPIENT_EMAIL`, then `FROM_EMAIL`, then a placeholder address.
pub fn resolve_recipient_email<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup("CONTACT_RECIPIENT_EMAIL")
        .or_else(|| lookup("FROM_EMAIL"))
        .unwrap_or_else(|| DEFAULT_RECIPIENT_EMAIL.to_string())
}

/// Accepts `true`/`false` in any case, ignoring surrounding whitespace
fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let settings = SmtpSettings::from_lookup(|_| None);

        assert_eq!(settings.host, "");
        assert_eq!(settings.port, 587);
        assert!(settings.use_ssl);
        assert_eq!(settings.auth_type, AuthType::Basic);
        assert_eq!(settings.username, "");
        assert_eq!(settings.from_email, "");
        assert!(settings.oauth2_access_token.is_none());
        assert!(!settings.allow_insecure);
        assert_eq!(settings.timeout, Duration::from_secs(60));
        assert!(!settings.is_complete());
    }

    #[test]
    fn test_full_configuration() {
        let settings = SmtpSettings::from_lookup(lookup_from(&[
            ("SMTP_HOST", "smtp.gmail.com"),
            ("SMTP_PORT", "465"),
            ("SMTP_USE_SSL", "False"),
            ("SMTP_USERNAME", "me@gmail.com"),
            ("SMTP_PASSWORD", "secret"),
            ("AUTH_TYPE", "OAuth2"),
            ("FROM_EMAIL", "me@gmail.com"),
            ("FROM_NAME", "Me"),
            ("OAUTH2_CLIENT_ID", "client"),
            ("OAUTH2_ACCESS_TOKEN", "ya29.token"),
            ("SMTP_TIMEOUT_SECS", "15"),
        ]));

        assert_eq!(settings.host, "smtp.gmail.com");
        assert_eq!(settings.port, 465);
        assert!(!settings.use_ssl);
        assert_eq!(settings.auth_type, AuthType::OAuth2);
        assert_eq!(settings.from_name, "Me");
        assert_eq!(settings.oauth2_client_id.as_deref(), Some("client"));
        assert_eq!(settings.access_token(), "ya29.token");
        assert_eq!(settings.timeout, Duration::from_secs(15));
        assert!(settings.is_complete());
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let settings = SmtpSettings::from_lookup(lookup_from(&[
            ("SMTP_PORT", "not-a-port"),
            ("SMTP_USE_SSL", "yes"),
            ("AUTH_TYPE", "kerberos"),
            ("SMTP_TIMEOUT_SECS", "soon"),
        ]));

        assert_eq!(settings.port, 587);
        assert!(settings.use_ssl);
        assert_eq!(settings.auth_type, AuthType::Basic);
        assert_eq!(settings.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_port_out_of_range_falls_back() {
        let settings = SmtpSettings::from_lookup(lookup_from(&[("SMTP_PORT", "70000")]));
        assert_eq!(settings.port, 587);
    }

    #[test]
    fn test_whitespace_around_values_is_tolerated() {
        let settings = SmtpSettings::from_lookup(lookup_from(&[
            ("SMTP_PORT", " 2525 "),
            ("SMTP_USE_SSL", " false\n"),
        ]));

        assert_eq!(settings.port, 2525);
        assert!(!settings.use_ssl);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let settings = SmtpSettings {
            password: "hunter2".to_string(),
            oauth2_access_token: Some("ya29.token".to_string()),
            ..SmtpSettings::default()
        };

        let debug_str = format!("{settings:?}");
        assert!(debug_str.contains("SmtpSettings"));
        assert!(!debug_str.contains("hunter2"));
        assert!(!debug_str.contains("ya29.token"));
    }

    #[test]
    fn test_recipient_email_resolution_order() {
        assert_eq!(
            resolve_recipient_email(lookup_from(&[
                ("CONTACT_RECIPIENT_EMAIL", "inbox@example.com"),
                ("FROM_EMAIL", "from@example.com"),
            ])),
            "inbox@example.com"
        );
        assert_eq!(
            resolve_recipient_email(lookup_from(&[("FROM_EMAIL", "from@example.com")])),
            "from@example.com"
        );
        assert_eq!(resolve_recipient_email(|_| None), DEFAULT_RECIPIENT_EMAIL);
    }

    #[test]
    fn test_auth_type_parse() {
        assert_eq!(AuthType::parse("oauth2"), AuthType::OAuth2);
        assert_eq!(AuthType::parse("OAUTH2"), AuthType::OAuth2);
        assert_eq!(AuthType::parse("basic"), AuthType::Basic);
        assert_eq!(AuthType::parse(""), AuthType::Basic);
        assert_eq!(AuthType::OAuth2.to_string(), "oauth2");
    }
}
