//! SMTP delivery
//!
//! Every send validates the settings, then drives exactly one SMTP session
//! by hand: connect, optional STARTTLS, authenticate, transmit. Once the
//! server has greeted us the session always ends with QUIT, whether or not
//! the transaction succeeded. There is no pooling and no retry.

use async_trait::async_trait;
use lettre::Message;
use lettre::transport::smtp::Error as SmtpError;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{AsyncSmtpConnection, TlsParameters};
use lettre::transport::smtp::extension::ClientId;
use sendmail_core::{AuthType, SmtpSettings};

use crate::compose::ComposedMessage;
use crate::{MailerError, Result};

/// Capability to deliver a composed message
///
/// Returns the message id on success.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, message: &ComposedMessage) -> Result<String>;
}

/// How the SMTP session is protected
pub enum Security {
    /// No TLS at all (local relays only)
    Plaintext,
    /// TLS from the first byte (SMTPS)
    Implicit(TlsParameters),
    /// Plain connect followed by a mandatory STARTTLS upgrade
    StartTls(TlsParameters),
}

/// Credentials and SASL mechanisms for one session
struct Login {
    credentials: Credentials,
    mechanisms: Vec<Mechanism>,
}

/// Delivers messages through the configured SMTP server
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    settings: SmtpSettings,
}

impl SmtpMailer {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SmtpSettings {
        &self.settings
    }

    /// Credentials and SASL mechanisms for the configured auth type
    fn login(&self) -> Result<Login> {
        let settings = &self.settings;

        match settings.auth_type {
            AuthType::OAuth2 => {
                let token = settings.access_token();
                if token.is_empty() {
                    return Err(MailerError::MissingAccessToken);
                }
                Ok(Login {
                    credentials: Credentials::new(settings.username.clone(), token.to_string()),
                    mechanisms: vec![Mechanism::Xoauth2],
                })
            }
            AuthType::Basic => {
                if settings.password.is_empty() {
                    return Err(MailerError::MissingPassword);
                }
                Ok(Login {
                    credentials: Credentials::new(
                        settings.username.clone(),
                        settings.password.clone(),
                    ),
                    mechanisms: vec![Mechanism::Plain, Mechanism::Login],
                })
            }
        }
    }

    /// Transport security for the configured host
    pub fn security(&self) -> Result<Security> {
        let settings = &self.settings;

        if settings.allow_insecure {
            return Ok(Security::Plaintext);
        }

        let tls = TlsParameters::new(settings.host.clone()).map_err(|e| {
            MailerError::ConnectionFailed(format!("Failed to create TLS parameters: {}", e))
        })?;

        Ok(if settings.use_ssl {
            Security::Implicit(tls)
        } else {
            Security::StartTls(tls)
        })
    }

    /// Open the connection; EHLO has been exchanged when this returns
    async fn connect(
        &self,
        security: &Security,
        hello_name: &ClientId,
    ) -> std::result::Result<AsyncSmtpConnection, SmtpError> {
        let implicit_tls = match security {
            Security::Implicit(tls) => Some(tls.clone()),
            Security::Plaintext | Security::StartTls(_) => None,
        };

        AsyncSmtpConnection::connect_tokio1(
            (self.settings.host.as_str(), self.settings.port),
            Some(self.settings.timeout),
            hello_name,
            implicit_tls,
            None,
        )
        .await
    }

    /// Everything between the greeting and QUIT
    async fn transact(
        conn: &mut AsyncSmtpConnection,
        security: Security,
        hello_name: &ClientId,
        login: &Login,
        email: &Message,
    ) -> std::result::Result<(), SmtpError> {
        if let Security::StartTls(tls) = security {
            conn.starttls(tls, hello_name).await?;
        }

        conn.auth(&login.mechanisms, &login.credentials).await?;
        conn.send(email.envelope(), &email.formatted()).await?;
        Ok(())
    }

    /// QUIT, or just drop the socket if the session is already broken
    async fn close(conn: &mut AsyncSmtpConnection) {
        if conn.has_broken() {
            conn.abort().await;
        } else if let Err(e) = conn.quit().await {
            tracing::debug!("SMTP QUIT failed: {}", e);
        }
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send(&self, message: &ComposedMessage) -> Result<String> {
        if !self.settings.is_complete() {
            return Err(MailerError::IncompleteConfig);
        }

        let login = self.login()?;
        let security = self.security()?;
        let email = message.to_message()?;
        let hello_name = ClientId::default();

        tracing::info!(
            "Connecting to SMTP server: {}:{} (auth: {})",
            self.settings.host,
            self.settings.port,
            self.settings.auth_type
        );

        let mut conn = self.connect(&security, &hello_name).await.map_err(|e| {
            tracing::error!("Failed to connect to SMTP server for {}: {}", message.to, e);
            MailerError::SendFailed(e.to_string())
        })?;

        let outcome = Self::transact(&mut conn, security, &hello_name, &login, &email).await;
        Self::close(&mut conn).await;

        outcome.map_err(|e| {
            tracing::error!("Failed to send email to {}: {}", message.to, e);
            MailerError::SendFailed(e.to_string())
        })?;

        tracing::info!(
            "Email sent successfully to {} with message ID {}",
            message.to,
            message.message_id
        );

        Ok(message.message_id.clone())
    }
}
