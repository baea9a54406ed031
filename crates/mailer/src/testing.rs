//! In-process mock SMTP server for tests
//!
//! Accepts a single connection on `127.0.0.1`, answers just enough of the
//! protocol for `lettre` to deliver one message, and records every line the
//! client sent (including DATA content).

use std::io;

use sendmail_core::SmtpSettings;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Which stage of the transaction the server refuses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reject {
    Nothing,
    Auth,
    Recipients,
}

pub struct MockSmtpServer {
    port: u16,
    handle: JoinHandle<Vec<String>>,
}

impl MockSmtpServer {
    /// Start a server that accepts any credentials
    pub async fn start() -> io::Result<Self> {
        Self::spawn(Reject::Nothing).await
    }

    /// Start a server that answers every AUTH with 535
    pub async fn rejecting_auth() -> io::Result<Self> {
        Self::spawn(Reject::Auth).await
    }

    /// Start a server that answers every RCPT with 550
    pub async fn rejecting_recipients() -> io::Result<Self> {
        Self::spawn(Reject::Recipients).await
    }

    async fn spawn(reject: Reject) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();

        let handle = tokio::spawn(async move {
            let mut transcript = Vec::new();
            if let Ok((socket, _)) = listener.accept().await {
                let _ = serve(socket, reject, &mut transcript).await;
            }
            transcript
        });

        Ok(Self { port, handle })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Plaintext settings pointing at this server with basic auth
    pub fn settings(&self) -> SmtpSettings {
        SmtpSettings {
            host: "127.0.0.1".to_string(),
            port: self.port,
            use_ssl: false,
            username: "relay@example.com".to_string(),
            password: "secret".to_string(),
            from_email: "relay@example.com".to_string(),
            from_name: "Contact Relay".to_string(),
            allow_insecure: true,
            ..SmtpSettings::default()
        }
    }

    /// Wait for the session to end and return the lines received
    pub async fn transcript(self) -> Vec<String> {
        self.handle.await.unwrap_or_default()
    }
}

async fn serve(
    socket: TcpStream,
    reject: Reject,
    transcript: &mut Vec<String>,
) -> io::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();

    writer.write_all(b"220 localhost ESMTP mock\r\n").await?;

    while let Some(line) = lines.next_line().await? {
        transcript.push(line.clone());
        let command = line.to_ascii_uppercase();

        if command.starts_with("EHLO") || command.starts_with("HELO") {
            writer
                .write_all(b"250-localhost\r\n250-AUTH PLAIN LOGIN XOAUTH2\r\n250 8BITMIME\r\n")
                .await?;
        } else if command.starts_with("AUTH") {
            if reject == Reject::Auth {
                writer
                    .write_all(b"535 5.7.8 Authentication credentials invalid\r\n")
                    .await?;
            } else {
                writer.write_all(b"235 2.7.0 Authentication successful\r\n").await?;
            }
        } else if command.starts_with("MAIL FROM") {
            writer.write_all(b"250 2.1.0 Ok\r\n").await?;
        } else if command.starts_with("RCPT TO") {
            if reject == Reject::Recipients {
                writer
                    .write_all(b"550 5.1.1 Recipient address rejected\r\n")
                    .await?;
            } else {
                writer.write_all(b"250 2.1.5 Ok\r\n").await?;
            }
        } else if command.starts_with("DATA") {
            writer
                .write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n")
                .await?;
            while let Some(data) = lines.next_line().await? {
                if data == "." {
                    break;
                }
                transcript.push(data);
            }
            writer.write_all(b"250 2.0.0 Ok: queued\r\n").await?;
        } else if command.starts_with("QUIT") {
            writer.write_all(b"221 2.0.0 Bye\r\n").await?;
            break;
        } else if command.starts_with("RSET") || command.starts_with("NOOP") {
            writer.write_all(b"250 2.0.0 Ok\r\n").await?;
        } else {
            writer.write_all(b"502 5.5.2 Command not recognized\r\n").await?;
        }
    }

    Ok(())
}
