use anyhow::Result;
use api::config::Config;
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    sendmail_shared::init_env();

    // The guard must be kept alive for the duration of the program to ensure logs are flushed
    let _guard = sendmail_shared::init_tracing("sendmail");

    tracing::info!("🚀 Starting SendMail relay");

    let config = Config::from_env()?;
    if config.smtp.is_complete() {
        tracing::info!(
            "✓ Configuration loaded (SMTP {}:{}, auth {})",
            config.smtp.host,
            config.smtp.port,
            config.smtp.auth_type
        );
    } else {
        tracing::warn!("SMTP configuration is incomplete; SendMail requests will fail");
    }

    let state = api::AppState::new(&config);

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        wait_for_shutdown().await;
        tracing::info!("📡 Shutdown signal received");
        signal_token.cancel();
    });

    api::run_api(state, &config, shutdown.cancelled_owned()).await?;

    tracing::info!("✓ Server stopped gracefully");
    Ok(())
}

async fn wait_for_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
