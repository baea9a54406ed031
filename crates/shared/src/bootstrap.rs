use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize dotenvy
pub fn init_env() {
    dotenvy::dotenv().ok();
}

/// Initialize tracing with console output and a JSON lines log file
///
/// The returned guard must stay alive for buffered file logs to be flushed.
pub fn init_tracing(service_name: &str) -> tracing_appender::non_blocking::WorkerGuard {
    // If LOG_DIR is set, use it. Default to "logs/app"
    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs/app".to_string());

    let now = chrono::Local::now().format("%y-%m-%d-%H-%M-%S").to_string();
    let filename = format!("sendmail-{}.log.{}.jsonl", service_name, now);

    let file_appender = tracing_appender::rolling::never(&log_dir, filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(service_name).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .init();

    guard
}

/// Filter used when `RUST_LOG` is not set
fn default_filter(service_name: &str) -> String {
    format!("info,{}=debug,api=debug,mailer=debug", service_name)
}
