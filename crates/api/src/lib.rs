//! SendMail API Server Library

pub mod config;
pub mod error;
mod middleware;
mod routes;

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::response::{IntoResponse, Response};
use axum::{Router, middleware as axum_middleware};
use mailer::{MailSender, SmtpMailer};
use sendmail_core::{SmtpSettings, TemplateRenderer};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;

pub use routes::contact_page::render_contact_page;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<SmtpSettings>,
    pub renderer: TemplateRenderer,
    pub mailer: Arc<dyn MailSender>,
    pub recipient_email: Arc<str>,
    /// Largest request body accepted, in bytes
    pub body_limit: usize,
}

impl AppState {
    /// State delivering through the configured SMTP server
    pub fn new(config: &config::Config) -> Self {
        Self {
            settings: Arc::new(config.smtp.clone()),
            renderer: TemplateRenderer::new(config.template_path.clone())
                .with_html_escaping(config.escape_html),
            mailer: Arc::new(SmtpMailer::new(config.smtp.clone())),
            recipient_email: Arc::from(config.recipient_email.as_str()),
            body_limit: config.max_body_bytes,
        }
    }

    /// Replace the delivery backend
    pub fn with_mailer(mut self, mailer: Arc<dyn MailSender>) -> Self {
        self.mailer = mailer;
        self
    }
}

/// Map a handler panic to the internal error response
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "Unknown panic message".to_string()
    };

    ApiError::Internal(details).into_response()
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.body_limit;

    Router::new()
        .merge(routes::health::routes())
        .nest(
            "/api",
            routes::send_mail::routes().merge(routes::contact_page::routes()),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(axum_middleware::from_fn(
            crate::middleware::cors::allow_any_origin,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let remote_addr = request
                        .extensions()
                        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
                        .map(|ci| ci.0.to_string())
                        .unwrap_or_else(|| "unknown".into());

                    let user_agent = request
                        .headers()
                        .get(axum::http::header::USER_AGENT)
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("unknown");

                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        remote_addr = %remote_addr,
                        user_agent = %user_agent,
                    )
                })
                .on_request(|_request: &axum::http::Request<_>, _span: &tracing::Span| {
                    tracing::info!("started processing request");
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %response.status(),
                            "finished processing request"
                        );
                    },
                ),
        )
        .with_state(state)
}

/// Run the API server
///
/// Serves until `shutdown` resolves, then drains in-flight requests.
///
/// # Arguments
/// * `state` - Application state with settings, renderer and mail backend
/// * `config` - Server configuration
/// * `shutdown` - Future that completes when the server should stop
pub async fn run_api<F>(
    state: AppState,
    config: &config::Config,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);
    let addr = config.bind_address();

    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}
