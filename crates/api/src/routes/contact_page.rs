//! Contact form page

use axum::{
    Router,
    extract::State,
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};

use crate::AppState;

const CONTACT_PAGE: &str = include_str!("../../assets/contact.html");
const RECIPIENT_TOKEN: &str = "{{recipient_email}}";

/// Page HTML with the recipient shown to the visitor and used by the form script
pub fn render_contact_page(recipient_email: &str) -> String {
    CONTACT_PAGE.replace(RECIPIENT_TOKEN, recipient_email)
}

async fn contact_page(State(state): State<AppState>) -> Response {
    tracing::info!("ContactPage function triggered");

    (
        [
            (CONTENT_TYPE, "text/html; charset=utf-8"),
            (CACHE_CONTROL, "no-cache"),
        ],
        render_contact_page(&state.recipient_email),
    )
        .into_response()
}

/// Contact page routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/ContactPage", get(contact_page))
}
