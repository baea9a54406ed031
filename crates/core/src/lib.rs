//! SendMail Core - Domain logic and models
//!
//! Settings resolution, request validation and template rendering for the
//! contact-form mail relay. Nothing in here talks to the network.

pub mod error;
pub mod models;
pub mod settings;
pub mod template;
pub mod validation;

pub use error::RequestError;
pub use models::{EmailRequest, EmailResponse};
pub use settings::{AuthType, SmtpSettings};
pub use template::TemplateRenderer;
pub use validation::{is_valid_email, parse_email_request};
