//! API route modules

pub mod contact_page;
pub mod health;
pub mod send_mail;
