//! SendMail Shared - process bootstrap helpers

pub mod bootstrap;

pub use bootstrap::{init_env, init_tracing};
