//! Response middleware

pub mod cors;
