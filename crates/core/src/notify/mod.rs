//! User-facing notifications

pub mod ports;
