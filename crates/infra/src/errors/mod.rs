//! Infrastructure error conversions

pub mod conversions;

pub use conversions::{raw_failure, InfraError};
