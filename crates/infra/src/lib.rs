//! # Entigate Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The reqwest-backed HTTP client and the authenticated transport
//! - The REST implementation of the entity API
//! - Configuration loading from environment and files
//! - Tracing setup and a log-backed notifier
//!
//! ## Architecture
//! - Implements traits defined in `entigate-core`
//! - Contains all "impure" code (network I/O, environment, files)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{entity_service, RestEntityClient};
pub use errors::InfraError;
pub use http::{HttpClient, RequestDescriptor, Transport, TransportResponse};
pub use observability::{init_tracing, TracingNotifier};
