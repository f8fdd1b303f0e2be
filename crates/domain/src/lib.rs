//! # Entigate Domain
//!
//! Business domain types and models for Entigate.
//!
//! This crate contains:
//! - The [`Entity`] contract and the `User` entity with its DTOs
//! - Search parameters, menu tree, role and route types
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other Entigate crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
