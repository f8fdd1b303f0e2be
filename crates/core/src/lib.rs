//! # Entigate Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The token access gate and the ports the transport and UI plug into
//! - The keyed query cache with single-flight reads and classified retries
//! - The mutation layer that patches and invalidates cached entities
//! - The role-based access filter for the navigation tree
//!
//! ## Architecture Principles
//! - Only depends on `entigate-common` and `entigate-domain`
//! - No HTTP or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod access;
pub mod auth;
pub mod entity;
pub mod notify;
pub mod query;

// Re-export specific items to avoid ambiguity
pub use access::{can_access, filter_menu, Permissions};
pub use auth::ports::TokenAccessor;
pub use auth::TokenGate;
pub use entity::ports::EntityApi;
pub use entity::EntityService;
pub use notify::ports::{MemoryNotifier, Notification, Notifier};
pub use query::{
    mutate, CacheEntry, CacheUpdate, EntityCache, EntityKeys, KeyPart, MutationKind, QueryCache,
    QueryKey, QueryPolicy,
};
