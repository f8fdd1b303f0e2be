//! Entity API client
//!
//! HTTP implementation of the core `EntityApi` port, plus the wiring that
//! puts a cached [`EntityService`] on top of it.

pub mod entities;

use std::sync::Arc;

use entigate_core::{EntityService, Notifier, QueryPolicy};
use entigate_domain::Entity;

pub use entities::RestEntityClient;

use crate::http::Transport;

/// Cached service for `E` backed by the REST endpoints behind `transport`.
pub fn entity_service<E: Entity>(
    transport: &Arc<Transport>,
    notifier: Arc<dyn Notifier>,
    policy: QueryPolicy,
) -> EntityService<E> {
    EntityService::new(Arc::new(RestEntityClient::<E>::new(Arc::clone(transport))), notifier, policy)
}
