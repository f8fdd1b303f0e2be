//! Port interface for the remote entity API
//!
//! One implementation talks HTTP to `/rest/entities/<Entity>`; tests plug in
//! in-memory stores. Every failure is already classified when it crosses
//! this boundary.

use async_trait::async_trait;
use entigate_common::error::ClassifiedError;
use entigate_domain::{Entity, SearchParams};

/// CRUD and search operations for one entity type
#[async_trait]
pub trait EntityApi<E: Entity>: Send + Sync {
    /// All entities of the collection.
    async fn list(&self) -> Result<Vec<E>, ClassifiedError>;

    async fn get(&self, id: &str) -> Result<E, ClassifiedError>;

    /// Entities matching `params`.
    async fn search(&self, params: &SearchParams) -> Result<Vec<E>, ClassifiedError>;

    /// Create an entity; the returned value carries the server-assigned id.
    async fn create(&self, payload: &E::Create) -> Result<E, ClassifiedError>;

    /// Apply a partial update to the entity named by the patch.
    async fn update(&self, patch: &E::Update) -> Result<E, ClassifiedError>;

    async fn delete(&self, id: &str) -> Result<(), ClassifiedError>;
}
