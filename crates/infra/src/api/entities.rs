//! REST client for the generic entity endpoints
//!
//! `/rest/entities/<Entity>` with `GET` list, `GET /{id}`, `POST` create,
//! `PUT /{id}` update, `DELETE /{id}` and `POST /search`.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use entigate_common::error::ClassifiedError;
use entigate_core::EntityApi;
use entigate_domain::constants::ENTITIES_BASE_PATH;
use entigate_domain::{Entity, EntityPatch, SearchParams};
use tracing::{debug, instrument};

use crate::http::Transport;

/// [`EntityApi`] implementation over the shared [`Transport`]
pub struct RestEntityClient<E> {
    transport: Arc<Transport>,
    base_path: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> RestEntityClient<E> {
    /// Client for `/rest/entities/<E::NAME>`.
    pub fn new(transport: Arc<Transport>) -> Self {
        Self {
            transport,
            base_path: format!("{ENTITIES_BASE_PATH}/{}", E::NAME),
            _entity: PhantomData,
        }
    }

    /// Path of the collection, e.g. `/rest/entities/User`.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{id}", self.base_path)
    }
}

impl<E> Clone for RestEntityClient<E> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            base_path: self.base_path.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> fmt::Debug for RestEntityClient<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestEntityClient").field("base_path", &self.base_path).finish()
    }
}

#[async_trait]
impl<E: Entity> EntityApi<E> for RestEntityClient<E> {
    #[instrument(skip(self), fields(entity = E::NAME))]
    async fn list(&self) -> Result<Vec<E>, ClassifiedError> {
        self.transport.get_json(&self.base_path).await
    }

    #[instrument(skip(self), fields(entity = E::NAME))]
    async fn get(&self, id: &str) -> Result<E, ClassifiedError> {
        self.transport.get_json(&self.item_path(id)).await
    }

    #[instrument(skip(self, params), fields(entity = E::NAME))]
    async fn search(&self, params: &SearchParams) -> Result<Vec<E>, ClassifiedError> {
        self.transport.post_json(&format!("{}/search", self.base_path), params).await
    }

    #[instrument(skip(self, payload), fields(entity = E::NAME))]
    async fn create(&self, payload: &E::Create) -> Result<E, ClassifiedError> {
        self.transport.post_json(&self.base_path, payload).await
    }

    /// A 2xx without a body means the change was applied; the stored entity
    /// is then fetched so callers still get the server's copy.
    #[instrument(skip(self, patch), fields(entity = E::NAME, id = patch.target_id()))]
    async fn update(&self, patch: &E::Update) -> Result<E, ClassifiedError> {
        let id = patch.target_id();
        let updated: Option<E> = self.transport.put_json(&self.item_path(id), patch).await?;
        match updated {
            Some(entity) => Ok(entity),
            None => {
                debug!(id, "update returned no body, fetching stored entity");
                self.get(id).await
            }
        }
    }

    #[instrument(skip(self), fields(entity = E::NAME))]
    async fn delete(&self, id: &str) -> Result<(), ClassifiedError> {
        self.transport.delete(&self.item_path(id)).await
    }
}

#[cfg(test)]
mod tests {
    use entigate_core::TokenGate;
    use entigate_domain::{ApiConfig, User};

    use super::*;

    #[test]
    fn paths_follow_entity_name() {
        let transport =
            Transport::new(&ApiConfig::new("http://localhost:8080"), Arc::new(TokenGate::new()))
                .unwrap();
        let client = RestEntityClient::<User>::new(Arc::new(transport));

        assert_eq!(client.base_path(), "/rest/entities/User");
        assert_eq!(client.item_path("42"), "/rest/entities/User/42");
        assert!(format!("{client:?}").contains("/rest/entities/User"));
    }
}
