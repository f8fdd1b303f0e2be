//! Cached reads and notified writes for one entity collection

use std::sync::Arc;

use entigate_common::error::ClassifiedError;
use entigate_common::resilience::{Clock, SystemClock};
use entigate_domain::{Entity, EntityPatch, SearchParams};
use futures::future::try_join_all;
use tracing::{debug, instrument};

use super::ports::EntityApi;
use crate::notify::ports::Notifier;
use crate::query::{mutate, CacheUpdate, EntityCache, EntityKeys, MutationKind, QueryPolicy};

/// Entity collection service
///
/// Reads are served through the collection's [`EntityCache`]; writes go
/// straight to the API and patch the cache on success.
pub struct EntityService<E: Entity, C = SystemClock> {
    api: Arc<dyn EntityApi<E>>,
    cache: EntityCache<E, C>,
    notifier: Arc<dyn Notifier>,
}

impl<E: Entity> EntityService<E, SystemClock> {
    /// Service with a fresh cache on the system clock.
    pub fn new(api: Arc<dyn EntityApi<E>>, notifier: Arc<dyn Notifier>, policy: QueryPolicy) -> Self {
        Self::with_cache(api, notifier, EntityCache::new(policy))
    }
}

impl<E, C> EntityService<E, C>
where
    E: Entity,
    C: Clock + Clone,
{
    /// Create a service around an existing cache, e.g. one shared with
    /// another view or driven by a mock clock.
    pub fn with_cache(
        api: Arc<dyn EntityApi<E>>,
        notifier: Arc<dyn Notifier>,
        cache: EntityCache<E, C>,
    ) -> Self {
        Self { api, cache, notifier }
    }

    /// Cache backing this collection's reads.
    pub fn cache(&self) -> &EntityCache<E, C> {
        &self.cache
    }

    /// Every entity, cached under `[collection, "list"]`.
    ///
    /// # Errors
    ///
    /// The classified fetch error once retries are exhausted.
    #[instrument(skip(self), fields(collection = E::COLLECTION))]
    pub async fn list(&self) -> Result<Vec<E>, ClassifiedError> {
        let api = Arc::clone(&self.api);
        self.cache
            .lists()
            .query(EntityKeys::lists::<E>(), move || {
                let api = Arc::clone(&api);
                async move { api.list().await }
            })
            .await
    }

    /// One entity, cached under `[collection, "detail", id]`.
    ///
    /// An empty id addresses nothing: no request is made and `None` is
    /// returned.
    ///
    /// # Errors
    ///
    /// The classified fetch error once retries are exhausted.
    #[instrument(skip(self), fields(collection = E::COLLECTION))]
    pub async fn detail(&self, id: &str) -> Result<Option<E>, ClassifiedError> {
        if id.is_empty() {
            debug!("empty id, skipping detail query");
            return Ok(None);
        }

        let api = Arc::clone(&self.api);
        let owned_id = id.to_string();
        self.cache
            .details()
            .query(EntityKeys::detail::<E>(id), move || {
                let api = Arc::clone(&api);
                let id = owned_id.clone();
                async move { api.get(&id).await }
            })
            .await
            .map(Some)
    }

    /// Entities matching `params`, cached under `[collection, "list",
    /// params]`.
    ///
    /// # Errors
    ///
    /// The classified fetch error once retries are exhausted.
    #[instrument(skip(self, params), fields(collection = E::COLLECTION))]
    pub async fn search(&self, params: &SearchParams) -> Result<Vec<E>, ClassifiedError> {
        let api = Arc::clone(&self.api);
        let owned_params = params.clone();
        self.cache
            .lists()
            .query(EntityKeys::list::<E>(params), move || {
                let api = Arc::clone(&api);
                let params = owned_params.clone();
                async move { api.search(&params).await }
            })
            .await
    }

    /// Create an entity and add it to every cached list.
    ///
    /// # Errors
    ///
    /// The classified error of the request; the user has been notified.
    #[instrument(skip(self, payload), fields(collection = E::COLLECTION))]
    pub async fn create(&self, payload: E::Create) -> Result<E, ClassifiedError> {
        mutate(
            &self.cache,
            self.notifier.as_ref(),
            MutationKind::Create,
            self.api.create(&payload),
            |created: &E| CacheUpdate::Created(created.clone()),
        )
        .await
    }

    /// Update an entity and replace it wherever it is cached.
    ///
    /// # Errors
    ///
    /// The classified error of the request; the user has been notified.
    #[instrument(skip(self, patch), fields(collection = E::COLLECTION, id = patch.target_id()))]
    pub async fn update(&self, patch: E::Update) -> Result<E, ClassifiedError> {
        mutate(
            &self.cache,
            self.notifier.as_ref(),
            MutationKind::Update,
            self.api.update(&patch),
            |updated: &E| CacheUpdate::Updated(updated.clone()),
        )
        .await
    }

    /// Delete an entity and drop it from every cached list and detail.
    ///
    /// # Errors
    ///
    /// The classified error of the request; the user has been notified.
    #[instrument(skip(self), fields(collection = E::COLLECTION))]
    pub async fn delete(&self, id: &str) -> Result<(), ClassifiedError> {
        mutate(
            &self.cache,
            self.notifier.as_ref(),
            MutationKind::Delete,
            self.api.delete(id),
            |_| CacheUpdate::Deleted(vec![id.to_string()]),
        )
        .await
    }

    /// Delete several entities concurrently.
    ///
    /// The cache is patched only when every delete succeeded.
    ///
    /// # Errors
    ///
    /// The first classified error among the requests; the user has been
    /// notified once.
    #[instrument(skip(self, ids), fields(collection = E::COLLECTION, count = ids.len()))]
    pub async fn delete_many(&self, ids: &[String]) -> Result<(), ClassifiedError> {
        let requests = try_join_all(ids.iter().map(|id| self.api.delete(id)));
        mutate(
            &self.cache,
            self.notifier.as_ref(),
            MutationKind::DeleteMany,
            async move { requests.await.map(|_| ()) },
            |_| CacheUpdate::Deleted(ids.to_vec()),
        )
        .await
    }
}
