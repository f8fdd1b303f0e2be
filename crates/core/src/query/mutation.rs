//! Mutations and the cache patches they apply

use std::future::Future;

use entigate_common::error::ClassifiedError;
use entigate_common::resilience::{Clock, SystemClock};
use entigate_domain::{Entity, NotificationKind};
use tracing::{debug, error};

use super::cache::{QueryCache, QueryPolicy};
use super::key::EntityKeys;
use crate::notify::ports::Notifier;

/// Effect of a successful mutation on cached state
#[derive(Debug, Clone, PartialEq)]
pub enum CacheUpdate<E> {
    /// The server created the entity (with its assigned id).
    Created(E),
    /// The server returned the updated entity.
    Updated(E),
    /// The entities with these ids are gone.
    Deleted(Vec<String>),
}

/// Kind of write, used for notification text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// New entity.
    Create,
    /// Changed entity.
    Update,
    /// One removed entity.
    Delete,
    /// Several removed entities.
    DeleteMany,
}

impl MutationKind {
    /// Headline shown when the write fails.
    pub fn failure_summary<E: Entity>(self) -> String {
        match self {
            Self::Create => format!("Không thể tạo {}", E::LABEL),
            Self::Update => format!("Không thể cập nhật {}", E::LABEL),
            Self::Delete | Self::DeleteMany => format!("Không thể xóa {}", E::LABEL),
        }
    }

    /// Summary and optional detail announced after `update` was applied.
    pub fn success_notice<E: Entity>(self, update: &CacheUpdate<E>) -> (String, Option<String>) {
        match (self, update) {
            (Self::Create, CacheUpdate::Created(entity)) => (
                format!("Tạo {} thành công!", E::LABEL),
                Some(format!("Đã tạo \"{}\"", entity.display_name())),
            ),
            (Self::Update, CacheUpdate::Updated(entity)) => (
                "Cập nhật thành công!".to_string(),
                Some(format!("Đã cập nhật \"{}\"", entity.display_name())),
            ),
            (Self::DeleteMany, CacheUpdate::Deleted(ids)) => {
                (format!("Đã xóa {} {}!", ids.len(), E::LABEL), None)
            }
            _ => (format!("Xóa {} thành công!", E::LABEL), None),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::DeleteMany => "delete_many",
        }
    }
}

/// The list and detail caches of one entity collection
///
/// List entries hold `Vec<E>` under `[collection, "list", ..]`; detail
/// entries hold `E` under `[collection, "detail", id]`.
pub struct EntityCache<E, C = SystemClock> {
    lists: QueryCache<Vec<E>, C>,
    details: QueryCache<E, C>,
}

impl<E, C> Clone for EntityCache<E, C> {
    fn clone(&self) -> Self {
        Self { lists: self.lists.clone(), details: self.details.clone() }
    }
}

impl<E: Entity> EntityCache<E, SystemClock> {
    /// Caches on the system clock.
    pub fn new(policy: QueryPolicy) -> Self {
        Self::with_clock(policy, SystemClock)
    }
}

impl<E, C> EntityCache<E, C>
where
    E: Entity,
    C: Clock + Clone,
{
    /// Caches driven by `clock`.
    pub fn with_clock(policy: QueryPolicy, clock: C) -> Self {
        Self {
            lists: QueryCache::with_clock(policy.clone(), clock.clone()),
            details: QueryCache::with_clock(policy, clock),
        }
    }

    /// Cache of list and search results.
    pub fn lists(&self) -> &QueryCache<Vec<E>, C> {
        &self.lists
    }

    /// Cache of single entities.
    pub fn details(&self) -> &QueryCache<E, C> {
        &self.details
    }

    /// Patch cached lists and details with the result of a mutation, then
    /// mark every list of the collection stale.
    pub fn apply(&self, update: &CacheUpdate<E>) {
        let lists = EntityKeys::lists::<E>();

        match update {
            CacheUpdate::Created(entity) => {
                self.lists.update_matching(&lists, |items| {
                    let mut items = items.clone();
                    if !items.iter().any(|item| item.id() == entity.id()) {
                        items.push(entity.clone());
                    }
                    items
                });
                self.lists.set_data(&lists, |old| old.is_none().then(|| vec![entity.clone()]));
                self.details.set_data(&EntityKeys::detail::<E>(entity.id()), |_| Some(entity.clone()));
            }
            CacheUpdate::Updated(entity) => {
                self.details.set_data(&EntityKeys::detail::<E>(entity.id()), |_| Some(entity.clone()));
                self.lists.update_matching(&lists, |items| {
                    items
                        .iter()
                        .map(|item| if item.id() == entity.id() { entity.clone() } else { item.clone() })
                        .collect()
                });
            }
            CacheUpdate::Deleted(ids) => {
                self.lists.update_matching(&lists, |items| {
                    items.iter().filter(|item| !ids.iter().any(|id| id == item.id())).cloned().collect()
                });
                for id in ids {
                    self.details.remove(&EntityKeys::detail::<E>(id));
                }
            }
        }

        let invalidated = self.lists.invalidate(&lists);
        debug!(collection = E::COLLECTION, invalidated, "applied mutation to cache");
    }
}

/// Run a write and reconcile the cache with its outcome.
///
/// The operation is awaited exactly once; writes are never retried. On
/// success `to_update` describes the cache patch, the patch is applied and a
/// success notification is sent. On failure the cache is left alone and the
/// error is both notified and returned.
///
/// # Errors
///
/// The classified error of the operation.
pub async fn mutate<E, C, T, Fut, U>(
    cache: &EntityCache<E, C>,
    notifier: &dyn Notifier,
    kind: MutationKind,
    operation: Fut,
    to_update: U,
) -> Result<T, ClassifiedError>
where
    E: Entity,
    C: Clock + Clone,
    Fut: Future<Output = Result<T, ClassifiedError>>,
    U: FnOnce(&T) -> CacheUpdate<E>,
{
    match operation.await {
        Ok(output) => {
            let update = to_update(&output);
            cache.apply(&update);
            let (summary, detail) = kind.success_notice(&update);
            notifier.notify(NotificationKind::Success, &summary, detail.as_deref());
            Ok(output)
        }
        Err(err) => {
            error!(
                collection = E::COLLECTION,
                mutation = kind.as_str(),
                status_code = err.status_code(),
                error_code = err.error_code(),
                detail = err.detail().unwrap_or_default(),
                "mutation_failed"
            );
            notifier.notify(
                NotificationKind::Error,
                &kind.failure_summary::<E>(),
                Some(&err.user_message()),
            );
            Err(err)
        }
    }
}
