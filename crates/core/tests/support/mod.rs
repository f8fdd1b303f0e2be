//! Shared test helpers for `entigate-core` integration tests.
//!
//! Provides an in-memory user API so service tests can focus on cache and
//! notification behaviour instead of HTTP plumbing.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use entigate_common::error::ClassifiedError;
use entigate_common::resilience::RetryConfig;
use entigate_core::{EntityApi, EntityService, MemoryNotifier, QueryPolicy};
use entigate_domain::{Condition, ConditionValue, CreateUserDto, SearchParams, UpdateUserDto, User};
use parking_lot::Mutex;

/// Build a user with predictable names derived from `username`.
pub fn user(id: &str, username: &str) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        first_name: username.to_uppercase(),
        last_name: "Test".to_string(),
        email: format!("{username}@example.com"),
        active: true,
    }
}

/// Policy without retries so failing calls resolve immediately.
pub fn no_retry_policy() -> QueryPolicy {
    QueryPolicy { retry: RetryConfig::once(), ..QueryPolicy::default() }
}

/// In-memory mock for `EntityApi<User>`.
///
/// Counts calls per operation and can be told to fail for specific ids.
#[derive(Default)]
pub struct InMemoryUserApi {
    users: Mutex<BTreeMap<String, User>>,
    failing_ids: Mutex<HashSet<String>>,
    next_id: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
}

impl InMemoryUserApi {
    /// Create a new mock seeded with the provided users.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Arc<Self> {
        let api = Self::default();
        api.users.lock().extend(users.into_iter().map(|user| (user.id.clone(), user)));
        Arc::new(api)
    }

    /// Requests touching `id` fail with a 500 from now on.
    pub fn fail_for(&self, id: &str) {
        self.failing_ids.lock().insert(id.to_string());
    }

    pub fn stored(&self) -> Vec<User> {
        self.users.lock().values().cloned().collect()
    }

    fn check(&self, id: &str) -> Result<(), ClassifiedError> {
        if self.failing_ids.lock().contains(id) {
            return Err(ClassifiedError::new(500, "HTTP_500", Some("boom")));
        }
        Ok(())
    }
}

fn matches(user: &User, condition: &Condition) -> bool {
    let field = match condition.property.as_str() {
        "username" => ConditionValue::from(user.username.as_str()),
        "email" => ConditionValue::from(user.email.as_str()),
        "active" => ConditionValue::from(user.active),
        _ => return false,
    };
    field == condition.value
}

#[async_trait]
impl EntityApi<User> for InMemoryUserApi {
    async fn list(&self) -> Result<Vec<User>, ClassifiedError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.stored())
    }

    async fn get(&self, id: &str) -> Result<User, ClassifiedError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.check(id)?;
        self.users
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| ClassifiedError::new(404, "HTTP_404", None::<String>))
    }

    async fn search(&self, params: &SearchParams) -> Result<Vec<User>, ClassifiedError> {
        let conditions = params.filter.as_ref().map(|filter| filter.conditions.clone());
        Ok(self
            .stored()
            .into_iter()
            .filter(|user| {
                conditions
                    .as_ref()
                    .map_or(true, |conditions| conditions.iter().all(|c| matches(user, c)))
            })
            .collect())
    }

    async fn create(&self, payload: &CreateUserDto) -> Result<User, ClassifiedError> {
        if payload.username.is_empty() {
            return Err(ClassifiedError::new(400, "VALIDATION", Some("username is required")));
        }
        let id = format!("u-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 100);
        let created = User {
            id: id.clone(),
            username: payload.username.clone(),
            first_name: payload.first_name.clone(),
            last_name: payload.last_name.clone(),
            email: payload.email.clone(),
            active: payload.active.unwrap_or(true),
        };
        self.users.lock().insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, patch: &UpdateUserDto) -> Result<User, ClassifiedError> {
        self.check(&patch.id)?;
        let mut users = self.users.lock();
        let user = users
            .get_mut(&patch.id)
            .ok_or_else(|| ClassifiedError::new(404, "HTTP_404", None::<String>))?;
        if let Some(username) = &patch.username {
            user.username.clone_from(username);
        }
        if let Some(email) = &patch.email {
            user.email.clone_from(email);
        }
        if let Some(active) = patch.active {
            user.active = active;
        }
        Ok(user.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), ClassifiedError> {
        self.check(id)?;
        self.users.lock().remove(id);
        Ok(())
    }
}

/// Service over `api` with a fresh notifier and no retries.
pub fn service(api: Arc<InMemoryUserApi>) -> (EntityService<User>, Arc<MemoryNotifier>) {
    let notifier = Arc::new(MemoryNotifier::new());
    let service = EntityService::new(api, notifier.clone(), no_retry_policy());
    (service, notifier)
}
