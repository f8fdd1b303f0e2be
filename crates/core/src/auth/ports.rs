//! Port interfaces for the session's identity provider

use async_trait::async_trait;
use entigate_domain::Result;

/// Source of the current access token
///
/// Implemented by whatever owns the login session. Implementations may renew
/// the token silently; callers treat every returned token as the freshest one
/// available.
#[async_trait]
pub trait TokenAccessor: Send + Sync {
    /// Current access token, `None` when the session has none.
    async fn access_token(&self) -> Result<Option<String>>;
}
