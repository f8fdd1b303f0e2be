//! Contract shared by every remote entity type

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A server-side entity exposed under `/rest/entities/<NAME>`.
///
/// The server assigns ids on create; ids are stable afterwards and are the
/// only thing the cache uses to match list items against detail entries.
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Entity name as it appears in the REST path (`User`).
    const NAME: &'static str;
    /// Root segment of every cache key for this entity (`users`).
    const COLLECTION: &'static str;
    /// Localized noun used in notifications (`người dùng`).
    const LABEL: &'static str;

    /// Payload accepted by create.
    type Create: Serialize + Debug + Send + Sync + 'static;
    /// Partial payload accepted by update.
    type Update: EntityPatch;

    fn id(&self) -> &str;

    /// Short label used in user notifications.
    fn display_name(&self) -> &str;
}

/// An update payload that knows which entity it targets.
///
/// The id travels in the request path, so implementations must not serialize
/// it into the body.
pub trait EntityPatch: Serialize + Debug + Send + Sync + 'static {
    fn target_id(&self) -> &str;
}
