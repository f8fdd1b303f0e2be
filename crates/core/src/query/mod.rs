//! Keyed read cache and the mutation layer on top of it
//!
//! Reads go through [`QueryCache::query`]: fresh entries are served without a
//! network call, stale entries are served and revalidated in the background,
//! and missing entries are fetched once no matter how many callers ask.
//! Fetch failures are retried only when the classified error says so.
//!
//! Writes go through [`mutate`], which never retries, patches the cached
//! lists and details of the entity on success and marks every list of the
//! collection stale.

mod cache;
mod key;
mod mutation;

pub use cache::{CacheEntry, QueryCache, QueryPolicy};
pub use key::{EntityKeys, KeyPart, QueryKey};
pub use mutation::{mutate, CacheUpdate, EntityCache, MutationKind};
