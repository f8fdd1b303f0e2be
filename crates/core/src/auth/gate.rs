//! Readiness-aware wrapper around the registered [`TokenAccessor`]

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use entigate_domain::{EntigateError, Result};
use parking_lot::RwLock;
use tracing::{debug, warn};

use super::ports::TokenAccessor;

/// Gate between outgoing requests and the session's token accessor.
///
/// Before the session is ready the gate reports no token and requests go out
/// unauthenticated. The accessor is injected with [`TokenGate::register`] and
/// dropped again with [`TokenGate::unregister`] when the session ends.
#[derive(Default)]
pub struct TokenGate {
    ready: AtomicBool,
    accessor: RwLock<Option<Arc<dyn TokenAccessor>>>,
}

impl TokenGate {
    /// Gate with no accessor; not ready until one is registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate that is ready with `accessor` already registered.
    pub fn with_accessor(accessor: Arc<dyn TokenAccessor>) -> Self {
        let gate = Self::new();
        gate.register(accessor);
        gate
    }

    /// Install the session's accessor and mark the gate ready.
    pub fn register(&self, accessor: Arc<dyn TokenAccessor>) {
        *self.accessor.write() = Some(accessor);
        self.ready.store(true, Ordering::Release);
        debug!("token accessor registered");
    }

    /// Forget the accessor; subsequent requests carry no token.
    pub fn unregister(&self) {
        self.ready.store(false, Ordering::Release);
        *self.accessor.write() = None;
        debug!("token accessor unregistered");
    }

    /// Toggle readiness without touching the registered accessor, e.g. while
    /// the session is still restoring.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }

    /// Whether requests should carry a token.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Current token, if the gate is ready and the accessor has one.
    ///
    /// # Errors
    ///
    /// Returns [`EntigateError::Auth`] when the accessor itself fails. The
    /// failure is never retried here.
    pub async fn acquire(&self) -> Result<Option<String>> {
        if !self.is_ready() {
            debug!("token gate not ready, proceeding without token");
            return Ok(None);
        }

        let accessor = self.accessor.read().clone();
        let Some(accessor) = accessor else {
            return Ok(None);
        };

        match accessor.access_token().await {
            Ok(Some(token)) if !token.is_empty() => Ok(Some(token)),
            Ok(_) => Ok(None),
            Err(err) => {
                warn!(error = %err, "token accessor failed");
                Err(EntigateError::Auth(format!("token unavailable: {err}")))
            }
        }
    }
}

impl fmt::Debug for TokenGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGate")
            .field("ready", &self.is_ready())
            .field("registered", &self.accessor.read().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;

    use super::*;

    struct CountingAccessor {
        token: Option<&'static str>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl CountingAccessor {
        fn returning(token: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self { token, fail: false, calls: AtomicUsize::new(0) })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { token: None, fail: true, calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl TokenAccessor for CountingAccessor {
        async fn access_token(&self) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(EntigateError::Auth("refresh rejected".into()));
            }
            Ok(self.token.map(str::to_string))
        }
    }

    #[tokio::test]
    async fn not_ready_gate_skips_accessor() {
        let accessor = CountingAccessor::returning(Some("abc"));
        let gate = TokenGate::with_accessor(accessor.clone());
        gate.set_ready(false);

        assert_eq!(gate.acquire().await.unwrap(), None);
        assert_eq!(accessor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ready_gate_returns_token() {
        let gate = TokenGate::with_accessor(CountingAccessor::returning(Some("abc")));
        assert!(gate.is_ready());
        assert_eq!(gate.acquire().await.unwrap().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn empty_token_is_no_token() {
        let gate = TokenGate::with_accessor(CountingAccessor::returning(Some("")));
        assert_eq!(gate.acquire().await.unwrap(), None);
    }

    #[tokio::test]
    async fn accessor_failure_is_auth_error() {
        let accessor = CountingAccessor::failing();
        let gate = TokenGate::with_accessor(accessor.clone());

        let err = gate.acquire().await.unwrap_err();
        assert!(matches!(err, EntigateError::Auth(_)));
        assert_eq!(accessor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unregister_clears_readiness() {
        let gate = TokenGate::with_accessor(CountingAccessor::returning(Some("abc")));
        gate.unregister();

        assert!(!gate.is_ready());
        assert_eq!(gate.acquire().await.unwrap(), None);
        assert!(format!("{gate:?}").contains("registered: false"));
    }
}
