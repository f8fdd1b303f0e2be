//! Shared helpers for `entigate-infra` integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use entigate_core::{TokenAccessor, TokenGate};
use entigate_domain::{ApiConfig, EntigateError, Result as DomainResult, User};
use entigate_infra::Transport;
use serde_json::{json, Value};
use wiremock::MockServer;

/// Token accessor that hands out a scripted sequence of tokens.
///
/// Once the script runs out the last token is repeated.
pub struct ScriptedAccessor {
    tokens: Mutex<VecDeque<&'static str>>,
    last: Mutex<Option<&'static str>>,
    fail: bool,
    pub calls: AtomicUsize,
}

impl ScriptedAccessor {
    pub fn new(tokens: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            tokens: Mutex::new(tokens.iter().copied().collect()),
            last: Mutex::new(None),
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            tokens: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenAccessor for ScriptedAccessor {
    async fn access_token(&self) -> DomainResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EntigateError::Auth("session expired".into()));
        }
        let mut last = self.last.lock().expect("accessor mutex poisoned");
        if let Some(next) = self.tokens.lock().expect("accessor mutex poisoned").pop_front() {
            *last = Some(next);
        }
        Ok(last.map(str::to_string))
    }
}

/// Transport pointed at `server` with a short timeout.
pub fn transport(server: &MockServer, gate: Arc<TokenGate>) -> Arc<Transport> {
    transport_with_timeout(server, gate, Duration::from_secs(2))
}

pub fn transport_with_timeout(
    server: &MockServer,
    gate: Arc<TokenGate>,
    timeout: Duration,
) -> Arc<Transport> {
    let config = ApiConfig {
        base_url: server.uri(),
        timeout_ms: u64::try_from(timeout.as_millis()).expect("timeout fits u64"),
    };
    Arc::new(Transport::new(&config, gate).expect("transport"))
}

/// Gate that is ready with `accessor` registered.
pub fn ready_gate(accessor: Arc<ScriptedAccessor>) -> Arc<TokenGate> {
    Arc::new(TokenGate::with_accessor(accessor))
}

pub fn user_json(id: &str, username: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "firstName": "Test",
        "lastName": "User",
        "email": format!("{username}@example.com"),
        "active": true
    })
}

pub fn user(id: &str, username: &str) -> User {
    serde_json::from_value(user_json(id, username)).expect("user fixture")
}
