//! Authenticated request pipeline
//!
//! Every request passes through [`Transport::execute`]: the session token is
//! attached when the [`TokenGate`] is ready, the request is sent once, and a
//! first `401` triggers exactly one refresh-and-resend. Anything else that is
//! not a 2xx is classified and returned.

use std::fmt;
use std::sync::Arc;

use entigate_common::error::{classify, ClassifiedError, RawFailure, ResponseBody};
use entigate_core::TokenGate;
use entigate_domain::{ApiConfig, EntigateError};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use super::client::HttpClient;
use crate::errors::InfraError;

/// A logical request, independent of any attempt to send it
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: Method,
    /// Path appended to the configured base URL, e.g. `/rest/entities/User`.
    pub path: String,
    /// JSON body, kept as a value so the request can be resent unchanged.
    pub body: Option<Value>,
}

impl RequestDescriptor {
    /// Request without a body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: None }
    }

    /// Attach a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// One attempt at sending a [`RequestDescriptor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestAttempt {
    retried: bool,
}

impl RequestAttempt {
    /// The initial attempt.
    pub const fn first() -> Self {
        Self { retried: false }
    }

    /// The attempt that follows a token refresh.
    pub const fn after_refresh(self) -> Self {
        Self { retried: true }
    }

    /// Whether this attempt follows a refresh.
    pub const fn is_retry(self) -> bool {
        self.retried
    }
}

/// Lifecycle of a request as it moves through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    /// Before the token is acquired.
    Initial,
    /// Request handed to the HTTP client.
    Sent,
    /// 2xx received.
    Success,
    /// 401 on the first attempt.
    FailedUnauthorizedFirstAttempt,
    /// Any failure that ends the request.
    FailedOther,
    /// Resent with a refreshed token.
    RetriedAfterRefresh,
}

impl TransportState {
    /// Log-friendly name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Sent => "sent",
            Self::Success => "success",
            Self::FailedUnauthorizedFirstAttempt => "failed_unauthorized_first_attempt",
            Self::FailedOther => "failed_other",
            Self::RetriedAfterRefresh => "retried_after_refresh",
        }
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 2xx response with its body fully read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status.
    pub status: u16,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Decode the body as JSON. `204`, `205` and empty bodies decode from
    /// `null`.
    ///
    /// # Errors
    ///
    /// A `DECODE_ERROR` classified error when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClassifiedError> {
        let no_content = self.status == StatusCode::NO_CONTENT.as_u16()
            || self.status == StatusCode::RESET_CONTENT.as_u16()
            || self.body.iter().all(u8::is_ascii_whitespace);

        let decoded = if no_content {
            serde_json::from_value(Value::Null)
        } else {
            serde_json::from_slice(&self.body)
        };
        decoded.map_err(|err| ClassifiedError::decode(self.status, err.to_string()))
    }
}

/// Sends requests to the entity API on behalf of the session
pub struct Transport {
    http: HttpClient,
    base_url: Url,
    gate: Arc<TokenGate>,
}

impl Transport {
    /// Transport for `config`, authenticated through `gate`.
    ///
    /// # Errors
    ///
    /// Returns [`EntigateError::Config`] when the base URL is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: &ApiConfig, gate: Arc<TokenGate>) -> Result<Self, EntigateError> {
        let http = HttpClient::builder().timeout(config.timeout()).build()?;
        let base_url = Url::parse(&config.base_url).map_err(|err| {
            EntigateError::Config(format!("invalid API base URL {:?}: {err}", config.base_url))
        })?;
        Ok(Self::with_client(http, base_url, gate))
    }

    /// Transport over an existing client and parsed base URL.
    pub fn with_client(http: HttpClient, base_url: Url, gate: Arc<TokenGate>) -> Self {
        Self { http, base_url, gate }
    }

    /// Gate supplying tokens.
    pub fn gate(&self) -> &Arc<TokenGate> {
        &self.gate
    }

    /// Base URL request paths are joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ClassifiedError> {
        let joined = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|err| {
            InfraError::from(EntigateError::InvalidInput(format!(
                "invalid request URL {joined}: {err}"
            )))
            .into()
        })
    }

    /// Send `request`, refreshing the token and resending once on a first
    /// `401`.
    ///
    /// # Errors
    ///
    /// The classified failure: no response, or a non-2xx status that the
    /// refresh did not resolve.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn execute(
        &self,
        request: &RequestDescriptor,
    ) -> Result<TransportResponse, ClassifiedError> {
        let url = self.url(&request.path)?;
        let mut attempt = RequestAttempt::first();
        let mut token = self.current_token().await;
        trace_state(TransportState::Initial, attempt);

        loop {
            trace_state(TransportState::Sent, attempt);
            let (status, body) = match self.send(request, &url, token.as_deref()).await {
                Ok(response) => response,
                Err(err) => {
                    trace_state(TransportState::FailedOther, attempt);
                    return Err(log_failure(err));
                }
            };

            if (200..300).contains(&status) {
                trace_state(TransportState::Success, attempt);
                return Ok(TransportResponse { status, body });
            }

            if status == StatusCode::UNAUTHORIZED.as_u16() && !attempt.is_retry() {
                trace_state(TransportState::FailedUnauthorizedFirstAttempt, attempt);
                attempt = attempt.after_refresh();
                if let Some(fresh) = self.refreshed_token().await {
                    token = Some(fresh);
                    trace_state(TransportState::RetriedAfterRefresh, attempt);
                    continue;
                }
            } else {
                trace_state(TransportState::FailedOther, attempt);
            }

            let failure = RawFailure::Response { status, body: ResponseBody::parse(&body) };
            return Err(log_failure(classify(failure)));
        }
    }

    /// Token for a first attempt. Failures only cost the request its
    /// credentials.
    async fn current_token(&self) -> Option<String> {
        match self.gate.acquire().await {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "sending request without token");
                None
            }
        }
    }

    async fn refreshed_token(&self) -> Option<String> {
        match self.gate.acquire().await {
            Ok(Some(token)) => Some(token),
            Ok(None) => {
                debug!("no token after refresh, not resending");
                None
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, not resending");
                None
            }
        }
    }

    async fn send(
        &self,
        request: &RequestDescriptor,
        url: &Url,
        token: Option<&str>,
    ) -> Result<(u16, Vec<u8>), ClassifiedError> {
        let mut builder = self
            .http
            .request(request.method.clone(), url.clone())
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let exchange = async {
            let response = self.http.send(builder).await?;
            let status = response.status().as_u16();
            let body = response.bytes().await.map_err(|err| {
                classify(RawFailure::NoResponse { timed_out: err.is_timeout() })
            })?;
            Ok::<_, ClassifiedError>((status, body.to_vec()))
        };

        match tokio::time::timeout(self.http.timeout(), exchange).await {
            Ok(result) => result,
            Err(_) => Err(classify(RawFailure::NoResponse { timed_out: true })),
        }
    }

    /// GET `path` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// See [`Transport::execute`] and [`TransportResponse::json`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClassifiedError> {
        self.execute(&RequestDescriptor::new(Method::GET, path)).await?.json()
    }

    /// POST `body` to `path` and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`Transport::execute`] and [`TransportResponse::json`].
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClassifiedError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = RequestDescriptor::new(Method::POST, path).with_body(encode(body)?);
        self.execute(&request).await?.json()
    }

    /// PUT `body` to `path` and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`Transport::execute`] and [`TransportResponse::json`].
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClassifiedError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = RequestDescriptor::new(Method::PUT, path).with_body(encode(body)?);
        self.execute(&request).await?.json()
    }

    /// DELETE `path`, ignoring any response body.
    ///
    /// # Errors
    ///
    /// See [`Transport::execute`].
    pub async fn delete(&self, path: &str) -> Result<(), ClassifiedError> {
        self.execute(&RequestDescriptor::new(Method::DELETE, path)).await.map(|_| ())
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.http.timeout())
            .field("gate", &self.gate)
            .finish()
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, ClassifiedError> {
    serde_json::to_value(body).map_err(|err| InfraError::from(EntigateError::from(err)).into())
}

fn trace_state(state: TransportState, attempt: RequestAttempt) {
    debug!(state = %state, retried = attempt.is_retry(), "transport state");
}

fn log_failure(err: ClassifiedError) -> ClassifiedError {
    warn!(
        status_code = err.status_code(),
        error_code = err.error_code(),
        detail = err.detail().unwrap_or_default(),
        "request_failed"
    );
    err
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn no_content_decodes_from_null() {
        let response = TransportResponse { status: 204, body: Vec::new() };
        let decoded: Option<Value> = response.json().unwrap();
        assert_eq!(decoded, None);

        assert!(response.json::<()>().is_ok());
    }

    #[test]
    fn mismatched_body_is_decode_error() {
        let response = TransportResponse { status: 200, body: br#"{"id": 1}"#.to_vec() };
        let err = response.json::<Vec<String>>().unwrap_err();

        assert_eq!(err.error_code(), "DECODE_ERROR");
        assert_eq!(err.status_code(), 200);
    }

    #[test]
    fn retry_marker_lives_on_the_attempt() {
        let first = RequestAttempt::first();
        let second = first.after_refresh();

        assert!(!first.is_retry());
        assert!(second.is_retry());
        assert_eq!(TransportState::RetriedAfterRefresh.to_string(), "retried_after_refresh");
    }

    #[test]
    fn url_keeps_base_path() {
        let transport = Transport::new(
            &ApiConfig::new("http://localhost:8080/app/"),
            Arc::new(TokenGate::new()),
        )
        .unwrap();

        let url = transport.url("/rest/entities/User").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/app/rest/entities/User");
        assert_eq!(
            RequestDescriptor::new(Method::POST, "/x").with_body(json!({"a": 1})).body,
            Some(json!({"a": 1}))
        );
    }
}
