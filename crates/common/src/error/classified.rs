//! Normalization of transport and response failures

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use super::messages::{self, GENERIC_MESSAGE, NETWORK_DETAIL, TIMEOUT_DETAIL, UNKNOWN_MESSAGE};
use super::{ErrorClassification, ErrorSeverity};

/// Status code used when no response was received.
pub const NO_RESPONSE_STATUS: u16 = 0;

/// Status code for faults raised inside the client before a request could be
/// sent. It lies outside the HTTP range, so no retry or status rule matches it.
pub const INTERNAL_STATUS: u16 = 1;

const RETRYABLE_STATUSES: [u16; 5] = [NO_RESPONSE_STATUS, 429, 502, 503, 504];

/// Body of a non-2xx response, as far as the classifier cares.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// No bytes (or only whitespace) were returned.
    Empty,
    /// The body parsed as JSON.
    Json(Value),
    /// Anything else, decoded lossily as UTF-8.
    Text(String),
}

impl ResponseBody {
    /// Interpret raw response bytes: JSON when it parses, plain text otherwise.
    pub fn parse(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self::Empty;
        }
        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

/// What the transport observed when a request failed.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFailure {
    /// The request never produced a response.
    NoResponse {
        /// `true` when the per-attempt timeout elapsed, `false` for connection
        /// level failures.
        timed_out: bool,
    },
    /// The server answered with a non-success status.
    Response {
        /// HTTP status code.
        status: u16,
        /// Response payload.
        body: ResponseBody,
    },
}

/// Failure taxonomy used by callers that branch on the broad failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// No response was received (timeout or network).
    Transport,
    /// 401 after the single refresh attempt was spent.
    Auth,
    /// 400-499 except 401.
    Client,
    /// 500-599.
    Server,
    /// A fault inside the client; nothing reached the network.
    Internal,
    /// Any other status.
    Unclassified,
}

/// The normalized failure value every layer above the transport works with.
///
/// `status_code` and `error_code` are always set together; a `status_code` of
/// `0` means the request failed before a response arrived.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedError {
    status_code: u16,
    error_code: String,
    detail: Option<String>,
}

impl ClassifiedError {
    /// Build a classified error from its parts.
    pub fn new(
        status_code: u16,
        error_code: impl Into<String>,
        detail: Option<impl Into<String>>,
    ) -> Self {
        Self { status_code, error_code: error_code.into(), detail: detail.map(Into::into) }
    }

    /// A 2xx response whose body did not match the expected shape.
    pub fn decode(status_code: u16, detail: impl Into<String>) -> Self {
        Self::new(status_code, "DECODE_ERROR", Some(detail))
    }

    /// A failure raised inside the client before any request was issued, such
    /// as a body that cannot be serialized or a fetch task that panicked.
    ///
    /// Deterministic, so never retried.
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(INTERNAL_STATUS, "INTERNAL_ERROR", Some(detail))
    }

    /// Numeric HTTP status, `0` when no response was received and `1` for a
    /// fault inside the client.
    pub const fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Machine readable error code (`TIMEOUT`, `HTTP_404`, server code, ...).
    pub fn error_code(&self) -> &str {
        &self.error_code
    }

    /// Human readable detail, when one was available.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Failures that must always be surfaced to the user: 401 or any 5xx.
    pub const fn is_hard(&self) -> bool {
        self.status_code == 401 || self.status_code >= 500
    }

    /// Exactly the statuses eligible for automatic retry: 0, 429, 502, 503
    /// and 504.
    pub fn is_retryable_status(&self) -> bool {
        RETRYABLE_STATUSES.contains(&self.status_code)
    }

    /// 400 <= status < 500.
    pub const fn is_client_error(&self) -> bool {
        self.status_code >= 400 && self.status_code < 500
    }

    /// status >= 500.
    pub const fn is_server_error(&self) -> bool {
        self.status_code >= 500
    }

    /// Broad failure class of this error.
    pub const fn kind(&self) -> FailureKind {
        match self.status_code {
            NO_RESPONSE_STATUS => FailureKind::Transport,
            INTERNAL_STATUS => FailureKind::Internal,
            401 => FailureKind::Auth,
            400..=499 => FailureKind::Client,
            500..=599 => FailureKind::Server,
            _ => FailureKind::Unclassified,
        }
    }

    /// Localized message for presenting this error to the user.
    ///
    /// Statuses with a fixed table entry always use it; anything else falls
    /// back to the detail, then to a generic message. Client faults never
    /// show their developer detail.
    pub fn user_message(&self) -> String {
        if self.status_code == INTERNAL_STATUS {
            return UNKNOWN_MESSAGE.to_string();
        }
        if let Some(message) = messages::status_message(self.status_code) {
            return message.to_string();
        }
        match self.detail() {
            Some(detail) if !detail.is_empty() => detail.to_string(),
            _ => GENERIC_MESSAGE.to_string(),
        }
    }

    /// Developer-facing message: detail, else error code, else `HTTP <status>`.
    pub fn message(&self) -> String {
        match self.detail() {
            Some(detail) if !detail.is_empty() => detail.to_string(),
            _ if !self.error_code.is_empty() => self.error_code.clone(),
            _ => format!("HTTP {}", self.status_code),
        }
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status_code, self.error_code, self.message())
    }
}

impl std::error::Error for ClassifiedError {}

impl ErrorClassification for ClassifiedError {
    fn is_retryable(&self) -> bool {
        self.is_retryable_status()
    }

    fn severity(&self) -> ErrorSeverity {
        if self.is_hard() || self.status_code == INTERNAL_STATUS {
            ErrorSeverity::Error
        } else if self.is_retryable_status() || self.is_client_error() {
            ErrorSeverity::Warning
        } else {
            ErrorSeverity::Info
        }
    }

    fn is_critical(&self) -> bool {
        self.is_hard()
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Convert a raw failure into exactly one [`ClassifiedError`].
pub fn classify(failure: RawFailure) -> ClassifiedError {
    match failure {
        RawFailure::NoResponse { timed_out: true } => {
            ClassifiedError::new(NO_RESPONSE_STATUS, "TIMEOUT", Some(TIMEOUT_DETAIL))
        }
        RawFailure::NoResponse { timed_out: false } => {
            ClassifiedError::new(NO_RESPONSE_STATUS, "NETWORK_ERROR", Some(NETWORK_DETAIL))
        }
        RawFailure::Response { status, body } => classify_response(status, body),
    }
}

fn classify_response(status: u16, body: ResponseBody) -> ClassifiedError {
    if let ResponseBody::Json(Value::Object(fields)) = &body {
        let error = fields.get("error").filter(|value| is_truthy(value));
        let description = fields.get("error_description").filter(|value| is_truthy(value));

        // `{error, details?}`, also accepting an OAuth description as detail
        if let Some(error) = error {
            let detail = fields
                .get("details")
                .filter(|value| is_truthy(value))
                .or(description)
                .map(text_of)
                .unwrap_or_default();
            return ClassifiedError::new(status, text_of(error), Some(detail));
        }

        // OAuth style `{error_description}` without an error code
        if let Some(description) = description {
            return ClassifiedError::new(status, "OAUTH_ERROR", Some(text_of(description)));
        }
    }

    let detail = match body {
        ResponseBody::Text(text) => Some(text),
        ResponseBody::Json(Value::String(text)) => Some(text),
        ResponseBody::Json(_) | ResponseBody::Empty => None,
    };
    ClassifiedError::new(status, format!("HTTP_{status}"), detail)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
