//! Conversions from external infrastructure errors into classified errors.

use entigate_common::error::{classify, ClassifiedError, RawFailure};
use entigate_domain::EntigateError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the classified error.
#[derive(Debug)]
pub struct InfraError(pub ClassifiedError);

impl From<InfraError> for ClassifiedError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ClassifiedError> for InfraError {
    fn from(value: ClassifiedError) -> Self {
        Self(value)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → RawFailure */
/* -------------------------------------------------------------------------- */

/// What the transport observed for a reqwest failure.
///
/// Returns `None` for failures raised before anything was sent (an invalid
/// URL or a body that cannot be encoded); those are not transport failures.
pub fn raw_failure(err: &HttpError) -> Option<RawFailure> {
    if err.is_builder() {
        return None;
    }
    Some(RawFailure::NoResponse { timed_out: err.is_timeout() })
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        match raw_failure(&value) {
            Some(failure) => Self(classify(failure)),
            None => Self::from(EntigateError::InvalidInput(format!("invalid request: {value}"))),
        }
    }
}

/* -------------------------------------------------------------------------- */
/* EntigateError → ClassifiedError */
/* -------------------------------------------------------------------------- */

/// Local faults raised before a request is sent. They classify as internal
/// failures, which are never retried.
impl From<EntigateError> for InfraError {
    fn from(value: EntigateError) -> Self {
        Self(ClassifiedError::internal(value.to_string()))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::time::Duration;

    use entigate_common::error::FailureKind;
    use reqwest::Client;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn timeout_maps_to_timeout_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client =
            Client::builder().no_proxy().timeout(Duration::from_millis(50)).build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap_err();

        let mapped: ClassifiedError = InfraError::from(error).into();
        assert_eq!(mapped.status_code(), 0);
        assert_eq!(mapped.error_code(), "TIMEOUT");
    }

    #[tokio::test]
    async fn refused_connection_maps_to_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}")).send().await.unwrap_err();

        let mapped: ClassifiedError = InfraError::from(error).into();
        assert_eq!(mapped.error_code(), "NETWORK_ERROR");
        assert!(mapped.is_retryable_status());
    }

    #[test]
    fn domain_errors_become_internal() {
        let mapped: ClassifiedError =
            InfraError::from(EntigateError::Serialization("bad body".into())).into();
        assert_eq!(mapped.error_code(), "INTERNAL_ERROR");
        assert_eq!(mapped.kind(), FailureKind::Internal);
        assert!(!mapped.is_retryable_status());
        assert!(mapped.detail().unwrap_or_default().contains("bad body"));
    }
}
