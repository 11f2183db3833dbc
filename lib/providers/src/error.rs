use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    /// Missing or invalid provider configuration. Surfaced when the client
    /// is constructed, before any request or partial index work.
    #[error("provider configuration error: {0}")]
    Configuration(String),

    /// Transport-level failure (connect, timeout, body). Caller-retryable;
    /// never retried internally.
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status from the provider.
    #[error("provider returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The provider answered but the body did not match the wire contract.
    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Whether a caller may reasonably retry the same call with backoff.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Configuration(_) | ProviderError::InvalidResponse(_) => false,
            ProviderError::Request(err) => {
                err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
            }
            ProviderError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability_by_status() {
        let rate_limited = ProviderError::Status {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: String::new(),
        };
        assert!(rate_limited.is_retryable());

        let server_error = ProviderError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        };
        assert!(server_error.is_retryable());

        let unauthorized = ProviderError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: String::new(),
        };
        assert!(!unauthorized.is_retryable());
    }

    #[test]
    fn test_configuration_is_not_retryable() {
        assert!(!ProviderError::Configuration("no key".into()).is_retryable());
        assert!(!ProviderError::InvalidResponse("bad body".into()).is_retryable());
    }
}
