//! Errors a document fetch can end in.

use std::time::Duration;

use thiserror::Error;

/// Why a read against the document collection failed.
///
/// Carries only owned, comparable data so that one result can be shared by
/// every caller of a de-duplicated request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never reached the server.
    #[error("network error: {0}")]
    Network(String),
    /// No response within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// The server answered with a non-2xx status.
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Parse(String),
}

/// Coarse classification shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Network,
    Server,
}

impl FetchError {
    /// Timeouts count as network failures; malformed bodies count as server
    /// failures.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Network(_) | Self::Timeout(_) => ErrorClass::Network,
            Self::Server { .. } | Self::Parse(_) => ErrorClass::Server,
        }
    }

    /// Network failures, 5xx and 429 are worth another attempt. Other 4xx
    /// and malformed bodies will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Server { status, .. } => *status == 429 || *status >= 500,
            Self::Parse(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(status: u16) -> FetchError {
        FetchError::Server {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(
            FetchError::Timeout(Duration::from_secs(1)).class(),
            ErrorClass::Network
        );
        assert_eq!(FetchError::Parse("x".into()).class(), ErrorClass::Server);
        assert_eq!(server(404).class(), ErrorClass::Server);
    }

    #[test]
    fn test_retryable() {
        assert!(FetchError::Network("refused".into()).is_retryable());
        assert!(FetchError::Timeout(Duration::from_secs(15)).is_retryable());
        assert!(server(500).is_retryable());
        assert!(server(503).is_retryable());
        assert!(server(429).is_retryable());
        assert!(!server(404).is_retryable());
        assert!(!server(422).is_retryable());
        assert!(!FetchError::Parse("eof".into()).is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(server(502).to_string(), "server returned 502: ");
        assert_eq!(
            FetchError::Timeout(Duration::from_secs(15)).to_string(),
            "request timed out after 15s"
        );
    }
}
