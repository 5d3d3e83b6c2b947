use thiserror::Error;

/// Boxed cause carried by transport failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for Feedly API operations.
///
/// Every failure of the request pipeline collapses into this one type; the
/// variant tells the caller which stage gave up.
#[derive(Debug, Error)]
pub enum FeedlyError {
    /// An authorized call was issued without an access token
    #[error("This request requires an access token.")]
    AccessTokenRequired,

    /// The underlying send failed before a response was obtained
    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The server answered with a non-success status
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    /// The response body could not be turned into the target type
    #[error("Parse error at `{path}`: {message}")]
    Deserialize {
        path: String,
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request body could not be encoded as JSON
    #[error("failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The caller's cancellation signal fired while the request was in flight
    #[error("request cancelled")]
    Cancelled,

    /// URL parsing error
    #[error("URL parse error: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request building error
    #[error("failed to build request: {0}")]
    RequestBuild(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl FeedlyError {
    /// Create a new transport error, keeping the original failure as the cause
    pub fn transport<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        FeedlyError::Transport {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new status error
    pub fn status(status: u16, reason: impl Into<String>) -> Self {
        FeedlyError::Status {
            status,
            reason: reason.into(),
        }
    }

    /// Get the HTTP status code if the server rejected the request
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FeedlyError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this error is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, FeedlyError::Status { status: 404, .. })
    }

    /// Check if the call was rejected for lack of an access token
    pub fn is_access_token_required(&self) -> bool {
        matches!(self, FeedlyError::AccessTokenRequired)
    }

    /// Check if the call was cancelled by the caller
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FeedlyError::Cancelled)
    }
}

impl From<serde_path_to_error::Error<serde_json::Error>> for FeedlyError {
    fn from(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = err.path().to_string();
        let source = err.into_inner();
        FeedlyError::Deserialize {
            path,
            message: source.to_string(),
            source,
        }
    }
}

impl From<reqwest::Error> for FeedlyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            FeedlyError::RequestBuild(err.to_string())
        } else {
            FeedlyError::transport(err)
        }
    }
}

/// Result type for Feedly operations
pub type Result<T> = std::result::Result<T, FeedlyError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_not_found() {
        let error = FeedlyError::status(404, "Not Found");
        assert!(error.is_not_found());
        assert_eq!(error.status_code(), Some(404));
        assert_eq!(error.to_string(), "HTTP 404: Not Found");
    }

    #[test]
    fn test_access_token_required_message() {
        let error = FeedlyError::AccessTokenRequired;
        assert!(error.is_access_token_required());
        assert_eq!(error.status_code(), None);
        assert_eq!(error.to_string(), "This request requires an access token.");
    }

    #[test]
    fn test_transport_keeps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let error = FeedlyError::transport(io);
        assert_eq!(error.to_string(), "transport error: refused");
        let cause = error.source().expect("cause should be preserved");
        assert_eq!(cause.to_string(), "refused");
    }

    #[test]
    fn test_deserialize_error_carries_path() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Outer {
            inner: Inner,
        }
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Inner {
            count: u32,
        }

        let de = &mut serde_json::Deserializer::from_str(r#"{"inner":{"count":"x"}}"#);
        let err = serde_path_to_error::deserialize::<_, Outer>(de).unwrap_err();
        let error = FeedlyError::from(err);
        match error {
            FeedlyError::Deserialize { path, .. } => assert_eq!(path, "inner.count"),
            other => panic!("expected FeedlyError::Deserialize, got {:?}", other),
        }
    }
}
