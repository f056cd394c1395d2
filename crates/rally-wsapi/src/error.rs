//! Error types for rally-wsapi.

use rally_types::CodecError;

/// Result type alias for rally-wsapi operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for rally-wsapi operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// The underlying transport error, when this wraps one.
    pub fn as_transport(&self) -> Option<&rally_client::Error> {
        match &self.kind {
            ErrorKind::Transport(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns true if the backend answered with an HTML page instead of
    /// JSON (typically a maintenance window).
    pub fn is_service_unavailable(&self) -> bool {
        self.as_transport()
            .is_some_and(rally_client::Error::is_service_unavailable)
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The request descriptor cannot be turned into a URL.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The response parsed as JSON but did not have the expected envelope.
    #[error("unexpected response shape: {0}")]
    ResponseShape(String),

    /// Transport-level failure.
    #[error(transparent)]
    Transport(rally_client::Error),
}

impl From<rally_client::Error> for Error {
    fn from(err: rally_client::Error) -> Self {
        Error::new(ErrorKind::Transport(err))
    }
}

impl From<CodecError> for Error {
    fn from(err: CodecError) -> Self {
        Error::new(ErrorKind::Transport(err.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_wrapping() {
        let err: Error = CodecError::ServiceUnavailable.into();
        assert!(err.is_service_unavailable());
        assert!(err.as_transport().is_some());

        let err = Error::new(ErrorKind::InvalidRequest("no type".to_string()));
        assert!(!err.is_service_unavailable());
        assert!(err.as_transport().is_none());
        assert!(err.to_string().contains("no type"));
    }
}
