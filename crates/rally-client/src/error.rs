//! Error types for rally-client.

use rally_types::CodecError;

/// Result type alias for rally-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for rally-client operations.
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

    /// Returns true if this is an unauthorized (HTTP 401) failure.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.kind, ErrorKind::Unauthorized { .. })
    }

    /// Returns true if this unauthorized failure can be resolved by
    /// re-authenticating (session-token auth with an SSO driver attached).
    pub fn is_refreshable_unauthorized(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Unauthorized { refreshable: true }
        )
    }

    /// Returns true if the backend answered with an HTML page instead of
    /// JSON (typically a maintenance window).
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self.kind, ErrorKind::ServiceUnavailable)
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// HTTP request failed with a non-success status.
    #[error("HTTP error: {status} {message}")]
    Http { status: u16, message: String },

    /// Authentication was rejected (HTTP 401).
    #[error("unauthorized{}", if *refreshable { " (will re-authenticate)" } else { "" })]
    Unauthorized { refreshable: bool },

    /// Re-authentication ceiling reached; the original rejection stands.
    #[error("unauthorized after {attempts} re-authentication attempts")]
    RetriesExhausted { attempts: u32 },

    /// The backend returned an HTML document instead of JSON.
    #[error("service unavailable: backend returned an HTML page instead of JSON")]
    ServiceUnavailable,

    /// The response body was not valid JSON; carries the raw body.
    #[error("malformed response body")]
    MalformedResponse { body: String },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// SSO re-authentication failed.
    #[error("SSO error: {0}")]
    Sso(String),

    /// Invalid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            ErrorKind::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ErrorKind::Other(err.to_string())
        };

        Error::with_source(kind, err)
    }
}

impl From<CodecError> for Error {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::ServiceUnavailable => Error::new(ErrorKind::ServiceUnavailable),
            CodecError::MalformedResponse { .. } => {
                let body = err.body().unwrap_or_default().to_string();
                Error::with_source(ErrorKind::MalformedResponse { body }, err)
            }
        }
    }
}

impl From<rally_auth::Error> for Error {
    fn from(err: rally_auth::Error) -> Self {
        Error::with_source(ErrorKind::Sso(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::InvalidUrl(err.to_string()), err)
    }
}
