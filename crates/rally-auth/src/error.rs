//! Error types for rally-auth.

/// Result type alias for rally-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for rally-auth operations.
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
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The SSO flow finished without producing a session token.
    #[error("SSO login failed: {0}")]
    SsoFailed(String),

    /// Credential storage I/O failure.
    #[error("credential storage error: {0}")]
    Storage(String),

    /// Caller-supplied cipher routine failed.
    #[error("credential cipher error: {0}")]
    Cipher(String),

    /// Stored credential file had an unexpected shape.
    #[error("invalid credential file: {0}")]
    InvalidCredentialFile(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::with_source(ErrorKind::Storage(err.to_string()), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::InvalidCredentialFile(err.to_string()), err)
    }
}
