//! Codec error types.

/// Failures while decoding a WSAPI response body.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The backend returned an HTML document instead of JSON, which is what
    /// the service emits while it is down for maintenance.
    #[error("service unavailable: backend returned an HTML page instead of JSON")]
    ServiceUnavailable,

    /// The body was not valid JSON. Carries the raw body for diagnostics.
    #[error("malformed response: {source}")]
    MalformedResponse {
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CodecError {
    /// The raw response body, when one was captured.
    pub fn body(&self) -> Option<&str> {
        match self {
            CodecError::MalformedResponse { body, .. } => Some(body),
            CodecError::ServiceUnavailable => None,
        }
    }
}
