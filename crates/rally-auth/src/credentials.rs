//! Credential variants consumed by the transport layer.
//!
//! All variants implement custom Debug to redact sensitive data.

/// Authentication inputs for a client instance.
///
/// Only session-token credentials can be refreshed after a rejection: basic
/// and api-key credentials are static, so re-sending them after a 401 cannot
/// succeed and the failure is surfaced immediately.
#[derive(Clone)]
pub enum Credentials {
    /// Username and password, sent as a Basic challenge response.
    Basic { username: String, password: String },
    /// An api key, used as both username and password on the Basic challenge.
    ApiKey(String),
    /// A session token established by an external SSO flow.
    Session(String),
}

impl Credentials {
    /// Basic username/password credentials.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Api-key credentials.
    pub fn api_key(key: impl Into<String>) -> Self {
        Credentials::ApiKey(key.into())
    }

    /// Session-token credentials.
    pub fn session(token: impl Into<String>) -> Self {
        Credentials::Session(token.into())
    }

    /// The username/password pair to answer a Basic challenge with, when
    /// this mode uses one.
    pub fn basic_pair(&self) -> Option<(&str, &str)> {
        match self {
            Credentials::Basic { username, password } => Some((username, password)),
            Credentials::ApiKey(key) => Some((key, key)),
            Credentials::Session(_) => None,
        }
    }

    /// The session token, when this mode carries one.
    pub fn session_token(&self) -> Option<&str> {
        match self {
            Credentials::Session(token) => Some(token),
            _ => None,
        }
    }

    /// Returns true when a rejected call can be retried after
    /// re-authentication (session-token mode only).
    pub fn is_refreshable(&self) -> bool {
        matches!(self, Credentials::Session(_))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Credentials::ApiKey(_) => f.debug_tuple("ApiKey").field(&"[REDACTED]").finish(),
            Credentials::Session(_) => f.debug_tuple("Session").field(&"[REDACTED]").finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_pair() {
        let creds = Credentials::basic("user", "pass");
        assert_eq!(creds.basic_pair(), Some(("user", "pass")));
        assert_eq!(creds.session_token(), None);
        assert!(!creds.is_refreshable());
    }

    #[test]
    fn test_api_key_rides_basic_challenge() {
        let creds = Credentials::api_key("_abc123");
        assert_eq!(creds.basic_pair(), Some(("_abc123", "_abc123")));
        assert!(!creds.is_refreshable());
    }

    #[test]
    fn test_session_is_refreshable() {
        let creds = Credentials::session("tok");
        assert_eq!(creds.session_token(), Some("tok"));
        assert_eq!(creds.basic_pair(), None);
        assert!(creds.is_refreshable());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", Credentials::basic("user", "hunter2"));
        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));

        let debug = format!("{:?}", Credentials::api_key("_secretkey"));
        assert!(!debug.contains("_secretkey"));

        let debug = format!("{:?}", Credentials::session("sessiontoken"));
        assert!(!debug.contains("sessiontoken"));
    }
}
