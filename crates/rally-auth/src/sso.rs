//! SSO driver contract.
//!
//! The browser-embedded SSO flow itself lives outside this library; the
//! transport only needs a capability that can produce a fresh session token.
//! Each `acquire_session` call is one login attempt and yields exactly one
//! result.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Error, ErrorKind, Result};

/// Capability that can establish a Rally session through an external
/// identity-provider flow.
#[async_trait]
pub trait SsoDriver: Send + Sync {
    /// Returns true if the driver currently holds an authorized identity
    /// (e.g. valid IdP cookies) and `acquire_session` is expected to
    /// succeed without user interaction.
    fn is_authorized(&self) -> bool;

    /// Run one login attempt and return the resulting session token.
    ///
    /// Implementations drive whatever UI or cookie plumbing they need; the
    /// caller only sees the token or a failure.
    async fn acquire_session(&self) -> Result<String>;
}

/// Trivial driver that hands out a pre-established session token.
///
/// Useful in tests and for applications that run the SSO flow up front.
pub struct StaticSessionDriver {
    token: String,
}

impl StaticSessionDriver {
    /// Wrap an already-established session token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl SsoDriver for StaticSessionDriver {
    fn is_authorized(&self) -> bool {
        true
    }

    async fn acquire_session(&self) -> Result<String> {
        if self.token.is_empty() {
            return Err(Error::new(ErrorKind::SsoFailed(
                "no session token configured".to_string(),
            )));
        }
        debug!("handing out pre-established session token");
        Ok(self.token.clone())
    }
}
