//! # rally-auth
//!
//! Authentication inputs for the Rally WSAPI client.
//!
//! ## Security
//!
//! - Sensitive data (passwords, api keys, session tokens) are redacted in
//!   Debug output
//! - Credential files are written through caller-supplied encryption
//!   routines; this crate never invents its own cryptography
//!
//! ## Supported Authentication Modes
//!
//! - **Basic** - username and password on every request
//! - **Api key** - the key rides the Basic challenge as both username and
//!   password
//! - **Session** - a session token established by an external SSO flow;
//!   the only mode that can be refreshed when the server rejects a call
//!
//! ## Example
//!
//! ```rust,ignore
//! use rally_auth::{Credentials, SsoDriver};
//!
//! let creds = Credentials::basic("user@example.com", "secret");
//! assert!(!creds.is_refreshable());
//!
//! let creds = Credentials::session("token-from-sso");
//! assert!(creds.is_refreshable());
//! ```

mod credentials;
mod error;
mod sso;
mod storage;

pub use credentials::Credentials;
pub use error::{Error, ErrorKind, Result};
pub use sso::{SsoDriver, StaticSessionDriver};
pub use storage::{CredentialCipher, CredentialStore, FileCredentialStore, StoredCredentials};
