//! # rally-client
//!
//! HTTP transport infrastructure for the Rally WSAPI.
//!
//! This crate provides:
//! - `RallyHttpClient` - GET/POST/DELETE with cookie container, basic or
//!   session-token credentials, proxy support, and automatic
//!   unauthorized-triggered re-authentication (bounded)
//! - `SecurityTokenManager` - the CSRF token handshake required by v2
//!   mutating calls, cached per client instance
//! - `ClientConfig` - explicit configuration passed to constructors; no
//!   process-wide mutable state
//! - structured wire tracing gated by a verbosity setting
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                rally-wsapi (facade)                 │
//! └─────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                 RallyHttpClient                     │
//! │  - credentials + cookie container + proxy           │
//! │  - 401 -> SSO re-auth -> retry (ceiling 4)          │
//! │  - wire tracing                                     │
//! └─────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                  reqwest::Client                    │
//! └─────────────────────────────────────────────────────┘
//! ```

mod client;
mod config;
mod error;
mod retry;
mod security;
mod version;

pub use client::RallyHttpClient;
pub use config::{ClientConfig, ClientConfigBuilder, IntegrationHeaders, ProxyConfig, TraceVerbosity};
pub use error::{Error, ErrorKind, Result};
pub use retry::ReauthPolicy;
pub use security::{SecuredUrl, SecurityTokenManager};
pub use version::WsapiVersion;

/// User-Agent string for the client.
pub const USER_AGENT: &str = concat!("rally-rest-api/", env!("CARGO_PKG_VERSION"));

/// Ceiling on re-authentication cycles for one logical call.
pub const MAX_AUTH_RETRIES: u32 = 4;
