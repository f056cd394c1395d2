//! # rally-rest-api
//!
//! A client library for the Rally work-item-tracking web service (WSAPI).
//!
//! The heart of the library is the request/response pipeline: a logical
//! query becomes a paginated HTTP request sequence, issued with bounded
//! parallelism and reassembled in request order, with typed success/error
//! outcomes.
//!
//! ## Security
//!
//! - Sensitive data (passwords, api keys, session tokens) are redacted in
//!   Debug output
//! - Tracing skips credential parameters
//!
//! ## Crates
//!
//! - **rally-types** - Dynamic record data model, JSON codec, reference codec
//! - **rally-auth** - Credentials, SSO driver contract, credential storage
//! - **rally-client** - HTTP transport: auth modes, bounded
//!   re-authentication, security tokens, wire tracing
//! - **rally-wsapi** - Queries, CRUD, pagination, result types
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rally_rest_api::auth::Credentials;
//! use rally_rest_api::wsapi::{QueryExpression, QueryOperator, RallyClient, Request};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RallyClient::new(
//!         "https://rally1.rallydev.com",
//!         Credentials::api_key("_abc123"),
//!     )?;
//!
//!     let mut request = Request::new("Defect");
//!     request.fetch = vec!["Name".into(), "Severity".into()];
//!     request.set_query(&QueryExpression::new(
//!         "Severity",
//!         QueryOperator::Equals,
//!         "Major",
//!     ));
//!
//!     let result = client.query(&request).await?;
//!     println!("{} defects", result.total_result_count);
//!
//!     Ok(())
//! }
//! ```

// Re-export all crates for convenient access
pub use rally_auth as auth;
pub use rally_client as client;
pub use rally_types as types;
pub use rally_wsapi as wsapi;
