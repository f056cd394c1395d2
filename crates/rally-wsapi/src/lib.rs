//! # rally-wsapi
//!
//! Rally WSAPI operations: queries with automatic pagination, CRUD on
//! artifacts, and typed result wrappers.
//!
//! ## Features
//!
//! - **Query** - filter expressions, fetch-field selection, stable ordering,
//!   bounded-concurrency pagination with deterministic reassembly
//! - **CRUD** - create, update, delete with the v2 security-token handshake
//! - **Get by reference** - fetch a single artifact from its reference string
//! - **Result types** - errors and warnings surfaced as data, success
//!   computed from the error list
//!
//! ## Example
//!
//! ```rust,ignore
//! use rally_auth::Credentials;
//! use rally_wsapi::{QueryExpression, QueryOperator, RallyClient, Request};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), rally_wsapi::Error> {
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
//!     request.limit = 1000;
//!
//!     let result = client.query(&request).await?;
//!     for defect in &result.results {
//!         println!("{:?}", defect.get_str("Name"));
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod pagination;
mod query;
mod request;
mod results;

pub use client::RallyClient;
pub use error::{Error, ErrorKind, Result};
pub use query::{QueryExpression, QueryOperator};
pub use request::{Request, MAX_PAGE_SIZE};
pub use results::{CreateResult, OperationResult, QueryResult};

// Re-export the pieces callers need to configure a client.
pub use rally_auth::{Credentials, SsoDriver};
pub use rally_client::{ClientConfig, ClientConfigBuilder, TraceVerbosity, WsapiVersion};
