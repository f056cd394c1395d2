//! High-level WSAPI facade: query, create, update, delete, get-by-reference.

use std::sync::Arc;

use tracing::{instrument, warn};

use rally_auth::{Credentials, SsoDriver};
use rally_client::{ClientConfig, RallyHttpClient, SecurityTokenManager, WsapiVersion};
use rally_types::{from_json, refs, to_json, Record};

use crate::error::{Error, ErrorKind, Result};
use crate::pagination;
use crate::request::{endpoint_for_type, Request};
use crate::results::{CreateResult, OperationResult, QueryResult};

/// The public client for one Rally server.
///
/// All state (cookies, credentials, the cached security token) is scoped to
/// one instance; nothing is shared across clients.
#[derive(Debug)]
pub struct RallyClient {
    http: RallyHttpClient,
    security: SecurityTokenManager,
    server: String,
    version: WsapiVersion,
}

impl RallyClient {
    /// Connect to a server with default configuration and the current
    /// protocol version.
    pub fn new(server: impl Into<String>, credentials: Credentials) -> Result<Self> {
        Self::with_config(server, credentials, ClientConfig::default())
    }

    /// Connect with custom transport configuration.
    pub fn with_config(
        server: impl Into<String>,
        credentials: Credentials,
        config: ClientConfig,
    ) -> Result<Self> {
        let version = WsapiVersion::default();
        Ok(Self {
            http: RallyHttpClient::new(credentials, config)?,
            security: SecurityTokenManager::new(version),
            server: server.into().trim_end_matches('/').to_string(),
            version,
        })
    }

    /// Target a different protocol version.
    pub fn with_version(mut self, version: WsapiVersion) -> Self {
        self.version = version;
        self.security = SecurityTokenManager::new(version);
        self
    }

    /// Attach an SSO driver used to refresh session-token credentials.
    pub fn with_sso_driver(mut self, driver: Arc<dyn SsoDriver>) -> Self {
        self.http = self.http.with_sso_driver(driver);
        self
    }

    /// The server this client talks to.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// The protocol version this client targets.
    pub fn version(&self) -> WsapiVersion {
        self.version
    }

    fn wsapi_root(&self) -> String {
        format!("{}/slm/webservice/{}", self.server, self.version.as_str())
    }

    /// Fetch one page of a query.
    pub(crate) async fn fetch_page(&self, request: &Request) -> Result<QueryResult> {
        let url = request.build_url(&self.server, self.version)?;
        let body = self.http.get(&url).await?;
        let record = from_json(&body)?;
        let payload = envelope(record, "QueryResult")?;
        Ok(QueryResult::from_record(payload))
    }

    /// Run a query, fetching every page up to the request's limit.
    ///
    /// Pages after the first are fetched concurrently (bounded) and
    /// reassembled in request order; see the pagination module.
    #[instrument(skip(self, request))]
    pub async fn query(&self, request: &Request) -> Result<QueryResult> {
        pagination::run(self, request).await
    }

    /// Fetch a single object by reference.
    #[instrument(skip(self))]
    pub async fn get_by_reference(&self, reference: &str, fetch: &[&str]) -> Result<QueryResult> {
        let relative = refs::to_relative(reference).ok_or_else(|| {
            Error::new(ErrorKind::InvalidRequest(format!(
                "not a reference: {reference}"
            )))
        })?;

        let fetch_clause = if fetch.is_empty() {
            "true".to_string()
        } else {
            fetch
                .iter()
                .map(|f| urlencoding::encode(f).into_owned())
                .collect::<Vec<_>>()
                .join(",")
        };

        let url = format!("{}{}?fetch={}", self.wsapi_root(), relative, fetch_clause);
        let body = self.http.get(&url).await?;
        let record = from_json(&body)?;
        let (_type_name, payload) = single_envelope(record)?;
        Ok(QueryResult::from_record(payload))
    }

    /// Create an artifact. The payload goes on the wire wrapped under the
    /// type name: `{"Defect": {...}}`.
    #[instrument(skip(self, object))]
    pub async fn create(&self, type_name: &str, object: Record) -> Result<CreateResult> {
        let url = format!(
            "{}/{}/create",
            self.wsapi_root(),
            endpoint_for_type(type_name)
        );
        let body = wrap_body(type_name, object);
        let payload = self.mutate(&url, Some(body.as_str()), "CreateResult").await?;
        Ok(CreateResult::from_record(&payload))
    }

    /// Update the artifact behind a reference.
    #[instrument(skip(self, object))]
    pub async fn update(&self, reference: &str, object: Record) -> Result<OperationResult> {
        let parsed = refs::parse(reference).ok_or_else(|| {
            Error::new(ErrorKind::InvalidRequest(format!(
                "not a reference: {reference}"
            )))
        })?;

        let url = format!("{}{}", self.wsapi_root(), parsed.relative());
        let body = wrap_body(parsed.type_name(), object);
        let payload = self
            .mutate(&url, Some(body.as_str()), "OperationResult")
            .await?;
        Ok(OperationResult::from_record(&payload))
    }

    /// Delete the artifact behind a reference.
    #[instrument(skip(self))]
    pub async fn delete(&self, reference: &str) -> Result<OperationResult> {
        let relative = refs::to_relative(reference).ok_or_else(|| {
            Error::new(ErrorKind::InvalidRequest(format!(
                "not a reference: {reference}"
            )))
        })?;

        let url = format!("{}{}", self.wsapi_root(), relative);
        let payload = self.mutate(&url, None, "OperationResult").await?;
        Ok(OperationResult::from_record(&payload))
    }

    /// Run one mutating call through the security-token handshake.
    ///
    /// When the first attempt used a cached token and the result segment
    /// reports errors, the token is invalidated and the call retried exactly
    /// once with a fresh one. A failure on a freshly-fetched token is final.
    async fn mutate(&self, url: &str, body: Option<&str>, envelope_key: &str) -> Result<Record> {
        let secured = self
            .security
            .secured_url(&self.http, &self.server, url)
            .await?;
        let payload = self
            .send_mutation(&secured.url, body, envelope_key)
            .await?;

        if OperationResult::from_record(&payload).success() || !secured.from_cache {
            return Ok(payload);
        }

        warn!("mutating call rejected with a cached security token, retrying with a fresh one");
        self.security.invalidate().await;
        let fresh = self
            .security
            .secured_url(&self.http, &self.server, url)
            .await?;
        self.send_mutation(&fresh.url, body, envelope_key).await
    }

    async fn send_mutation(
        &self,
        url: &str,
        body: Option<&str>,
        envelope_key: &str,
    ) -> Result<Record> {
        let raw = match body {
            Some(body) => self.http.post(url, body.to_string()).await?,
            None => self.http.delete(url).await?,
        };
        let record = from_json(&raw)?;
        envelope(record, envelope_key)
    }
}

fn wrap_body(type_name: &str, object: Record) -> String {
    let mut wrapper = Record::new();
    wrapper.set(type_name, object);
    to_json(&wrapper)
}

fn envelope(record: Record, key: &str) -> Result<Record> {
    record
        .get(key)
        .and_then(|v| v.as_record())
        .cloned()
        .ok_or_else(|| {
            Error::new(ErrorKind::ResponseShape(format!(
                "response has no {key} envelope"
            )))
        })
}

/// Single-object responses wrap the payload under one key equal to the
/// object's type name.
fn single_envelope(record: Record) -> Result<(String, Record)> {
    let mut entries = record.iter();
    let (key, value) = entries.next().ok_or_else(|| {
        Error::new(ErrorKind::ResponseShape("empty response object".to_string()))
    })?;

    let payload = value.as_record().cloned().ok_or_else(|| {
        Error::new(ErrorKind::ResponseShape(format!(
            "{key} payload is not an object"
        )))
    })?;

    Ok((key.to_string(), payload))
}
