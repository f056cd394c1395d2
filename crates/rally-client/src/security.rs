//! Security (CSRF) token handshake for v2 mutating calls.

use tokio::sync::Mutex;
use tracing::debug;

use rally_types::from_json;

use crate::client::RallyHttpClient;
use crate::error::{Error, ErrorKind, Result};
use crate::version::WsapiVersion;

/// Endpoint that issues security tokens, relative to the WSAPI root.
const AUTHORIZE_ENDPOINT: &str = "security/authorize";

/// A URL secured for a mutating call.
#[derive(Debug, Clone)]
pub struct SecuredUrl {
    /// The URL to send, with `key={token}` appended when required.
    pub url: String,
    /// True when the token came from the cache rather than a fresh fetch.
    /// The mutation path uses this to decide whether one retry with a fresh
    /// token is worth attempting.
    pub from_cache: bool,
}

/// Obtains and caches the CSRF token required by v2 mutating calls.
///
/// The token lives for the lifetime of the client instance. Concurrent
/// callers serialize through the cache mutex, so a cold cache triggers
/// exactly one fetch no matter how many workers arrive at once.
pub struct SecurityTokenManager {
    version: WsapiVersion,
    cached: Mutex<Option<String>>,
}

impl std::fmt::Debug for SecurityTokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityTokenManager")
            .field("version", &self.version)
            .field("cached", &"[REDACTED]")
            .finish()
    }
}

impl SecurityTokenManager {
    /// Create a manager for the given protocol version.
    pub fn new(version: WsapiVersion) -> Self {
        Self {
            version,
            cached: Mutex::new(None),
        }
    }

    /// Secure a mutating-call URL.
    ///
    /// A no-op on the legacy protocol. On v2, appends `key={token}`,
    /// fetching and caching the token on first use.
    pub async fn secured_url(
        &self,
        http: &RallyHttpClient,
        server: &str,
        url: &str,
    ) -> Result<SecuredUrl> {
        if !self.version.requires_security_token() {
            return Ok(SecuredUrl {
                url: url.to_string(),
                from_cache: false,
            });
        }

        let mut cached = self.cached.lock().await;
        let (token, from_cache) = match cached.as_ref() {
            Some(token) => (token.clone(), true),
            None => {
                let token = self.fetch_token(http, server).await?;
                *cached = Some(token.clone());
                (token, false)
            }
        };

        let separator = if url.contains('?') { '&' } else { '?' };
        Ok(SecuredUrl {
            url: format!("{url}{separator}key={}", urlencoding::encode(&token)),
            from_cache,
        })
    }

    /// Drop the cached token so the next mutating call fetches a fresh one.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
        debug!("security token invalidated");
    }

    async fn fetch_token(&self, http: &RallyHttpClient, server: &str) -> Result<String> {
        let url = format!(
            "{}/slm/webservice/{}/{}",
            server.trim_end_matches('/'),
            self.version.as_str(),
            AUTHORIZE_ENDPOINT
        );

        let body = http.get(&url).await?;
        let record = from_json(&body)?;

        let token = record
            .get("OperationResult")
            .and_then(|v| v.as_record())
            .and_then(|r| r.get_str("SecurityToken"))
            .map(str::to_string)
            .ok_or_else(|| Error::new(ErrorKind::MalformedResponse { body }))?;

        debug!("security token acquired");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientConfig, TraceVerbosity};
    use rally_auth::Credentials;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> RallyHttpClient {
        RallyHttpClient::new(
            Credentials::basic("u", "p"),
            ClientConfig::builder().with_trace(TraceVerbosity::Off).build(),
        )
        .unwrap()
    }

    fn token_body(token: &str) -> String {
        format!(r#"{{"OperationResult":{{"Errors":[],"Warnings":[],"SecurityToken":"{token}"}}}}"#)
    }

    #[tokio::test]
    async fn test_legacy_protocol_is_a_no_op() {
        let manager = SecurityTokenManager::new(WsapiVersion::V1_43);
        let secured = manager
            .secured_url(&client(), "https://host", "https://host/slm/webservice/1.43/defect/1")
            .await
            .unwrap();
        assert_eq!(secured.url, "https://host/slm/webservice/1.43/defect/1");
        assert!(!secured.from_cache);
    }

    #[tokio::test]
    async fn test_token_is_fetched_once_and_cached() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slm/webservice/v2.0/security/authorize"))
            .respond_with(ResponseTemplate::new(200).set_body_string(token_body("tok-1")))
            .expect(1)
            .mount(&server)
            .await;

        let manager = SecurityTokenManager::new(WsapiVersion::V2_0);
        let http = client();

        let first = manager
            .secured_url(&http, &server.uri(), "https://host/x?fetch=true")
            .await
            .unwrap();
        assert_eq!(first.url, "https://host/x?fetch=true&key=tok-1");
        assert!(!first.from_cache);

        let second = manager
            .secured_url(&http, &server.uri(), "https://host/x")
            .await
            .unwrap();
        assert_eq!(second.url, "https://host/x?key=tok-1");
        assert!(second.from_cache);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slm/webservice/v2.0/security/authorize"))
            .respond_with(ResponseTemplate::new(200).set_body_string(token_body("tok")))
            .expect(2)
            .mount(&server)
            .await;

        let manager = SecurityTokenManager::new(WsapiVersion::V2_0);
        let http = client();

        manager.secured_url(&http, &server.uri(), "u").await.unwrap();
        manager.invalidate().await;
        let after = manager.secured_url(&http, &server.uri(), "u").await.unwrap();
        assert!(!after.from_cache);
    }

    #[tokio::test]
    async fn test_missing_token_in_payload_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"OperationResult":{"Errors":["no token"]}}"#),
            )
            .mount(&server)
            .await;

        let manager = SecurityTokenManager::new(WsapiVersion::V2_0);
        let err = manager
            .secured_url(&client(), &server.uri(), "u")
            .await
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedResponse { .. }));
    }
}
