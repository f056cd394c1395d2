//! Core HTTP transport with re-authentication and wire tracing.

use std::sync::Arc;
use std::time::Instant;

use reqwest::Method;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use rally_auth::{Credentials, SsoDriver};

use crate::config::{ClientConfig, TraceVerbosity};
use crate::error::{Error, ErrorKind, Result};
use crate::retry::ReauthPolicy;

/// HTTP transport for the Rally WSAPI.
///
/// Holds the credentials, cookie container, and proxy settings for one
/// client instance. A 401 under session-token auth triggers a
/// re-authentication cycle through the attached SSO driver, bounded by
/// `ClientConfig::max_auth_retries`; a 401 under basic or api-key auth is
/// fatal immediately, since re-sending static credentials cannot succeed.
pub struct RallyHttpClient {
    inner: reqwest::Client,
    config: ClientConfig,
    credentials: RwLock<Credentials>,
    sso: Option<Arc<dyn SsoDriver>>,
}

impl std::fmt::Debug for RallyHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RallyHttpClient")
            .field("config", &self.config)
            .field("credentials", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl RallyHttpClient {
    /// Create a new transport with the given credentials and configuration.
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .gzip(true)
            .deflate(true);

        if let Some(ref proxy) = config.proxy {
            let mut p = reqwest::Proxy::all(&proxy.url)
                .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;
            if let (Some(user), Some(pass)) = (&proxy.username, &proxy.password) {
                p = p.basic_auth(user, pass);
            }
            builder = builder.proxy(p);
        }

        let inner = builder
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self {
            inner,
            config,
            credentials: RwLock::new(credentials),
            sso: None,
        })
    }

    /// Create a transport with default configuration.
    pub fn with_defaults(credentials: Credentials) -> Result<Self> {
        Self::new(credentials, ClientConfig::default())
    }

    /// Attach an SSO driver used to refresh session-token credentials.
    pub fn with_sso_driver(mut self, driver: Arc<dyn SsoDriver>) -> Self {
        self.sso = Some(driver);
        self
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Issue a GET and return the raw response body.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get(&self, url: &str) -> Result<String> {
        self.execute(Method::GET, url, None).await
    }

    /// Issue a POST with a JSON body and return the raw response body.
    #[instrument(skip(self, body), fields(url = %url))]
    pub async fn post(&self, url: &str, body: String) -> Result<String> {
        self.execute(Method::POST, url, Some(body)).await
    }

    /// Issue a DELETE and return the raw response body.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn delete(&self, url: &str) -> Result<String> {
        self.execute(Method::DELETE, url, None).await
    }

    /// Per-call state machine: attempt, then on a refreshable 401
    /// re-authenticate and attempt again, bounded by the retry ceiling.
    async fn execute(&self, method: Method, url: &str, body: Option<String>) -> Result<String> {
        let mut policy = ReauthPolicy::new(self.config.max_auth_retries);

        loop {
            match self.execute_once(method.clone(), url, body.as_deref()).await {
                Err(err) if err.is_refreshable_unauthorized() => {
                    let Some(delay) = policy.next_delay() else {
                        return Err(Error::new(ErrorKind::RetriesExhausted {
                            attempts: policy.attempt(),
                        }));
                    };
                    warn!(
                        attempt = policy.attempt(),
                        delay_ms = delay.as_millis() as u64,
                        "unauthorized, re-authenticating"
                    );
                    tokio::time::sleep(delay).await;
                    self.reauthenticate().await?;
                }
                other => return other,
            }
        }
    }

    async fn execute_once(&self, method: Method, url: &str, body: Option<&str>) -> Result<String> {
        let started = Instant::now();
        let mut request = self
            .inner
            .request(method.clone(), url)
            .header("X-RallyIntegrationLibrary", &self.config.integration.library)
            .header("X-RallyIntegrationVendor", &self.config.integration.vendor)
            .header("X-RallyIntegrationName", &self.config.integration.name)
            .header("X-RallyIntegrationVersion", &self.config.integration.version);

        let refreshable = {
            let credentials = self.credentials.read().await;
            if let Some((username, password)) = credentials.basic_pair() {
                request = request.basic_auth(username, Some(password));
            }
            if let Some(token) = credentials.session_token() {
                request = request.header("ZSESSIONID", token);
            }
            credentials.is_refreshable() && self.sso.is_some()
        };

        if let Some(body) = body {
            request = request
                .header("Content-Type", "application/json")
                .body(body.to_string());
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let text = response.text().await?;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        self.trace_exchange(&method, url, status, elapsed_ms, &headers, &text);

        match status {
            401 => Err(Error::new(ErrorKind::Unauthorized { refreshable })),
            s if (200..300).contains(&s) => Ok(text),
            s => Err(Error::new(ErrorKind::Http {
                status: s,
                message: snippet(&text),
            })),
        }
    }

    async fn reauthenticate(&self) -> Result<()> {
        let driver = self
            .sso
            .as_ref()
            .ok_or_else(|| Error::new(ErrorKind::Sso("no SSO driver attached".to_string())))?;

        let token = driver.acquire_session().await?;
        *self.credentials.write().await = Credentials::session(token);
        info!("session re-established via SSO driver");
        Ok(())
    }

    /// Emit the structured wire trace. Observational only; cookie movement
    /// shows up through the Set-Cookie response headers.
    fn trace_exchange(
        &self,
        method: &Method,
        url: &str,
        status: u16,
        elapsed_ms: u64,
        headers: &reqwest::header::HeaderMap,
        body: &str,
    ) {
        match self.config.trace {
            TraceVerbosity::Off => {}
            TraceVerbosity::Headers => {
                debug!(%method, url, status, elapsed_ms, ?headers, body_len = body.len(), "wsapi call");
            }
            TraceVerbosity::Full => {
                debug!(%method, url, status, elapsed_ms, ?headers, body, "wsapi call");
            }
        }
    }
}

fn snippet(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut cut = MAX;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &body[..cut])
    }
}
