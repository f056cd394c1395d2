//! Client configuration.
//!
//! Everything the transport needs is carried in an explicit `ClientConfig`
//! handed to constructors; there is no ambient global state.

use std::time::Duration;

use crate::MAX_AUTH_RETRIES;

/// How much of each wire call gets traced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceVerbosity {
    /// No wire tracing.
    Off,
    /// Method, URL, status, elapsed time, and headers.
    #[default]
    Headers,
    /// Headers plus request and response bodies.
    Full,
}

/// Outbound proxy settings.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Proxy URL, e.g. `http://proxy.corp:8080`.
    pub url: String,
    /// Optional proxy credentials.
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Integration-identifying headers sent on every call.
#[derive(Debug, Clone)]
pub struct IntegrationHeaders {
    pub library: String,
    pub vendor: String,
    pub name: String,
    pub version: String,
}

impl Default for IntegrationHeaders {
    fn default() -> Self {
        Self {
            library: crate::USER_AGENT.to_string(),
            vendor: "Open Source".to_string(),
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Pool idle timeout.
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,
    /// User-Agent header value.
    pub user_agent: String,
    /// Optional outbound proxy.
    pub proxy: Option<ProxyConfig>,
    /// Wire trace verbosity.
    pub trace: TraceVerbosity,
    /// Ceiling on re-authentication cycles per logical call.
    pub max_auth_retries: u32,
    /// Integration-identifying headers.
    pub integration: IntegrationHeaders,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            user_agent: crate::USER_AGENT.to_string(),
            proxy: None,
            trace: TraceVerbosity::default(),
            max_auth_retries: MAX_AUTH_RETRIES,
            integration: IntegrationHeaders::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new client config builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for ClientConfig.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set pool idle timeout.
    pub fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    pub fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Set custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Route calls through a proxy.
    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.config.proxy = Some(proxy);
        self
    }

    /// Set wire trace verbosity.
    pub fn with_trace(mut self, trace: TraceVerbosity) -> Self {
        self.config.trace = trace;
        self
    }

    /// Set the re-authentication ceiling.
    pub fn with_max_auth_retries(mut self, retries: u32) -> Self {
        self.config.max_auth_retries = retries;
        self
    }

    /// Override the integration-identifying headers.
    pub fn with_integration(mut self, integration: IntegrationHeaders) -> Self {
        self.config.integration = integration;
        self
    }

    /// Build the client configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
