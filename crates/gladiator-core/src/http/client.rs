use std::time::Duration;

use crate::config::AppConfig;
use crate::error::GladiatorError;

/// Per-request timeout applied by default to every load-test request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Wrapper around a pooled reqwest Client shared by every request of a run.
///
/// Cloning is cheap; clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    timeout: Duration,
}

/// Builder for [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpClientBuilder {
    timeout: Duration,
    pool_max_idle_per_host: usize,
    pool_idle_timeout: Duration,
    user_agent: String,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
            pool_max_idle_per_host: 100,
            pool_idle_timeout: Duration::from_secs(90),
            user_agent: format!("gladiator/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the builder from the application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::default()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .user_agent(config.user_agent.clone())
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn pool_max_idle_per_host(mut self, n: usize) -> Self {
        self.pool_max_idle_per_host = n;
        self
    }

    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn build(self) -> Result<HttpClient, GladiatorError> {
        // Timeout is applied per request; see `RequestExecutor`.
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .pool_idle_timeout(self.pool_idle_timeout)
            .user_agent(self.user_agent)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(HttpClient {
            inner: client,
            timeout: self.timeout,
        })
    }
}

impl HttpClient {
    /// Returns a builder for customising the client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// The per-request timeout this client was configured with.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }
}
