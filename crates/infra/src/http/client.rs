use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use tidyhome_domain::{GatewayConfig, TidyHomeError};
use tracing::{debug, warn};

use crate::errors::to_domain;

const USER_AGENT: &str = concat!("tidyhome-payouts/", env!("CARGO_PKG_VERSION"));

/// When and how long to wait before re-sending a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Never below 1.
    pub max_attempts: usize,
    pub base_backoff: Duration,
    /// Upper bound for both computed backoff and server `Retry-After` hints.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based): base, 2x base, 4x base...
    pub fn delay_before(&self, retry: usize) -> Duration {
        let exponent = u32::try_from(retry.saturating_sub(1).min(16)).unwrap_or(16);
        self.base_backoff.saturating_mul(1u32 << exponent).min(self.max_backoff)
    }

    fn retries_status(status: StatusCode) -> bool {
        status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
    }

    fn retries_error(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect() || err.is_request()
    }

    /// Server-provided wait in whole seconds, clamped to `max_backoff`.
    fn hinted_delay(&self, response: &Response) -> Option<Duration> {
        let secs = response.headers().get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()?;
        Some(Duration::from_secs(secs).min(self.max_backoff))
    }
}

/// reqwest wrapper that re-sends idempotent gateway calls on transient
/// failures (5xx, 429, connect errors and timeouts).
#[derive(Clone)]
pub struct HttpClient {
    inner: ReqwestClient,
    policy: RetryPolicy,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn new() -> Result<Self, TidyHomeError> {
        Self::builder().build()
    }

    /// Client for the payment gateway. The whole retry budget fits inside
    /// [`GatewayConfig::call_deadline`].
    pub fn for_gateway(config: &GatewayConfig) -> Result<Self, TidyHomeError> {
        Self::builder()
            .timeout(config.attempt_timeout())
            .max_attempts(config.max_attempts)
            .max_backoff(config.max_backoff())
            .user_agent(USER_AGENT)
            .build()
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.inner.request(method, url)
    }

    /// Send `builder`, retrying per the client's [`RetryPolicy`].
    ///
    /// A retryable status on the final attempt is handed back as a normal
    /// response so the caller can read the gateway's error body.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, TidyHomeError> {
        let mut attempt = 1;
        loop {
            let request = builder
                .try_clone()
                .ok_or_else(|| TidyHomeError::Internal("streaming body cannot be retried".into()))?
                .build()
                .map_err(to_domain)?;
            let (method, url) = (request.method().clone(), request.url().clone());
            let last_attempt = attempt >= self.policy.max_attempts;

            let delay = match self.inner.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt, %method, %url, %status, "gateway responded");
                    if last_attempt || !RetryPolicy::retries_status(status) {
                        return Ok(response);
                    }
                    self.policy
                        .hinted_delay(&response)
                        .unwrap_or_else(|| self.policy.delay_before(attempt))
                }
                Err(err) => {
                    if last_attempt || !RetryPolicy::retries_error(&err) {
                        return Err(to_domain(err));
                    }
                    warn!(attempt, %method, %url, error = %err, "gateway request failed, retrying");
                    self.policy.delay_before(attempt)
                }
            };

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
    }
}

#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    policy: RetryPolicy,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), policy: RetryPolicy::default(), user_agent: None }
    }
}

impl HttpClientBuilder {
    /// Per-request timeout applied by reqwest to each attempt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.policy.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.policy.base_backoff = backoff;
        self
    }

    pub fn max_backoff(mut self, backoff: Duration) -> Self {
        self.policy.max_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient, TidyHomeError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let mut policy = self.policy;
        policy.max_attempts = policy.max_attempts.max(1);
        Ok(HttpClient { inner: builder.build().map_err(to_domain)?, policy })
    }
}
