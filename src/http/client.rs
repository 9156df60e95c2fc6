//! HTTP client with retry and rate limiting
//!
//! Provides the transport every API call goes through:
//! - One rate gate shared by all calls on this client
//! - Automatic retries on 429/5xx and connection faults
//! - `Retry-After` hints preferred over jittered backoff
//! - Immediate failure on other non-2xx statuses

use super::backoff::{parse_retry_after, Backoff};
use super::rate_limit::{RateGate, RateGateConfig};
use crate::auth::redact;
use crate::config::ClientConfig;
use crate::error::{is_retryable_status, Error, Result};
use crate::types::{Method, QueryParams};
use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::{Client, Response};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Accept header sent on every request
pub const ACCEPT_HEADER: &str = "application/json, application/xml;q=0.9, */*;q=0.8";

/// Longest response body excerpt kept in errors and logs
const BODY_EXCERPT: usize = 200;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Total attempts per request, including the first
    pub max_attempts: u32,
    /// Backoff between attempts
    pub backoff: Backoff,
    /// Rate gate configuration
    pub rate_limit: RateGateConfig,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_attempts: 8,
            backoff: Backoff::default(),
            rate_limit: RateGateConfig::default(),
            user_agent: format!("congress-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl From<&ClientConfig> for HttpClientConfig {
    fn from(config: &ClientConfig) -> Self {
        let (base, cap) = config.backoff();
        Self {
            timeout: config.timeout(),
            max_attempts: config.max_attempts.max(1),
            backoff: Backoff::new(base, cap),
            rate_limit: RateGateConfig {
                min_interval: config.min_interval(),
                requests_per_hour: config.requests_per_hour,
                safety_margin: config.safety_margin,
                exhaustion_sleep: config.exhaustion_sleep(),
            },
            user_agent: config.user_agent.clone(),
        }
    }
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    gate: Mutex<RateGate>,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(ACCEPT, reqwest::header::HeaderValue::from_static(ACCEPT_HEADER));

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()?;

        let gate = Mutex::new(RateGate::new(&config.rate_limit));

        Ok(Self {
            client,
            config,
            gate,
        })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Make a GET request to an absolute URL
    pub async fn get(&self, url: &str) -> Result<Response> {
        self.execute(Method::GET, url, &QueryParams::new()).await
    }

    /// Make a GET request with query parameters
    pub async fn get_with_query(&self, url: &str, query: &QueryParams) -> Result<Response> {
        self.execute(Method::GET, url, query).await
    }

    /// Execute a request, retrying transient failures.
    ///
    /// Every attempt passes the rate gate first. A 2xx response is returned
    /// as-is; 429/500/502/503/504 and connection-level faults are retried;
    /// any other status fails at once. When attempts run out the last
    /// retryable status error is returned, or [`Error::RetriesExhausted`]
    /// if only connection faults were seen.
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        query: &QueryParams,
    ) -> Result<Response> {
        let max_attempts = self.config.max_attempts.max(1);
        let shown_url = redact(url);
        let pairs: Vec<(&str, &str)> = query.iter().collect();

        let mut last_status_error: Option<Error> = None;
        let mut last_cause = String::new();

        for attempt in 0..max_attempts {
            let is_last = attempt + 1 == max_attempts;

            {
                let mut gate = self.gate.lock().await;
                gate.acquire().await;
            }

            let mut req = self
                .client
                .request(method.into(), url)
                .timeout(self.config.timeout);
            if !pairs.is_empty() {
                req = req.query(&pairs);
            }

            match req.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        debug!(url = %shown_url, status = status.as_u16(), attempt, "Request succeeded");
                        return Ok(response);
                    }

                    let code = status.as_u16();
                    let hint = response
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .map(parse_retry_after)
                        .unwrap_or_default();
                    let body = excerpt(&response.text().await.unwrap_or_default());

                    if !is_retryable_status(code) {
                        return Err(Error::http_status(code, shown_url, body));
                    }

                    warn!(
                        url = %shown_url,
                        status = code,
                        attempt = attempt + 1,
                        max_attempts,
                        body = %body,
                        "Retryable HTTP status"
                    );
                    last_status_error = Some(Error::http_status(code, shown_url.clone(), body));

                    if !is_last {
                        if hint.is_zero() {
                            self.sleep_backoff(attempt).await;
                        } else {
                            info!(delay_ms = hint.as_millis() as u64, "Honouring Retry-After");
                            tokio::time::sleep(hint).await;
                        }
                    }
                }
                Err(e) => {
                    if e.is_builder() {
                        return Err(Error::Http(e));
                    }

                    warn!(
                        url = %shown_url,
                        attempt = attempt + 1,
                        max_attempts,
                        timeout = e.is_timeout(),
                        connect = e.is_connect(),
                        error = %e,
                        "Request error"
                    );
                    last_cause = e.to_string();

                    if !is_last {
                        self.sleep_backoff(attempt).await;
                    }
                }
            }
        }

        Err(last_status_error.unwrap_or(Error::RetriesExhausted {
            url: shown_url,
            attempts: max_attempts,
            last_error: last_cause,
        }))
    }

    async fn sleep_backoff(&self, attempt: u32) {
        let delay = self.config.backoff.delay(attempt);
        debug!(
            delay_ms = delay.as_millis() as u64,
            attempt = attempt + 1,
            "Backing off"
        );
        tokio::time::sleep(delay).await;
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// First few hundred characters of a response body
fn excerpt(body: &str) -> String {
    match body.char_indices().nth(BODY_EXCERPT) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body.to_string(),
    }
}
