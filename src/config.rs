//! Client configuration
//!
//! `ClientConfig` carries every tunable of the request engine. It can be
//! built in code with [`ClientConfig::builder`] or loaded from YAML/JSON;
//! every field except `api_key` has a default.

use crate::error::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://api.congress.gov/v3";

// ============================================================================
// Client Config
// ============================================================================

/// Complete client configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API key sent as the `api_key` query parameter
    #[serde(default)]
    pub api_key: String,

    /// Base URL for all relative paths
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-attempt HTTP timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,

    /// Minimum spacing between call starts (0 disables)
    #[serde(default = "default_min_interval_secs")]
    pub min_interval_secs: f64,

    /// Total attempts per request, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay for full-jitter exponential backoff
    #[serde(default = "default_backoff_base_secs")]
    pub backoff_base_secs: f64,

    /// Ceiling for the exponential backoff window
    #[serde(default = "default_backoff_cap_secs")]
    pub backoff_cap_secs: f64,

    /// Page size requested on first pages (`limit` query parameter)
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,

    /// Provider-side hourly request allowance
    #[serde(default = "default_requests_per_hour")]
    pub requests_per_hour: u32,

    /// Fraction of the hourly allowance held back, in `[0, 1)`
    #[serde(default = "default_safety_margin")]
    pub safety_margin: f64,

    /// Sleep taken when the hourly budget runs dry
    #[serde(default = "default_exhaustion_sleep_secs")]
    pub exhaustion_sleep_secs: f64,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> f64 {
    60.0
}

fn default_min_interval_secs() -> f64 {
    0.1
}

fn default_max_attempts() -> u32 {
    8
}

fn default_backoff_base_secs() -> f64 {
    0.75
}

fn default_backoff_cap_secs() -> f64 {
    60.0
}

fn default_page_limit() -> u32 {
    250
}

fn default_requests_per_hour() -> u32 {
    5000
}

fn default_safety_margin() -> f64 {
    0.01
}

fn default_exhaustion_sleep_secs() -> f64 {
    15.0 * 60.0
}

fn default_user_agent() -> String {
    format!("congress-client/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            min_interval_secs: default_min_interval_secs(),
            max_attempts: default_max_attempts(),
            backoff_base_secs: default_backoff_base_secs(),
            backoff_cap_secs: default_backoff_cap_secs(),
            page_limit: default_page_limit(),
            requests_per_hour: default_requests_per_hour(),
            safety_margin: default_safety_margin(),
            exhaustion_sleep_secs: default_exhaustion_sleep_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("min_interval_secs", &self.min_interval_secs)
            .field("max_attempts", &self.max_attempts)
            .field("backoff_base_secs", &self.backoff_base_secs)
            .field("backoff_cap_secs", &self.backoff_cap_secs)
            .field("page_limit", &self.page_limit)
            .field("requests_per_hour", &self.requests_per_hour)
            .field("safety_margin", &self.safety_margin)
            .field("exhaustion_sleep_secs", &self.exhaustion_sleep_secs)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    /// Create a config with defaults and the given key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Parse a config from YAML (JSON is accepted as a YAML subset)
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load a config from a YAML or JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Check every field for a usable value
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::missing_field("api_key"));
        }

        let base = Url::parse(&self.base_url)?;
        if base.host_str().is_none() {
            return Err(Error::invalid_value("base_url", "URL has no host"));
        }

        if !(0.0..1.0).contains(&self.safety_margin) {
            return Err(Error::invalid_value(
                "safety_margin",
                format!("must be in [0, 1), got {}", self.safety_margin),
            ));
        }

        if self.max_attempts == 0 {
            return Err(Error::invalid_value("max_attempts", "must be at least 1"));
        }

        for (field, value) in [
            ("timeout_secs", self.timeout_secs),
            ("min_interval_secs", self.min_interval_secs),
            ("backoff_base_secs", self.backoff_base_secs),
            ("backoff_cap_secs", self.backoff_cap_secs),
            ("exhaustion_sleep_secs", self.exhaustion_sleep_secs),
        ] {
            if Duration::try_from_secs_f64(value).is_err() {
                return Err(Error::invalid_value(
                    field,
                    format!("must be a non-negative, representable number of seconds, got {value}"),
                ));
            }
        }

        Ok(())
    }

    /// Host that receives the API key
    pub fn api_host(&self) -> Result<String> {
        let base = Url::parse(&self.base_url)?;
        base.host_str()
            .map(str::to_string)
            .ok_or_else(|| Error::invalid_value("base_url", "URL has no host"))
    }

    /// Per-attempt timeout
    pub fn timeout(&self) -> Duration {
        secs(self.timeout_secs)
    }

    /// Politeness interval
    pub fn min_interval(&self) -> Duration {
        secs(self.min_interval_secs)
    }

    /// Budget exhaustion sleep
    pub fn exhaustion_sleep(&self) -> Duration {
        secs(self.exhaustion_sleep_secs)
    }

    /// Backoff base and cap
    pub fn backoff(&self) -> (Duration, Duration) {
        (secs(self.backoff_base_secs), secs(self.backoff_cap_secs))
    }
}

/// Convert seconds to a duration, clamping junk and overflow to zero
fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for the client config
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the per-attempt timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_secs = timeout.as_secs_f64();
        self
    }

    /// Set the politeness interval
    pub fn min_interval(mut self, interval: Duration) -> Self {
        self.config.min_interval_secs = interval.as_secs_f64();
        self
    }

    /// Set the attempt ceiling
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    /// Set backoff base and cap
    pub fn backoff(mut self, base: Duration, cap: Duration) -> Self {
        self.config.backoff_base_secs = base.as_secs_f64();
        self.config.backoff_cap_secs = cap.as_secs_f64();
        self
    }

    /// Set the page size
    pub fn page_limit(mut self, limit: u32) -> Self {
        self.config.page_limit = limit;
        self
    }

    /// Set the hourly budget and the fraction held back
    pub fn hourly_budget(mut self, requests_per_hour: u32, safety_margin: f64) -> Self {
        self.config.requests_per_hour = requests_per_hour;
        self.config.safety_margin = safety_margin;
        self
    }

    /// Set the budget exhaustion sleep
    pub fn exhaustion_sleep(mut self, sleep: Duration) -> Self {
        self.config.exhaustion_sleep_secs = sleep.as_secs_f64();
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
