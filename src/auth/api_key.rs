//! API key query-parameter authentication

use crate::error::{Error, Result};
use url::Url;

/// Query parameter that carries the key
pub const API_KEY_PARAM: &str = "api_key";

/// Adds the API key to same-host URLs
#[derive(Clone)]
pub struct ApiKeyAuth {
    api_key: String,
    host: String,
    port: Option<u16>,
}

impl ApiKeyAuth {
    /// Create an authenticator for the host of `base_url`
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)?;
        let host = base
            .host_str()
            .ok_or_else(|| Error::invalid_value("base_url", "URL has no host"))?
            .to_string();

        Ok(Self {
            api_key: api_key.into(),
            host,
            port: base.port_or_known_default(),
        })
    }

    /// The key itself
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Host that receives the key
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Whether `url` points at the API host
    pub fn is_api_url(&self, url: &Url) -> bool {
        url.host_str() == Some(self.host.as_str()) && url.port_or_known_default() == self.port
    }

    /// Return `url` with the key appended if it targets the API host.
    ///
    /// Idempotent: a URL that already has an `api_key` parameter is returned
    /// unchanged. Other hosts and unparseable input pass through as-is.
    pub fn with_auth(&self, url: &str) -> String {
        let Ok(mut parsed) = Url::parse(url) else {
            return url.to_string();
        };

        if !self.is_api_url(&parsed) || parsed.query_pairs().any(|(k, _)| k == API_KEY_PARAM) {
            return url.to_string();
        }

        parsed
            .query_pairs_mut()
            .append_pair(API_KEY_PARAM, &self.api_key);
        parsed.to_string()
    }

    /// Optional-link variant of [`with_auth`](Self::with_auth)
    pub fn with_auth_opt(&self, url: Option<&str>) -> Option<String> {
        url.filter(|u| !u.is_empty()).map(|u| self.with_auth(u))
    }

    /// Mask the key in a URL for logs and error messages
    pub fn redact(&self, url: &str) -> String {
        redact(url)
    }
}

/// Mask any `api_key` value in `url`
pub(crate) fn redact(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    if !parsed.query_pairs().any(|(k, _)| k == API_KEY_PARAM) {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == API_KEY_PARAM {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();

    parsed.query_pairs_mut().clear().extend_pairs(pairs);
    parsed.to_string()
}

impl std::fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}
