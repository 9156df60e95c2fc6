//! Congress.gov API client
//!
//! [`CongressClient`] wires the configuration, API key helper, rate-limited
//! transport and payload normalizer together. It fetches single documents,
//! walks paginated collections, and is the [`PageSource`] the entity
//! streamer runs on.

use crate::auth::ApiKeyAuth;
use crate::config::ClientConfig;
use crate::decode::Normalizer;
use crate::entities::{self, DetailResolver, EntityKind, EntityQuery, EntityStream, StreamOptions};
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig};
use crate::models::{ModelResolver, Record};
use crate::pagination::{page, ItemStream, PageSource};
use crate::types::{JsonObject, QueryParams};
use async_trait::async_trait;
use reqwest::Response;
use tracing::debug;

/// Typed, paginated, rate-limited client for the Congress.gov API
#[derive(Debug)]
pub struct CongressClient {
    http: HttpClient,
    normalizer: Normalizer,
    auth: ApiKeyAuth,
    base_url: String,
    page_limit: u32,
}

impl CongressClient {
    /// Create a client with the built-in XML fallback decoder
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_normalizer(config, Normalizer::default())
    }

    /// Create a client with a custom payload normalizer
    pub fn with_normalizer(config: ClientConfig, normalizer: Normalizer) -> Result<Self> {
        config.validate()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let auth = ApiKeyAuth::new(config.api_key.clone(), &base_url)?;
        let http = HttpClient::with_config(HttpClientConfig::from(&config))?;

        Ok(Self {
            http,
            normalizer,
            auth,
            base_url,
            page_limit: config.page_limit,
        })
    }

    /// API key helper
    pub fn auth(&self) -> &ApiKeyAuth {
        &self.auth
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Underlying transport
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Add the API key to a same-host URL
    pub fn with_auth(&self, url: &str) -> String {
        self.auth.with_auth(url)
    }

    /// Absolute URL for an API path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Query for a first request: credentials and page size, then the
    /// caller's parameters (which may override `limit`)
    pub fn first_page_params(&self, params: &QueryParams) -> QueryParams {
        let mut query = QueryParams::new()
            .set(crate::auth::API_KEY_PARAM, self.auth.api_key())
            .set("limit", self.page_limit);
        query.extend(params);
        query
    }

    /// GET an API path and normalize the body
    pub async fn get(&self, path: &str, params: &QueryParams) -> Result<JsonObject> {
        let url = self.url_for(path);
        let query = self.first_page_params(params);
        let response = self.http.get_with_query(&url, &query).await?;
        self.read_body(response).await
    }

    /// GET an absolute URL as-is and normalize the body
    pub async fn get_url(&self, url: &str) -> Result<JsonObject> {
        let response = self.http.get(url).await?;
        self.read_body(response).await
    }

    /// Lazily walk a paginated collection
    pub fn page(&self, path: &str, data_key: &str, params: QueryParams) -> ItemStream<'_> {
        page(self, path, data_key, params)
    }

    /// Raw list items of a kind, across every congress in scope
    pub fn stream_items(&self, kind: EntityKind, query: &EntityQuery) -> Result<ItemStream<'_>> {
        entities::list_items(self, kind, query)
    }

    /// Stream entities, hydrating through the built-in typed records
    pub fn stream_entities(
        &self,
        kind: EntityKind,
        query: &EntityQuery,
        options: StreamOptions,
    ) -> Result<EntityStream<'_, Record>> {
        self.stream_entities_with(kind, query, options, ModelResolver::new(self))
    }

    /// Stream entities, hydrating through a caller-supplied resolver
    pub fn stream_entities_with<'a, R>(
        &'a self,
        kind: EntityKind,
        query: &EntityQuery,
        options: StreamOptions,
        resolver: R,
    ) -> Result<EntityStream<'a, R::Detail>>
    where
        R: DetailResolver + 'a,
    {
        entities::stream_entities(self, kind, query, options, resolver)
    }

    async fn read_body(&self, response: Response) -> Result<JsonObject> {
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await?;
        debug!(content_type = %content_type, bytes = body.len(), "Read response body");
        self.normalizer.parse(&body)
    }
}

#[async_trait]
impl PageSource for CongressClient {
    async fn fetch_first(&self, path: &str, params: &QueryParams) -> Result<JsonObject> {
        self.get(path, params).await
    }

    async fn fetch_url(&self, url: &str) -> Result<JsonObject> {
        self.get_url(url).await
    }

    fn with_auth(&self, url: &str) -> String {
        self.auth.with_auth(url)
    }
}
