//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::client::CongressClient;
use crate::config::ClientConfig;
use crate::entities::{EntityKind, EntityQuery, StreamOptions};
use crate::error::{Error, Result};
use crate::models::ModelResolver;
use crate::types::{Chamber, QueryParams};
use futures::StreamExt;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::info;

/// Arguments of the `stream` command
struct StreamArgs {
    kind: EntityKind,
    query: EntityQuery,
    hydrate: bool,
    cosponsors: bool,
    max: Option<usize>,
    fail_fast: bool,
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Stream {
                kind,
                congress,
                from,
                to,
                chamber,
                bill_type,
                amendment_type,
                state,
                hydrate,
                cosponsors,
                max,
                fail_fast,
            } => {
                let args = StreamArgs {
                    kind: *kind,
                    query: build_query(
                        *congress,
                        from.zip(*to),
                        *chamber,
                        bill_type.clone(),
                        amendment_type.clone(),
                        state.clone(),
                    ),
                    hydrate: *hydrate,
                    cosponsors: *cosponsors,
                    max: *max,
                    fail_fast: *fail_fast,
                };
                self.stream(args).await
            }
            Commands::Get { path, params } => self.get(path, params).await,
            Commands::Config => self.show_config(),
        }
    }

    /// Load the config file (or defaults) and apply the key override
    fn load_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };
        if let Some(key) = &self.cli.api_key {
            config.api_key.clone_from(key);
        }
        config.validate()?;
        Ok(config)
    }

    fn client(&self) -> Result<CongressClient> {
        CongressClient::new(self.load_config()?)
    }

    async fn stream(&self, args: StreamArgs) -> Result<()> {
        let client = self.client()?;
        let start = Instant::now();
        let limit = args.max.unwrap_or(usize::MAX);

        let options = StreamOptions::new()
            .hydrate(args.hydrate)
            .continue_on_error(!args.fail_fast);
        let resolver = ModelResolver::new(&client).include_cosponsors(args.cosponsors);

        let mut records = client
            .stream_entities_with(args.kind, &args.query, options, resolver)?
            .take(limit);

        let mut count = 0usize;
        while let Some(record) = records.next().await {
            self.output(&record?);
            count += 1;
        }

        info!(
            kind = %args.kind,
            records = count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Stream complete"
        );
        Ok(())
    }

    async fn get(&self, path: &str, params: &[String]) -> Result<()> {
        let client = self.client()?;
        let query = parse_params(params)?;
        let body = client.get(path, &query).await?;
        self.output(&Value::Object(body));
        Ok(())
    }

    fn show_config(&self) -> Result<()> {
        let config = self.load_config()?;
        self.output(&json!({
            "base_url": config.base_url,
            "api_key": if config.api_key.is_empty() { "" } else { "***" },
            "timeout_secs": config.timeout_secs,
            "min_interval_secs": config.min_interval_secs,
            "max_attempts": config.max_attempts,
            "backoff_base_secs": config.backoff_base_secs,
            "backoff_cap_secs": config.backoff_cap_secs,
            "page_limit": config.page_limit,
            "requests_per_hour": config.requests_per_hour,
            "safety_margin": config.safety_margin,
            "exhaustion_sleep_secs": config.exhaustion_sleep_secs,
            "user_agent": config.user_agent,
        }));
        Ok(())
    }

    /// Print one document
    fn output<T: Serialize>(&self, doc: &T) {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(doc),
            OutputFormat::Pretty => serde_json::to_string_pretty(doc),
        };
        println!("{}", line.unwrap_or_default());
    }
}

fn build_query(
    congress: Option<u32>,
    range: Option<(u32, u32)>,
    chamber: Option<Chamber>,
    bill_type: Option<String>,
    amendment_type: Option<String>,
    state: Option<String>,
) -> EntityQuery {
    EntityQuery {
        congress,
        congress_range: range,
        chamber,
        bill_type,
        amendment_type,
        state,
        ..EntityQuery::default()
    }
}

/// Parse `key=value` pairs
fn parse_params(params: &[String]) -> Result<QueryParams> {
    params
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| Error::invalid_value("param", format!("expected key=value, got '{pair}'")))
        })
        .collect()
}
