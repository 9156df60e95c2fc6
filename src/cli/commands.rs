//! CLI commands and argument parsing

use crate::entities::EntityKind;
use crate::types::Chamber;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Congress.gov API client CLI
#[derive(Parser, Debug)]
#[command(name = "congress")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API key (overrides the config file)
    #[arg(long, global = true, env = "CONGRESS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Client configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream entities of one kind
    Stream {
        /// Entity kind
        kind: EntityKind,

        /// Congress number
        #[arg(long)]
        congress: Option<u32>,

        /// First congress of a range (inclusive)
        #[arg(long, requires = "to")]
        from: Option<u32>,

        /// Last congress of a range (inclusive)
        #[arg(long, requires = "from")]
        to: Option<u32>,

        /// Chamber filter
        #[arg(long)]
        chamber: Option<Chamber>,

        /// Bill type (hr, s, hjres, ...)
        #[arg(long)]
        bill_type: Option<String>,

        /// Amendment type (hamdt, samdt, ...)
        #[arg(long)]
        amendment_type: Option<String>,

        /// Member state
        #[arg(long)]
        state: Option<String>,

        /// Fetch the detail record for every item
        #[arg(long)]
        hydrate: bool,

        /// Also fetch cosponsors when hydrating bills and amendments
        #[arg(long, requires = "hydrate")]
        cosponsors: bool,

        /// Stop after this many records
        #[arg(long)]
        max: Option<usize>,

        /// Abort on the first failed detail fetch instead of skipping it
        #[arg(long)]
        fail_fast: bool,
    },

    /// Fetch one API path and print the normalized body
    Get {
        /// Path relative to the base URL (e.g. `bill/118/hr/3076`)
        path: String,

        /// Extra query parameters as key=value
        #[arg(short, long = "param")]
        params: Vec<String>,
    },

    /// Print the effective configuration (API key hidden)
    Config,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one document per line)
    Json,
    /// Human-readable output
    Pretty,
}
