//! # Congress.gov API client
//!
//! A typed, paginated, rate-limited client for the Congress.gov v3 API.
//!
//! ## Features
//!
//! - **Rate Gate**: Politeness interval plus an hourly token bucket sized under the provider allowance
//! - **Retries**: Full-jitter exponential backoff, `Retry-After` honoured on 429/5xx
//! - **Payload Normalization**: JSON first, XML fallback, one canonical object shape
//! - **Pagination**: Lazy walk of `pagination.next` links with cycle protection
//! - **Entity Streams**: Bills, amendments, members, committees, hearings and meetings,
//!   across congress ranges, optionally hydrated into typed records
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use congress_client::{ClientConfig, CongressClient, EntityKind, EntityQuery, StreamOptions};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> congress_client::Result<()> {
//!     let client = CongressClient::new(ClientConfig::new("MY_KEY"))?;
//!
//!     let query = EntityQuery::new().congress(118).bill_type("hr");
//!     let mut bills = client.stream_entities(EntityKind::Bill, &query, StreamOptions::new().hydrate(true))?;
//!     while let Some(bill) = bills.next().await {
//!         println!("{:?}", bill?);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       CongressClient                            │
//! │  get() / get_url()   page()   stream_items()   stream_entities()│
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │    Decode     │ Paginate  │  Entities   │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ API Key  │ Retry     │ JSON          │ Next link │ Path table  │
//! │ Redact   │ Backoff   │ XML fallback  │ Cycle stop│ Hydration   │
//! │          │ Rate Gate │ Root unwrap   │           │ Records     │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::too_many_lines)]
#![allow(missing_docs)] // TODO: document the error variants and record fields, then drop this

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client configuration
pub mod config;

/// API key handling and URL redaction
pub mod auth;

/// HTTP transport with retry and rate limiting
pub mod http;

/// Response decoders and payload normalization
pub mod decode;

/// Lazy pagination over `pagination.next` links
pub mod pagination;

/// The top-level API client
pub mod client;

/// Entity kinds, list walks and hydration
pub mod entities;

/// Typed detail records
pub mod models;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use auth::ApiKeyAuth;
pub use client::CongressClient;
pub use config::ClientConfig;
pub use decode::{Normalizer, PayloadDecoder};
pub use entities::{EntityKind, EntityQuery, EntityRecord, StreamOptions};
pub use models::{ModelResolver, Record};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
