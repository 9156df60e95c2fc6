//! HTTP transport module
//!
//! Executes single API calls with throttling, retry, and backoff.
//!
//! # Features
//!
//! - **Rate Gate**: politeness interval plus an hourly token bucket
//! - **Automatic Retries**: 429/5xx and connection faults retried up to a ceiling
//! - **Full-Jitter Backoff**: exponential window with uniform jitter
//! - **Retry-After**: numeric seconds or HTTP-date hints honoured

mod backoff;
mod client;
mod rate_limit;

pub use backoff::{parse_retry_after, parse_retry_after_at, Backoff};
pub use client::{HttpClient, HttpClientConfig, ACCEPT_HEADER};
pub use rate_limit::{GateOutcome, RateBudget, RateGate, RateGateConfig};
