//! Payload normalizer module
//!
//! Supports: JSON (primary), XML (secondary, injected)
//!
//! # Overview
//!
//! Response bodies are turned into a JSON object regardless of the wire
//! format the service chose to send. JSON is always tried first; the
//! secondary decoder only runs when the body is not valid JSON. Collection
//! blocks are then flattened into plain item lists by [`Collection`].

mod decoders;
mod normalizer;
mod types;

pub use decoders::{JsonDecoder, XmlDecoder};
pub use normalizer::{extract_items, unwrap_root, Normalizer};
pub use types::{Collection, DecoderFormat, PayloadDecoder};
