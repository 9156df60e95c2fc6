//! Body normalization
//!
//! Turns a raw response body into a JSON object and flattens collection
//! blocks into item lists.

use super::decoders::XmlDecoder;
use super::types::{Collection, DecoderFormat, PayloadDecoder};
use crate::error::{Error, Result};
use crate::types::JsonObject;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Document-level wrapper keys removed by [`unwrap_root`]
const ROOT_KEYS: [&str; 2] = ["root", "api-root"];

/// Parses bodies as JSON first, then with the secondary decoder
#[derive(Clone)]
pub struct Normalizer {
    secondary: Option<Arc<dyn PayloadDecoder>>,
}

impl Normalizer {
    /// Create a normalizer with an optional secondary decoder
    pub fn new(secondary: Option<Arc<dyn PayloadDecoder>>) -> Self {
        Self { secondary }
    }

    /// A normalizer that only understands JSON
    pub fn json_only() -> Self {
        Self { secondary: None }
    }

    /// Format of the secondary decoder, if one is configured
    pub fn secondary_format(&self) -> Option<DecoderFormat> {
        self.secondary.as_ref().map(|d| d.format())
    }

    /// Parse a body into a JSON object.
    ///
    /// A single top-level `root` wrapper holding an object is removed. Bodies
    /// that are not JSON fail with [`Error::MissingDecoder`] when no
    /// secondary decoder is configured.
    pub fn parse(&self, body: &str) -> Result<JsonObject> {
        let value = match serde_json::from_str::<Value>(body) {
            Ok(value) => value,
            Err(json_err) => {
                let Some(decoder) = &self.secondary else {
                    return Err(Error::missing_decoder(DecoderFormat::Xml.label()));
                };
                debug!(
                    error = %json_err,
                    format = %decoder.format(),
                    "Body is not JSON, using secondary decoder"
                );
                decoder.decode(body)?
            }
        };

        match unwrap_root(value) {
            Value::Object(map) => Ok(map),
            other => Err(Error::decode(format!(
                "Expected an object at the top level, found {}",
                value_kind(&other)
            ))),
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Some(Arc::new(XmlDecoder::new())))
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("secondary", &self.secondary_format())
            .finish()
    }
}

/// Remove a document-level wrapper.
///
/// Applies only when the value is an object whose single key is `root`
/// (or the service's `api-root`) and that key holds an object.
pub fn unwrap_root(value: Value) -> Value {
    match value {
        Value::Object(map) if is_root_wrapper(&map) => map
            .into_iter()
            .next()
            .map(|(_, inner)| inner)
            .unwrap_or(Value::Null),
        other => other,
    }
}

fn is_root_wrapper(map: &JsonObject) -> bool {
    map.len() == 1
        && map
            .iter()
            .all(|(key, value)| ROOT_KEYS.contains(&key.as_str()) && value.is_object())
}

/// Flatten a collection block into a plain list of items
pub fn extract_items(block: Option<&Value>) -> Vec<Value> {
    Collection::from_block(block).into_items()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
