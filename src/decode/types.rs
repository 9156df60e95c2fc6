//! Decoder types and traits
//!
//! Defines the core decoder abstractions and the collection shapes the
//! service uses for lists of items.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Format of the response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderFormat {
    /// JSON format (default)
    #[default]
    Json,
    /// XML format
    Xml,
}

impl DecoderFormat {
    /// Upper-case label used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Xml => "XML",
        }
    }
}

impl std::fmt::Display for DecoderFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Trait for decoding a response body into a JSON value
pub trait PayloadDecoder: Send + Sync {
    /// Wire format this decoder understands
    fn format(&self) -> DecoderFormat;

    /// Decode the full body
    fn decode(&self, body: &str) -> Result<Value>;
}

/// The shapes a collection block takes on the wire.
///
/// A list is sometimes sent bare, sometimes wrapped under `item` or
/// `items`, and a wrapper holding exactly one item carries the item itself
/// rather than a one-element list.
#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    /// Absent, null, or an unrecognized shape
    Empty,
    /// A list of items, bare or wrapped
    List(Vec<Value>),
    /// A wrapper holding a single item
    SingleWrapped(Value),
}

impl Collection {
    /// Classify a collection block.
    ///
    /// The `item` wrapper is checked before `items`.
    pub fn from_block(block: Option<&Value>) -> Self {
        match block {
            Some(Value::Array(items)) => Self::List(items.clone()),
            Some(Value::Object(map)) => {
                for key in ["item", "items"] {
                    match map.get(key) {
                        Some(Value::Array(items)) => return Self::List(items.clone()),
                        Some(single @ Value::Object(_)) => {
                            return Self::SingleWrapped(single.clone())
                        }
                        _ => {}
                    }
                }
                Self::Empty
            }
            _ => Self::Empty,
        }
    }

    /// Number of items in the collection
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::List(items) => items.len(),
            Self::SingleWrapped(_) => 1,
        }
    }

    /// Whether the collection holds no items
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into a plain list
    pub fn into_items(self) -> Vec<Value> {
        match self {
            Self::Empty => Vec::new(),
            Self::List(items) => items,
            Self::SingleWrapped(item) => vec![item],
        }
    }
}
