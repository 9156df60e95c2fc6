//! Detail resolution

use super::types::{EntityKind, EntityQuery};
use crate::error::Result;
use crate::types::JsonValue;
use async_trait::async_trait;
use serde::Serialize;

/// A resolved detail record
pub trait Detail: Serialize + Send + 'static {
    /// Raw detail payload, when the record keeps one.
    ///
    /// The hydrated-path predicate sees this; records without one are
    /// serialized instead.
    fn raw(&self) -> Option<&JsonValue> {
        None
    }

    /// The value a predicate is applied to
    fn probe(&self) -> JsonValue {
        match self.raw() {
            Some(raw) => raw.clone(),
            None => serde_json::to_value(self).unwrap_or_default(),
        }
    }
}

impl Detail for JsonValue {
    fn raw(&self) -> Option<&JsonValue> {
        Some(self)
    }
}

/// Turns a raw list item into a detail record
#[async_trait]
pub trait DetailResolver: Send + Sync {
    /// Record type produced
    type Detail: Detail;

    /// Resolve one item.
    ///
    /// `Ok(None)` means the item lacks the key fields needed for a detail
    /// fetch and is skipped.
    async fn resolve(
        &self,
        kind: EntityKind,
        item: &JsonValue,
        query: &EntityQuery,
    ) -> Result<Option<Self::Detail>>;
}
