//! Pagination types

use crate::decode::extract_items;
use crate::error::Result;
use crate::types::{JsonObject, JsonValue, QueryParams};
use futures::Stream;
use serde_json::Value;
use std::collections::HashSet;
use std::pin::Pin;

/// Lazy stream of items
pub type ItemStream<'a> = Pin<Box<dyn Stream<Item = Result<JsonValue>> + Send + 'a>>;

/// Where the next fetch goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// First request: a path plus query parameters
    First(QueryParams),
    /// Follow an absolute next link
    Url(String),
    /// No more pages
    Done,
}

impl NextPage {
    /// Check if pagination is complete
    pub fn is_done(&self) -> bool {
        matches!(self, NextPage::Done)
    }
}

/// One normalized page
#[derive(Debug, Clone)]
pub struct Page {
    /// Normalized response body
    pub body: JsonObject,
    /// Items of the collection block
    pub items: Vec<JsonValue>,
    /// Next link, when the body carries a non-empty one
    pub next: Option<String>,
}

impl Page {
    /// Split a body into items and the next link
    pub fn from_body(body: JsonObject, data_key: &str) -> Self {
        let items = extract_items(body.get(data_key));
        let next = next_link(&body);
        Self { body, items, next }
    }
}

/// `pagination.next`, ignoring absent or empty pagination blocks
fn next_link(body: &JsonObject) -> Option<String> {
    body.get("pagination")
        .and_then(Value::as_object)
        .filter(|pagination| !pagination.is_empty())
        .and_then(|pagination| pagination.get("next"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|next| !next.is_empty())
        .map(str::to_string)
}

/// Tracks a walk across pages
#[derive(Debug, Clone)]
pub struct PageState {
    /// Collection path for the first request
    pub path: String,
    /// Key of the collection block in each body
    pub data_key: String,
    /// Where the next fetch goes
    pub next: NextPage,
    /// Next links already followed
    pub seen_urls: HashSet<String>,
    /// Pages fetched so far
    pub pages: u64,
    /// Items yielded so far
    pub total_fetched: u64,
}

impl PageState {
    /// Create state for a fresh walk
    pub fn new(path: impl Into<String>, data_key: impl Into<String>, params: QueryParams) -> Self {
        Self {
            path: path.into(),
            data_key: data_key.into(),
            next: NextPage::First(params),
            seen_urls: HashSet::new(),
            pages: 0,
            total_fetched: 0,
        }
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.next = NextPage::Done;
    }

    /// Queue a next link; returns false if it was followed before
    pub fn follow(&mut self, url: String) -> bool {
        if self.seen_urls.insert(url.clone()) {
            self.next = NextPage::Url(url);
            true
        } else {
            self.mark_done();
            false
        }
    }
}
