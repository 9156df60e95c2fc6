//! Pagination module
//!
//! The service pages collections with a `pagination.next` link in the
//! response body. The pager follows those links lazily, flattening every
//! page's collection block into one stream of items.
//!
//! # Overview
//!
//! - [`PageSource`] abstracts the fetching so the walk can run against any
//!   transport
//! - [`page`] builds the item stream
//! - [`Page`] is one normalized page: body, items, and the next link

mod pager;
mod types;

pub use pager::{page, PageSource};
pub use types::{ItemStream, NextPage, Page, PageState};
