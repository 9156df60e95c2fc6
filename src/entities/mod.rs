//! Entity streaming module
//!
//! Composes pager walks across scope values (a range of congresses) and
//! optionally hydrates each list item into a detail record.
//!
//! # Overview
//!
//! - [`EntityKind`] names what to list and where its collection lives
//! - [`EntityQuery`] carries the scoping parameters
//! - [`StreamOptions`] selects the fast path or the hydrated path, an
//!   optional predicate, and the error policy for detail fetches
//! - [`DetailResolver`] turns one raw item into a detail record; the typed
//!   models ship one, callers may bring their own

mod resolver;
mod streamer;
mod types;

pub use resolver::{Detail, DetailResolver};
pub use streamer::{list_items, stream_entities, EntityStream};
pub use types::{EntityKind, EntityQuery, EntityRecord, ListRequest, Predicate, StreamOptions};
