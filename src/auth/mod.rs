//! Authentication module
//!
//! The API authenticates with a key carried in the `api_key` query
//! parameter. [`ApiKeyAuth`] adds it to any URL on the API host, including
//! provider-supplied pagination links, and leaves links to other hosts
//! (document downloads, public pages) untouched.

mod api_key;

pub use api_key::{ApiKeyAuth, API_KEY_PARAM};
pub(crate) use api_key::redact;
