//! Next-link pager

use super::types::{ItemStream, NextPage, Page, PageState};
use crate::error::{Error, Result};
use crate::types::{JsonObject, QueryParams};
use async_trait::async_trait;
use futures::{stream, TryStreamExt};
use tracing::{debug, warn};

/// Something that can fetch normalized pages
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the first page of a collection path
    async fn fetch_first(&self, path: &str, params: &QueryParams) -> Result<JsonObject>;

    /// Fetch an absolute URL, already authenticated
    async fn fetch_url(&self, url: &str) -> Result<JsonObject>;

    /// Add credentials to a next link
    fn with_auth(&self, url: &str) -> String;
}

/// Lazily walk a collection, yielding every item of every page in order.
///
/// Pages are fetched only as the stream is polled. The walk stops when a
/// page has no pagination block, an empty one, or no `next` link. A next
/// link that was already followed ends the walk with a warning. The first
/// error is yielded and ends the stream.
pub fn page<'a, S>(
    source: &'a S,
    path: &str,
    data_key: &str,
    params: QueryParams,
) -> ItemStream<'a>
where
    S: PageSource + ?Sized,
{
    let state = PageState::new(path, data_key, params);

    let pages = stream::try_unfold(state, move |mut state| async move {
        let body = match std::mem::replace(&mut state.next, NextPage::Done) {
            NextPage::First(params) => source.fetch_first(&state.path, &params).await?,
            NextPage::Url(url) => source.fetch_url(&url).await?,
            NextPage::Done => return Ok::<_, Error>(None),
        };

        let Page { items, next, .. } = Page::from_body(body, &state.data_key);
        state.pages += 1;
        state.total_fetched += items.len() as u64;

        debug!(
            path = %state.path,
            page = state.pages,
            items = items.len(),
            total = state.total_fetched,
            has_next = next.is_some(),
            "Fetched page"
        );

        if let Some(next) = next {
            let url = source.with_auth(&next);
            if !state.follow(url) {
                warn!(
                    path = %state.path,
                    page = state.pages,
                    "Pagination cycle detected, stopping"
                );
            }
        }

        Ok(Some((items, state)))
    });

    Box::pin(
        pages
            .map_ok(|items| stream::iter(items.into_iter().map(Ok)))
            .try_flatten(),
    )
}
