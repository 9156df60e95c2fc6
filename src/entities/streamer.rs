//! Entity streamer

use super::resolver::{Detail, DetailResolver};
use super::types::{EntityKind, EntityQuery, EntityRecord, StreamOptions};
use crate::error::{Error, Result};
use crate::pagination::{page, ItemStream, PageSource};
use crate::types::JsonValue;
use futures::{future, stream, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, error};

/// Lazy stream of entity records
pub type EntityStream<'a, D> = Pin<Box<dyn Stream<Item = Result<EntityRecord<D>>> + Send + 'a>>;

/// Raw items for a kind, chaining one walk per congress in scope.
///
/// Congress-scoped kinds without a congress or range fail with a
/// configuration error before anything is fetched.
pub fn list_items<'a, S>(
    source: &'a S,
    kind: EntityKind,
    query: &EntityQuery,
) -> Result<ItemStream<'a>>
where
    S: PageSource + ?Sized,
{
    if !kind.is_congress_scoped() {
        let request = kind.list_request(query.congress, query);
        return Ok(page(source, &request.path, kind.data_key(), request.params));
    }

    let congresses = query.congresses();
    if congresses.is_empty() {
        return Err(Error::config(format!(
            "Provide congress or congress_range for entity '{kind}'"
        )));
    }

    let requests: Vec<_> = congresses
        .into_iter()
        .map(|congress| kind.list_request(Some(congress), query))
        .collect();

    let walks = stream::iter(requests)
        .flat_map(move |request| page(source, &request.path, kind.data_key(), request.params));

    Ok(Box::pin(stop_after_error(walks)))
}

/// Stream entities of one kind.
///
/// Without hydration the predicate sees each raw item and matching items
/// are yielded as [`EntityRecord::Item`]. With hydration every item goes
/// through `resolver`; items it cannot key are skipped, transport failures
/// are skipped when `continue_on_error` is set, and the predicate sees the
/// record's [`Detail::probe`].
pub fn stream_entities<'a, S, R>(
    source: &'a S,
    kind: EntityKind,
    query: &EntityQuery,
    options: StreamOptions,
    resolver: R,
) -> Result<EntityStream<'a, R::Detail>>
where
    S: PageSource + ?Sized,
    R: DetailResolver + 'a,
{
    let items = list_items(source, kind, query)?;

    if !options.hydrate {
        let filtered = items.filter_map(move |item| {
            let record = match item {
                Ok(item) if options.accepts(&item) => Some(Ok(EntityRecord::Item(item))),
                Ok(_) => None,
                Err(e) => Some(Err(e)),
            };
            future::ready(record)
        });
        return Ok(Box::pin(filtered));
    }

    let resolver = Arc::new(resolver);
    let query = Arc::new(query.clone());
    let options = Arc::new(options);

    let hydrated = items
        .then(move |item| {
            let resolver = Arc::clone(&resolver);
            let query = Arc::clone(&query);
            let options = Arc::clone(&options);
            async move {
                let item = match item {
                    Ok(item) => item,
                    Err(e) => return Some(Err(e)),
                };
                hydrate_one(resolver.as_ref(), kind, &item, &query, &options).await
            }
        })
        .filter_map(future::ready);

    Ok(Box::pin(stop_after_error(hydrated)))
}

async fn hydrate_one<R>(
    resolver: &R,
    kind: EntityKind,
    item: &JsonValue,
    query: &EntityQuery,
    options: &StreamOptions,
) -> Option<Result<EntityRecord<R::Detail>>>
where
    R: DetailResolver,
{
    match resolver.resolve(kind, item, query).await {
        Ok(Some(detail)) => {
            if options.predicate.is_some() && !options.accepts(&detail.probe()) {
                return None;
            }
            Some(Ok(EntityRecord::Detail(detail)))
        }
        Ok(None) => {
            debug!(kind = %kind, "Item lacks detail keys, skipping");
            None
        }
        Err(e) if options.continue_on_error && e.is_transport() => {
            error!(kind = %kind, error = %e, "Failed to hydrate item, skipping");
            None
        }
        Err(e) => Some(Err(e)),
    }
}

/// Yield the first error, then end the stream without polling further
fn stop_after_error<'a, T, St>(stream: St) -> impl Stream<Item = Result<T>> + Send + 'a
where
    St: Stream<Item = Result<T>> + Send + 'a,
    T: Send + 'a,
{
    stream::unfold(Some(Box::pin(stream)), |state| async move {
        let mut inner = state?;
        let item = inner.next().await?;
        let rest = if item.is_err() { None } else { Some(inner) };
        Some((item, rest))
    })
}
