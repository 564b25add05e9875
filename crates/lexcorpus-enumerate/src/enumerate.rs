use futures::stream::{self, Stream, StreamExt};
use lexcorpus_checkpoint::combination_key;
use lexcorpus_model::DocType;
use page_turner::PageTurner;

use crate::error::Result;
use crate::listing::{ListingClient, ListingRequest};

/// Pure enumerator (C3): given doc types and years, yields canonical XML
/// item URLs. Split out from any fetching/parsing concern per the
/// REDESIGN FLAGS directive to keep enumeration side-effect-free beyond
/// the listing-page HTTP calls it must make to discover URLs at all.
///
/// `completed_combos` lets the orchestrator skip a (type, year) pair whose
/// combination checkpoint is already marked complete, without re-walking
/// its listing pages.
pub fn enumerate(
    client: ListingClient,
    doc_types: Vec<DocType>,
    years: Vec<i32>,
    limit: Option<usize>,
    completed_combos: Vec<String>,
) -> impl Stream<Item = Result<String>> {
    let combinations: Vec<(DocType, i32)> = doc_types
        .iter()
        .flat_map(|doc_type| years.iter().map(move |year| (doc_type.clone(), *year)))
        .filter(|(doc_type, year)| doc_type.is_active_in(*year))
        .filter(|(doc_type, year)| {
            let key = combination_key(doc_type.as_str(), *year);
            !completed_combos.iter().any(|c| c == &key)
        })
        .collect();

    stream::iter(combinations)
        .then(move |(doc_type, year)| {
            let client = client.clone();
            async move {
                tracing::debug!(doc_type = doc_type.as_str(), year, "enumerating combination");
                let items: Vec<Result<String>> = client
                    .clone()
                    .into_pages(ListingRequest::new(doc_type.as_str(), year))
                    .items()
                    .collect()
                    .await;
                stream::iter(items)
            }
        })
        .flatten()
        .scan(0usize, move |yielded, item| {
            let keep = limit.map_or(true, |limit| *yielded < limit);
            if keep && item.is_ok() {
                *yielded += 1;
            }
            futures::future::ready(if keep { Some(item) } else { None })
        })
}
