//! Concurrent resolution of a batch of ids into stories.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::hn_client::ItemSource;
use crate::models::{to_story, Item, ItemId, Story};

struct Tagged {
    idx: usize,
    item: Result<Item, FetchError>,
}

/// Fetches every id in parallel and returns the link stories among them in
/// input order. Failed fetches and non-stories are dropped, never reordered
/// around.
pub async fn resolve(source: Arc<dyn ItemSource>, ids: &[ItemId]) -> Vec<Story> {
    if ids.is_empty() {
        return Vec::new();
    }

    let (tx, mut rx) = mpsc::channel::<Tagged>(ids.len());
    for (idx, &id) in ids.iter().enumerate() {
        let source = Arc::clone(&source);
        let tx = tx.clone();
        tokio::spawn(async move {
            let item = source.fetch_item(id).await;
            // the receiver only goes away if the caller was dropped
            let _ = tx.send(Tagged { idx, item }).await;
        });
    }
    // collection ends once every task has reported or died
    drop(tx);

    let mut results = Vec::with_capacity(ids.len());
    while let Some(tagged) = rx.recv().await {
        results.push(tagged);
    }

    if results.len() < ids.len() {
        warn!(
            launched = ids.len(),
            reported = results.len(),
            "some item fetch tasks exited without reporting"
        );
    }

    results.sort_by_key(|tagged| tagged.idx);

    results
        .into_iter()
        .filter_map(|tagged| match tagged.item {
            Ok(item) => to_story(item),
            Err(err) => {
                debug!(error = %err, "dropping item");
                None
            }
        })
        .collect()
}
