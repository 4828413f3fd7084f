use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{FetchError, UpstreamError};
use crate::hn_client::ItemSource;
use crate::models::{Item, ItemId, ItemKind};

pub(crate) fn item(id: ItemId, kind: &str, url: &str) -> Item {
    Item {
        id,
        kind: ItemKind::from(kind.to_string()),
        by: Some("pg".to_string()),
        time: Some(1_700_000_000),
        title: Some(format!("item {}", id)),
        url: if url.is_empty() {
            None
        } else {
            Some(url.to_string())
        },
        text: None,
        score: Some(10),
        descendants: Some(2),
        kids: Vec::new(),
        deleted: false,
        dead: false,
    }
}

#[derive(Clone, Copy)]
enum Behavior {
    Story,
    Comment,
    LinklessStory,
    Fail,
    Panic,
}

/// In-memory ranking with per-id behavior and call counters.
pub(crate) struct FakeSource {
    ranking: Vec<ItemId>,
    items: HashMap<ItemId, Behavior>,
    ranking_down: AtomicBool,
    ranking_delay: Duration,
    latency_by_id: bool,
    ranking_calls: AtomicUsize,
    item_calls: AtomicUsize,
}

impl FakeSource {
    pub(crate) fn new(ranking: Vec<ItemId>) -> Self {
        Self {
            ranking,
            items: HashMap::new(),
            ranking_down: AtomicBool::new(false),
            ranking_delay: Duration::ZERO,
            latency_by_id: false,
            ranking_calls: AtomicUsize::new(0),
            item_calls: AtomicUsize::new(0),
        }
    }

    fn set(mut self, ids: impl IntoIterator<Item = ItemId>, behavior: Behavior) -> Self {
        for id in ids {
            self.items.insert(id, behavior);
        }
        self
    }

    pub(crate) fn with_stories(self, ids: impl IntoIterator<Item = ItemId>) -> Self {
        self.set(ids, Behavior::Story)
    }

    pub(crate) fn with_comments(self, ids: impl IntoIterator<Item = ItemId>) -> Self {
        self.set(ids, Behavior::Comment)
    }

    pub(crate) fn with_linkless_stories(self, ids: impl IntoIterator<Item = ItemId>) -> Self {
        self.set(ids, Behavior::LinklessStory)
    }

    pub(crate) fn failing(self, id: ItemId) -> Self {
        self.set([id], Behavior::Fail)
    }

    pub(crate) fn panicking(self, id: ItemId) -> Self {
        self.set([id], Behavior::Panic)
    }

    pub(crate) fn ranking_down(self) -> Self {
        self.ranking_down.store(true, Ordering::SeqCst);
        self
    }

    /// Scrambles completion order so ordering bugs show up.
    pub(crate) fn with_latency_by_id(mut self) -> Self {
        self.latency_by_id = true;
        self
    }

    pub(crate) fn with_ranking_delay(mut self, delay: Duration) -> Self {
        self.ranking_delay = delay;
        self
    }

    pub(crate) fn set_ranking_down(&self, down: bool) {
        self.ranking_down.store(down, Ordering::SeqCst);
    }

    pub(crate) fn ranking_calls(&self) -> usize {
        self.ranking_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn item_calls(&self) -> usize {
        self.item_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItemSource for FakeSource {
    async fn ranked_ids(&self) -> Result<Vec<ItemId>, UpstreamError> {
        self.ranking_calls.fetch_add(1, Ordering::SeqCst);
        if !self.ranking_delay.is_zero() {
            tokio::time::sleep(self.ranking_delay).await;
        }
        if self.ranking_down.load(Ordering::SeqCst) {
            return Err(UpstreamError::Unavailable("ranking is down".to_string()));
        }
        Ok(self.ranking.clone())
    }

    async fn fetch_item(&self, id: ItemId) -> Result<Item, FetchError> {
        self.item_calls.fetch_add(1, Ordering::SeqCst);
        if self.latency_by_id {
            tokio::time::sleep(Duration::from_millis(id * 7 % 13)).await;
        }
        let url = format!("https://www.example.com/{}", id);
        match self.items.get(&id) {
            Some(Behavior::Story) => Ok(item(id, "story", &url)),
            Some(Behavior::Comment) => Ok(item(id, "comment", "")),
            Some(Behavior::LinklessStory) => Ok(item(id, "story", "")),
            Some(Behavior::Fail) => Err(FetchError::Other {
                id,
                reason: "connection reset".to_string(),
            }),
            Some(Behavior::Panic) => panic!("fetch task for {} blew up", id),
            None => Err(FetchError::Missing(id)),
        }
    }
}
