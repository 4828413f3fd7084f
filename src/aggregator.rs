use std::sync::Arc;

use tracing::{debug, info};

use crate::error::UpstreamError;
use crate::fanout;
use crate::hn_client::ItemSource;
use crate::models::{ItemId, Story};

pub const DEFAULT_OVERFETCH_FACTOR: f64 = 1.25;

/// How many ids to request for a given number of still-missing stories.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverfetchPolicy {
    factor: f64,
}

impl OverfetchPolicy {
    /// Factors below 1.0 (or NaN) would undershoot and are clamped to 1.0.
    pub fn new(factor: f64) -> Self {
        let factor = if factor.is_finite() && factor >= 1.0 {
            factor
        } else {
            1.0
        };
        Self { factor }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Never smaller than `remaining`, never zero.
    pub fn batch_size(&self, remaining: usize) -> usize {
        let scaled = (remaining as f64 * self.factor).ceil() as usize;
        scaled.max(remaining).max(1)
    }
}

impl Default for OverfetchPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_OVERFETCH_FACTOR)
    }
}

#[derive(Clone)]
pub struct Aggregator {
    source: Arc<dyn ItemSource>,
    policy: OverfetchPolicy,
}

impl Aggregator {
    pub fn new(source: Arc<dyn ItemSource>, policy: OverfetchPolicy) -> Self {
        Self { source, policy }
    }

    pub fn policy(&self) -> OverfetchPolicy {
        self.policy
    }

    /// Loads the current ranking and resolves the first `want` stories from it.
    pub async fn top_stories(&self, want: usize) -> Result<Vec<Story>, UpstreamError> {
        let ids = self.source.ranked_ids().await?;
        Ok(self.collect(&ids, want).await)
    }

    /// Walks `ids` in batches until `want` stories are found or the ids run
    /// out. A short result means the ranking didn't hold enough stories.
    pub async fn collect(&self, ids: &[ItemId], want: usize) -> Vec<Story> {
        let mut stories: Vec<Story> = Vec::with_capacity(want);
        let mut at = 0;
        let mut batches = 0;

        while stories.len() < want && at < ids.len() {
            let remaining = want - stories.len();
            let need = self.policy.batch_size(remaining).min(ids.len() - at);
            let batch = &ids[at..at + need];
            at += need;
            batches += 1;

            let resolved = fanout::resolve(Arc::clone(&self.source), batch).await;
            debug!(
                batch = batches,
                requested = need,
                resolved = resolved.len(),
                remaining,
                "fetched batch"
            );
            stories.extend(resolved);
        }

        stories.truncate(want);
        info!(
            want,
            got = stories.len(),
            batches,
            scanned = at,
            "collected stories"
        );
        stories
    }
}
