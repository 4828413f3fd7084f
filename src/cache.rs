//! Time-bounded cache of the aggregated front page.
//!
//! One slot holds the latest [`CacheEntry`]. Reads take a short read lock and
//! clone an `Arc`; every aggregation, whether triggered by a request or by the
//! background refresher, runs under a single async mutex so a cache never has
//! two aggregations in flight. A new entry replaces the old one in a single
//! assignment, so readers see either the old list or the new one.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::aggregator::Aggregator;
use crate::error::UpstreamError;
use crate::models::Story;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshMode {
    /// A stale read blocks while the reader rebuilds the entry.
    OnDemand,
    /// A timer rebuilds the entry; stale reads are served as-is.
    #[default]
    Background,
}

impl FromStr for RefreshMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "on-demand" | "lazy" => Ok(RefreshMode::OnDemand),
            "background" => Ok(RefreshMode::Background),
            other => Err(format!("unknown refresh mode {:?}", other)),
        }
    }
}

impl fmt::Display for RefreshMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshMode::OnDemand => f.write_str("on-demand"),
            RefreshMode::Background => f.write_str("background"),
        }
    }
}

/// Cap for TTLs too large to add to the clock.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

fn expiry_after(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

#[derive(Debug)]
pub struct CacheEntry {
    /// Story count this entry was built for. `stories` is shorter only when
    /// the ranking ran out.
    pub want: usize,
    pub stories: Vec<Story>,
    pub expires_at: Instant,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    fn covers(&self, want: usize) -> bool {
        self.want >= want
    }

    fn first(&self, want: usize) -> Vec<Story> {
        self.stories.iter().take(want).cloned().collect()
    }
}

pub struct StoryCache {
    aggregator: Aggregator,
    ttl: Duration,
    mode: RefreshMode,
    default_want: usize,
    slot: RwLock<Option<Arc<CacheEntry>>>,
    fill: Mutex<()>,
}

impl StoryCache {
    pub fn new(aggregator: Aggregator, ttl: Duration, mode: RefreshMode, default_want: usize) -> Self {
        Self {
            aggregator,
            ttl,
            mode,
            default_want,
            slot: RwLock::new(None),
            fill: Mutex::new(()),
        }
    }

    pub fn mode(&self) -> RefreshMode {
        self.mode
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The installed entry, if any aggregation has succeeded yet.
    pub fn current(&self) -> Option<Arc<CacheEntry>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The first `want` stories of the front page.
    ///
    /// Fresh entries are served without touching upstream. In background mode
    /// a stale entry is served as well; only a cold cache makes the caller
    /// wait. Concurrent misses queue behind one aggregation and reuse its
    /// result.
    pub async fn get(&self, want: usize) -> Result<Vec<Story>, UpstreamError> {
        if let Some(entry) = self.usable(want) {
            return Ok(entry.first(want));
        }

        let _fill = self.fill.lock().await;
        if let Some(entry) = self.usable(want) {
            debug!(want, "entry filled while waiting");
            return Ok(entry.first(want));
        }

        debug!(want, mode = %self.mode, "cache miss");
        let entry = self.aggregate(want).await?;
        Ok(entry.first(want))
    }

    /// Rebuilds the entry unconditionally. On failure the previous entry
    /// stays in place.
    pub async fn refresh(&self) -> Result<(), UpstreamError> {
        let _fill = self.fill.lock().await;
        let want = self
            .current()
            .map_or(self.default_want, |entry| entry.want.max(self.default_want));
        self.aggregate(want).await.map(|_| ())
    }

    /// Refreshes now and then on every tick of `interval`, independent of
    /// request traffic. Errors are logged and retried on the next tick.
    pub fn spawn_refresher(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(
                interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
                "background refresher started"
            );
            loop {
                ticker.tick().await;
                match cache.refresh().await {
                    Ok(()) => debug!("background refresh complete"),
                    Err(err) => warn!(error = %err, "background refresh failed, keeping previous stories"),
                }
            }
        })
    }

    fn usable(&self, want: usize) -> Option<Arc<CacheEntry>> {
        let entry = self.current().filter(|entry| entry.covers(want))?;
        if entry.is_fresh(Instant::now()) {
            return Some(entry);
        }
        match self.mode {
            RefreshMode::Background => {
                debug!(want, "serving stale entry");
                Some(entry)
            }
            RefreshMode::OnDemand => None,
        }
    }

    // Callers must hold `fill`.
    async fn aggregate(&self, want: usize) -> Result<Arc<CacheEntry>, UpstreamError> {
        let started = Instant::now();
        let stories = self.aggregator.top_stories(want).await?;
        let entry = Arc::new(CacheEntry {
            want,
            stories,
            expires_at: expiry_after(Instant::now(), self.ttl),
        });
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&entry));
        info!(
            want,
            stories = entry.stories.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "installed fresh stories"
        );
        Ok(entry)
    }
}
