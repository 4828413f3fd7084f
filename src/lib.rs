//! Top Hacker News stories, aggregated from the item API and cached in memory.

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod error;
pub mod fanout;
pub mod hn_client;
pub mod models;
pub mod render;
pub mod server;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregator::{Aggregator, OverfetchPolicy};
pub use cache::{CacheEntry, RefreshMode, StoryCache};
pub use error::{FetchError, UpstreamError};
pub use hn_client::{ClientConfig, Feed, HackerNewsClient, ItemSource};
pub use models::{to_story, Item, ItemId, ItemKind, Story};
