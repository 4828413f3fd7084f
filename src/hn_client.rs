use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use crate::error::{FetchError, UpstreamError};
use crate::models::{Item, ItemId};

pub const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0/";

/// Where stories come from: a ranking of ids plus per-id lookup.
#[async_trait]
pub trait ItemSource: Send + Sync {
    async fn ranked_ids(&self) -> Result<Vec<ItemId>, UpstreamError>;

    async fn fetch_item(&self, id: ItemId) -> Result<Item, FetchError>;
}

/// Which upstream ranking to follow. Mirrors the front page tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Feed {
    #[default]
    Top,
    New,
    Best,
    Ask,
    Show,
    Job,
}

impl Feed {
    fn endpoint(self) -> &'static str {
        match self {
            Feed::Top => "topstories.json",
            Feed::New => "newstories.json",
            Feed::Best => "beststories.json",
            Feed::Ask => "askstories.json",
            Feed::Show => "showstories.json",
            Feed::Job => "jobstories.json",
        }
    }
}

impl FromStr for Feed {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" | "hot" => Ok(Feed::Top),
            "new" => Ok(Feed::New),
            "best" => Ok(Feed::Best),
            "ask" => Ok(Feed::Ask),
            "show" => Ok(Feed::Show),
            "job" | "jobs" => Ok(Feed::Job),
            other => Err(format!("unknown feed {:?}", other)),
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feed::Top => "top",
            Feed::New => "new",
            Feed::Best => "best",
            Feed::Ask => "ask",
            Feed::Show => "show",
            Feed::Job => "job",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub feed: Feed,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            feed: Feed::Top,
            timeout: Duration::from_secs(15),
        }
    }
}

/// Client for the public Firebase JSON API.
#[derive(Debug, Clone)]
pub struct HackerNewsClient {
    client: Client,
    base_url: Url,
    feed: Feed,
}

impl HackerNewsClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("hacker_news_top/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        // join() drops the last path segment unless the base ends with a slash
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .with_context(|| format!("invalid api base url {}", config.base_url))?;

        Ok(Self {
            client,
            base_url,
            feed: config.feed,
        })
    }

    pub fn feed(&self) -> Feed {
        self.feed
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, url::ParseError> {
        self.base_url.join(path)
    }
}

#[async_trait]
impl ItemSource for HackerNewsClient {
    async fn ranked_ids(&self) -> Result<Vec<ItemId>, UpstreamError> {
        let url = self
            .endpoint(self.feed.endpoint())
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(UpstreamError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        let ids: Vec<ItemId> = response.json().await.map_err(UpstreamError::Decode)?;
        debug!(feed = %self.feed, count = ids.len(), "loaded ranked ids");
        Ok(ids)
    }

    async fn fetch_item(&self, id: ItemId) -> Result<Item, FetchError> {
        let url = self
            .endpoint(&format!("item/{}.json", id))
            .map_err(|e| FetchError::Other {
                id,
                reason: e.to_string(),
            })?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request { id, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { id, status });
        }

        // unknown ids come back as a literal `null`
        let item: Option<Item> = response
            .json()
            .await
            .map_err(|source| FetchError::Decode { id, source })?;

        item.ok_or(FetchError::Missing(id))
    }
}
