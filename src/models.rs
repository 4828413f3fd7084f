use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

pub type ItemId = u64;

/// Upstream item type. Anything we don't know about is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemKind {
    Story,
    Comment,
    Poll,
    PollOpt,
    Job,
    Other(String),
}

impl From<String> for ItemKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "story" => ItemKind::Story,
            "comment" => ItemKind::Comment,
            "poll" => ItemKind::Poll,
            "pollopt" => ItemKind::PollOpt,
            "job" => ItemKind::Job,
            _ => ItemKind::Other(kind),
        }
    }
}

impl From<ItemKind> for String {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Story => "story".to_string(),
            ItemKind::Comment => "comment".to_string(),
            ItemKind::Poll => "poll".to_string(),
            ItemKind::PollOpt => "pollopt".to_string(),
            ItemKind::Job => "job".to_string(),
            ItemKind::Other(other) => other,
        }
    }
}

impl Default for ItemKind {
    fn default() -> Self {
        ItemKind::Other(String::new())
    }
}

/// Raw record as returned by `item/<id>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(rename = "type", default)]
    pub kind: ItemKind,
    #[serde(default)]
    pub by: Option<String>,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub descendants: Option<i64>,
    #[serde(default)]
    pub kids: Vec<ItemId>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub dead: bool,
}

impl Item {
    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }
}

/// A displayable link story: an item of kind story with a non-empty URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Story {
    #[serde(flatten)]
    pub item: Item,
    pub host: String,
}

impl Story {
    pub fn id(&self) -> ItemId {
        self.item.id
    }

    pub fn title(&self) -> &str {
        self.item.title.as_deref().unwrap_or_default()
    }

    pub fn url(&self) -> &str {
        self.item.url()
    }

    pub fn by(&self) -> &str {
        self.item.by.as_deref().unwrap_or_default()
    }

    pub fn score(&self) -> i64 {
        self.item.score.unwrap_or(0)
    }

    pub fn comments(&self) -> i64 {
        self.item.descendants.unwrap_or(0)
    }

    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        self.item
            .time
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }

    pub fn discussion_url(&self) -> String {
        format!("https://news.ycombinator.com/item?id={}", self.item.id)
    }
}

/// Classifies an item. Only link stories survive; an unparsable URL still
/// yields a story, just with an empty host.
pub fn to_story(item: Item) -> Option<Story> {
    if item.kind != ItemKind::Story || item.url().is_empty() {
        return None;
    }
    let host = host_of(item.url());
    Some(Story { item, host })
}

/// Hostname of `raw` without a leading `www.`, or empty if it doesn't parse.
pub fn host_of(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) => {
            let host = url.host_str().unwrap_or_default();
            host.strip_prefix("www.").unwrap_or(host).to_string()
        }
        Err(_) => String::new(),
    }
}

pub fn time_ago(posted_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - posted_at).num_seconds().max(0);
    let (value, unit) = match secs {
        0..=59 => return "just now".to_string(),
        60..=3599 => (secs / 60, "minute"),
        3600..=86_399 => (secs / 3600, "hour"),
        _ => (secs / 86_400, "day"),
    };
    if value == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", value, unit)
    }
}
