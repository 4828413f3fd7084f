use reqwest::StatusCode;
use thiserror::Error;

use crate::models::ItemId;

/// The ranking list couldn't be loaded. This is the only failure that leaves
/// the aggregation layer.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("failed to load top stories: {0}")]
    Request(#[source] reqwest::Error),

    #[error("failed to load top stories: upstream returned {0}")]
    Status(StatusCode),

    #[error("failed to load top stories: malformed ranking: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("failed to load top stories: {0}")]
    Unavailable(String),
}

/// A single item couldn't be resolved. Absorbed by the fan-out.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("item {id}: request failed: {source}")]
    Request {
        id: ItemId,
        #[source]
        source: reqwest::Error,
    },

    #[error("item {id}: upstream returned {status}")]
    Status { id: ItemId, status: StatusCode },

    #[error("item {id}: malformed body: {source}")]
    Decode {
        id: ItemId,
        #[source]
        source: reqwest::Error,
    },

    #[error("item {0} does not exist")]
    Missing(ItemId),

    #[error("item {id}: {reason}")]
    Other { id: ItemId, reason: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("num_stories must be greater than zero")]
    NoStories,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("overfetch factor must be a finite number >= 1.0, got {0}")]
    InvalidOverfetch(f64),

    #[error("invalid api base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
