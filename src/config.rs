use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use url::Url;

use crate::aggregator::{OverfetchPolicy, DEFAULT_OVERFETCH_FACTOR};
use crate::cache::RefreshMode;
use crate::error::ConfigError;
use crate::hn_client::{ClientConfig, Feed, DEFAULT_BASE_URL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Port to start the web server on
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Number of top stories to display
    #[arg(long, env = "NUM_STORIES", default_value_t = 30)]
    pub num_stories: usize,

    /// How long an aggregated front page stays fresh
    #[arg(long, env = "CACHE_TTL_SECS", default_value_t = 6)]
    pub cache_ttl_secs: u64,

    /// on-demand: stale reads rebuild the cache; background: a timer does
    #[arg(long, env = "REFRESH_MODE", default_value = "background")]
    pub refresh_mode: RefreshMode,

    /// Period of the background refresher
    #[arg(long, env = "REFRESH_INTERVAL_SECS", default_value_t = 3)]
    pub refresh_interval_secs: u64,

    /// Ranking to follow (top, new, best, ask, show, job)
    #[arg(long, env = "FEED", default_value = "top")]
    pub feed: Feed,

    /// Base URL of the item API
    #[arg(long, env = "HN_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub api_base_url: String,

    /// Per-request timeout against the item API
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 15)]
    pub request_timeout_secs: u64,

    /// Ids requested per missing story
    #[arg(long, env = "OVERFETCH_FACTOR", default_value_t = DEFAULT_OVERFETCH_FACTOR)]
    pub overfetch_factor: f64,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Default log level; RUST_LOG takes precedence
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            num_stories: 30,
            cache_ttl_secs: 6,
            refresh_mode: RefreshMode::Background,
            refresh_interval_secs: 3,
            feed: Feed::Top,
            api_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 15,
            overfetch_factor: DEFAULT_OVERFETCH_FACTOR,
            log_format: LogFormat::Pretty,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_stories == 0 {
            return Err(ConfigError::NoStories);
        }
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::ZeroDuration("cache_ttl_secs"));
        }
        if self.refresh_mode == RefreshMode::Background && self.refresh_interval_secs == 0 {
            return Err(ConfigError::ZeroDuration("refresh_interval_secs"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroDuration("request_timeout_secs"));
        }
        if !self.overfetch_factor.is_finite() || self.overfetch_factor < 1.0 {
            return Err(ConfigError::InvalidOverfetch(self.overfetch_factor));
        }
        Url::parse(&self.api_base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.api_base_url.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn overfetch(&self) -> OverfetchPolicy {
        OverfetchPolicy::new(self.overfetch_factor)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_base_url.clone(),
            feed: self.feed,
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}
