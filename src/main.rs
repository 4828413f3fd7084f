use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use hacker_news_top::{
    config::Config,
    server::{build_router, AppState},
    telemetry, Aggregator, HackerNewsClient, ItemSource, RefreshMode, StoryCache,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    telemetry::init(config.log_format, &config.log_level)?;
    config.validate().context("invalid configuration")?;

    let client = HackerNewsClient::new(config.client_config())?;
    info!(feed = %client.feed(), base_url = %config.api_base_url, "using item api");
    let source: Arc<dyn ItemSource> = Arc::new(client);

    let aggregator = Aggregator::new(source, config.overfetch());
    let cache = Arc::new(StoryCache::new(
        aggregator,
        config.cache_ttl(),
        config.refresh_mode,
        config.num_stories,
    ));

    let _refresher = match config.refresh_mode {
        RefreshMode::Background => Some(cache.spawn_refresher(config.refresh_interval())),
        RefreshMode::OnDemand => None,
    };

    let router = build_router(AppState {
        cache,
        num_stories: config.num_stories,
    });

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind listener on {bind_addr}"))?;
    info!(
        %bind_addr,
        num_stories = config.num_stories,
        refresh_mode = %config.refresh_mode,
        ttl_secs = config.cache_ttl_secs,
        "listening"
    );

    if let Err(error) = axum::serve(listener, router).await {
        warn!(error = %error, "server exited with error");
    }

    Ok(())
}
