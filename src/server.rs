use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::{error, info};

use crate::cache::StoryCache;
use crate::error::UpstreamError;
use crate::render::render_page;

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<StoryCache>,
    pub num_stories: usize,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/stories", get(stories_json))
        .route("/health", get(health))
        .with_state(state)
}

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, UpstreamError> {
    let start = Instant::now();
    let stories = state.cache.get(state.num_stories).await.map_err(|err| {
        error!(error = %err, "failed to load stories for page");
        err
    })?;
    let elapsed = start.elapsed();
    info!(
        stories = stories.len(),
        elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
        "served front page"
    );
    Ok(Html(render_page(&stories, elapsed)))
}

async fn stories_json(State(state): State<AppState>) -> Result<impl IntoResponse, UpstreamError> {
    let stories = state.cache.get(state.num_stories).await.map_err(|err| {
        error!(error = %err, "failed to load stories for api");
        err
    })?;
    Ok(Json(stories))
}

async fn health() -> &'static str {
    "ok"
}
