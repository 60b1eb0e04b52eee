//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::response::Redirect;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::login;
use crate::handlers::health;
use crate::handlers::videos::{delete_video, info, list_videos, rss_feed, upload, upload_url};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let video_root = state.pipeline.config().video_root.clone();
    let www_root = state.pipeline.config().www_root.clone();
    let max_body_size = state.config.max_body_size;

    let api_routes = Router::new()
        .route("/login", post(login))
        .route("/upload", post(upload))
        .route("/upload_url", post(upload_url))
        .route("/videos", get(list_videos))
        .route("/videos/:title", delete(delete_video))
        .route("/info", get(info))
        .route("/rss", get(rss_feed))
        .route("/health", get(health));

    Router::new()
        .route("/", get(|| async { Redirect::temporary("/www/") }))
        .merge(api_routes)
        // Generated artifacts: /v/<slug>/{video.json, <height>.mp4, ...} with
        // the player shell as the directory index.
        .nest_service("/v", ServeDir::new(video_root))
        .nest_service("/www", ServeDir::new(www_root))
        // Uploads are whole video files; raise axum's default extractor limit
        // and cap at the configured bound.
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
