//! Axum HTTP server for vidseed.
//!
//! Thin glue over the pipeline: upload/delete/list/info/rss handlers, the
//! cookie password gate, and static serving of the generated artifacts. No
//! pipeline logic lives here.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod rss;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
