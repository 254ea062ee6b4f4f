//! Change Impact API
//!
//! HTTP service over the impact engine: story intake and listing, the repo
//! manifest and its per-CSI inventory, and per-story impact analysis.
//! Bind to 127.0.0.1 by default (internal only).

pub mod config;
mod handlers;
pub mod logging;
pub mod manifest;
mod state;
pub mod stories;
mod types;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::{ConfigError, ServerConfig};
pub use manifest::RepoManifestSource;
pub use state::AppState;
pub use stories::{FileStoryStore, StoreError};

/// All routes, with permissive CORS for the dashboard.
pub fn router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/health", get(handlers::health))
    .route("/stories", get(handlers::list_stories))
    .route("/stories/add", post(handlers::add_story))
    .route("/repo/manifest", get(handlers::repo_manifest))
    .route("/repo/inventory/:csi", get(handlers::repo_inventory))
    .route("/impact/:story_number", get(handlers::impact))
    .route("/testing/:story_number", get(handlers::testing))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
    .with_state(state)
}
