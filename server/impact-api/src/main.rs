//! Binary entrypoint for the impact API.

use std::sync::Arc;

use impact_api::{logging, AppState, FileStoryStore, RepoManifestSource, ServerConfig};
use impact_engine::Gateway;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  let config = ServerConfig::from_env()?;
  logging::init(&config.log_level, config.log_json);

  let gateway = Gateway::from_config(&config.gateway)?;
  match gateway.selected() {
    Some(name) => info!(backend = name, "completion backend selected"),
    None => info!("no completion backend configured; analyses will return an error"),
  }

  let stories = Arc::new(FileStoryStore::new(&config.stories_path));
  let manifest = Arc::new(RepoManifestSource::from_config(&config)?);
  let state = Arc::new(AppState::new(stories, manifest, gateway));

  let app = impact_api::router(state);

  let addr = config.addr();
  let listener = tokio::net::TcpListener::bind(addr).await?;
  info!(%addr, "impact-api listening");

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  Ok(())
}

async fn shutdown_signal() {
  if tokio::signal::ctrl_c().await.is_ok() {
    info!("shutdown requested");
  }
}
