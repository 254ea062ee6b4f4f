//! Repo manifest acquisition: remote fetch first, local file as fallback.

use std::path::PathBuf;

use async_trait::async_trait;
use impact_engine::{EngineError, Manifest, ManifestSource};
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::ServerConfig;

pub const MANIFEST_FILE: &str = "repo_manifest.json";

pub struct RepoManifestSource {
  http: Client,
  remote_url: Option<String>,
  repo_base_url: Option<String>,
  local_path: PathBuf,
}

impl RepoManifestSource {
  pub fn from_config(config: &ServerConfig) -> Result<Self, EngineError> {
    let http = Client::builder().timeout(config.manifest_timeout).build()?;
    Ok(Self {
      http,
      remote_url: config.manifest_remote_url.clone(),
      repo_base_url: config.manifest_repo_base_url.clone(),
      local_path: config.manifest_local_path.clone(),
    })
  }

  /// Local file only.
  pub fn local(path: impl Into<PathBuf>) -> Self {
    Self {
      http: Client::new(),
      remote_url: None,
      repo_base_url: None,
      local_path: path.into(),
    }
  }

  async fn fetch_remote(&self, base: &str) -> Result<Manifest, EngineError> {
    let url = format!("{}/{}", base, MANIFEST_FILE);
    debug!(%url, "fetching remote manifest");
    let manifest: Manifest = self
      .http
      .get(&url)
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;

    Ok(match &self.repo_base_url {
      Some(prefix) => rewrite_paths(manifest, prefix),
      None => manifest,
    })
  }

  async fn read_local(&self) -> Result<Manifest, EngineError> {
    let bytes = tokio::fs::read(&self.local_path).await?;
    Ok(serde_json::from_slice(&bytes)?)
  }
}

#[async_trait]
impl ManifestSource for RepoManifestSource {
  async fn full_manifest(&self) -> Result<Manifest, EngineError> {
    if let Some(base) = &self.remote_url {
      match self.fetch_remote(base).await {
        Ok(manifest) => return Ok(manifest),
        Err(e) => warn!(
          error = %e,
          fallback = %self.local_path.display(),
          "remote manifest unavailable, using local copy"
        ),
      }
    }
    self.read_local().await
  }
}

/// Prefix every entry's `file_path` so it points into the hosted repo.
pub fn rewrite_paths(mut manifest: Manifest, prefix: &str) -> Manifest {
  let join = |path: &str| format!("{}/{}", prefix, path.trim_start_matches('/'));
  for c in &mut manifest.frontend {
    if !c.file_path.is_empty() {
      c.file_path = join(&c.file_path);
    }
  }
  for s in &mut manifest.backend {
    if !s.file_path.is_empty() {
      s.file_path = join(&s.file_path);
    }
  }
  manifest
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use std::time::Duration;
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn manifest_json() -> serde_json::Value {
    json!({
      "frontend": [{"component_name": "LoginPage", "file_path": "frontend/src/LoginPage.jsx", "csi": ["Security"]}],
      "backend": [{"service_name": "AuthService", "file_path": "/backend/auth.py", "csi": ["Security"]},
                  {"service_name": "Ledger", "csi": ["Payment"]}]
    })
  }

  fn source(remote: Option<String>, local: PathBuf) -> RepoManifestSource {
    let config = ServerConfig {
      manifest_remote_url: remote,
      manifest_repo_base_url: Some("https://example.com/bank/tree/main".to_string()),
      manifest_local_path: local,
      manifest_timeout: Duration::from_secs(2),
      ..ServerConfig::default()
    };
    RepoManifestSource::from_config(&config).unwrap()
  }

  #[test]
  fn rewrite_prefixes_non_empty_paths() {
    let m: Manifest = serde_json::from_value(manifest_json()).unwrap();
    let m = rewrite_paths(m, "https://example.com/r");
    assert_eq!(m.frontend[0].file_path, "https://example.com/r/frontend/src/LoginPage.jsx");
    assert_eq!(m.backend[0].file_path, "https://example.com/r/backend/auth.py");
    assert_eq!(m.backend[1].file_path, "");
  }

  #[tokio::test]
  async fn remote_manifest_is_fetched_and_rewritten() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/bank/main/repo_manifest.json"))
      .respond_with(ResponseTemplate::new(200).set_body_json(manifest_json()))
      .mount(&server)
      .await;

    let src = source(Some(format!("{}/bank/main", server.uri())), PathBuf::from("/nonexistent"));
    let m = src.full_manifest().await.unwrap();
    assert_eq!(
      m.frontend[0].file_path,
      "https://example.com/bank/tree/main/frontend/src/LoginPage.jsx"
    );
  }

  #[tokio::test]
  async fn remote_failure_falls_back_to_local_file_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(404))
      .mount(&server)
      .await;

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join(MANIFEST_FILE);
    std::fs::write(&local, manifest_json().to_string()).unwrap();

    let src = source(Some(server.uri()), local);
    let m = src.full_manifest().await.unwrap();
    assert_eq!(m.frontend[0].file_path, "frontend/src/LoginPage.jsx");
  }

  #[tokio::test]
  async fn inventory_filters_one_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join(MANIFEST_FILE);
    std::fs::write(&local, manifest_json().to_string()).unwrap();

    let inv = RepoManifestSource::local(local).inventory_for("payment").await.unwrap();
    assert!(inv.frontend.is_empty());
    assert_eq!(inv.backend[0].service_name, "Ledger");
  }

  #[tokio::test]
  async fn no_remote_and_no_file_is_an_error() {
    let src = RepoManifestSource::local("/definitely/missing/repo_manifest.json");
    assert!(matches!(src.full_manifest().await, Err(EngineError::Io(_))));
  }
}
