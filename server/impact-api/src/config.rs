//! Server configuration, read from environment-style key/value lookups.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use impact_engine::config::parse_flag;
use impact_engine::GatewayConfig;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_STORIES_PATH: &str = "data/stories.json";
const DEFAULT_MANIFEST_LOCAL_PATH: &str = "mock_repo/repo_manifest.json";
const DEFAULT_MANIFEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid {field}: {value:?}")]
  Parse { field: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
  pub host: IpAddr,
  pub port: u16,
  /// JSON array of stories; re-read on every request.
  pub stories_path: PathBuf,
  /// Raw-content base URL; `<url>/repo_manifest.json` is fetched when set.
  pub manifest_remote_url: Option<String>,
  /// Prefix for `file_path` of remotely fetched entries.
  pub manifest_repo_base_url: Option<String>,
  pub manifest_local_path: PathBuf,
  pub manifest_timeout: Duration,
  pub log_level: String,
  pub log_json: bool,
  pub gateway: GatewayConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host: IpAddr::V4(Ipv4Addr::LOCALHOST),
      port: DEFAULT_PORT,
      stories_path: PathBuf::from(DEFAULT_STORIES_PATH),
      manifest_remote_url: None,
      manifest_repo_base_url: None,
      manifest_local_path: PathBuf::from(DEFAULT_MANIFEST_LOCAL_PATH),
      manifest_timeout: Duration::from_secs(DEFAULT_MANIFEST_TIMEOUT_SECS),
      log_level: DEFAULT_LOG_LEVEL.to_string(),
      log_json: false,
      gateway: GatewayConfig::default(),
    }
  }
}

impl ServerConfig {
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let defaults = Self::default();
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let host = match get("HOST") {
      Some(v) => v.parse().map_err(|_| ConfigError::Parse { field: "HOST", value: v })?,
      None => defaults.host,
    };
    let port = match get("PORT") {
      Some(v) => v.parse().map_err(|_| ConfigError::Parse { field: "PORT", value: v })?,
      None => defaults.port,
    };
    let manifest_timeout = match get("MANIFEST_TIMEOUT_SECS") {
      Some(v) => Duration::from_secs(v.parse().map_err(|_| ConfigError::Parse {
        field: "MANIFEST_TIMEOUT_SECS",
        value: v,
      })?),
      None => defaults.manifest_timeout,
    };

    Ok(Self {
      host,
      port,
      stories_path: get("STORIES_PATH").map(PathBuf::from).unwrap_or(defaults.stories_path),
      manifest_remote_url: get("MANIFEST_REMOTE_URL").map(|u| u.trim_end_matches('/').to_string()),
      manifest_repo_base_url: get("MANIFEST_REPO_BASE_URL").map(|u| u.trim_end_matches('/').to_string()),
      manifest_local_path: get("MANIFEST_LOCAL_PATH")
        .map(PathBuf::from)
        .unwrap_or(defaults.manifest_local_path),
      manifest_timeout,
      log_level: get("IMPACT_LOG_LEVEL").unwrap_or(defaults.log_level),
      log_json: get("IMPACT_LOG_JSON").map(|v| parse_flag(&v)).unwrap_or(false),
      gateway: GatewayConfig::from_lookup(&lookup),
    })
  }

  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  pub fn addr(&self) -> SocketAddr {
    SocketAddr::new(self.host, self.port)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn from_pairs(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
    let map: HashMap<&str, &str> = pairs.iter().copied().collect();
    ServerConfig::from_lookup(|key| map.get(key).map(|v| v.to_string()))
  }

  #[test]
  fn defaults_bind_localhost_8000() {
    let cfg = from_pairs(&[]).unwrap();
    assert_eq!(cfg.addr().to_string(), "127.0.0.1:8000");
    assert!(cfg.manifest_remote_url.is_none());
    assert_eq!(cfg.manifest_timeout, Duration::from_secs(10));
  }

  #[test]
  fn bad_port_is_an_error() {
    let err = from_pairs(&[("PORT", "eighty")]).unwrap_err();
    assert!(err.to_string().contains("PORT"));
  }

  #[test]
  fn gateway_settings_come_from_same_lookup() {
    let cfg = from_pairs(&[("GROQ_API_KEY", "gsk_1"), ("MOCK_LLM", "yes")]).unwrap();
    assert_eq!(cfg.gateway.groq_api_key.as_deref(), Some("gsk_1"));
    assert!(cfg.gateway.mock_mode);
  }

  #[test]
  fn manifest_urls_lose_trailing_slash() {
    let cfg = from_pairs(&[
      ("MANIFEST_REMOTE_URL", "https://raw.example.com/bank/main/"),
      ("MANIFEST_REPO_BASE_URL", "https://example.com/bank/tree/main/"),
    ])
    .unwrap();
    assert_eq!(cfg.manifest_remote_url.as_deref(), Some("https://raw.example.com/bank/main"));
    assert_eq!(cfg.manifest_repo_base_url.as_deref(), Some("https://example.com/bank/tree/main"));
  }
}
