//! Model gateway: a ranked list of completion backends.
//!
//! The first backend in the list handles every call. Which backends are in
//! the list, and in what order, is decided once from [`GatewayConfig`]:
//! Groq when a credential is present, then the canned mock when enabled.
//! An empty list answers with the "no backend configured" error.

mod groq;
mod mock;

pub use groq::GroqBackend;
pub use mock::MockBackend;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::error::BackendError;

/// A text-completion provider.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
  fn name(&self) -> &str;

  async fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}

pub struct Gateway {
  backends: Vec<Arc<dyn CompletionBackend>>,
}

impl Gateway {
  /// Backends in precedence order; index 0 wins.
  pub fn new(backends: Vec<Arc<dyn CompletionBackend>>) -> Self {
    Self { backends }
  }

  pub fn from_config(config: &GatewayConfig) -> Result<Self, BackendError> {
    let mut backends: Vec<Arc<dyn CompletionBackend>> = Vec::new();

    if let Some(key) = &config.groq_api_key {
      backends.push(Arc::new(GroqBackend::new(key.clone(), config)?));
    }
    if config.mock_mode {
      backends.push(Arc::new(MockBackend::new()));
    }

    Ok(Self::new(backends))
  }

  /// Name of the backend that will serve the next call.
  pub fn selected(&self) -> Option<&str> {
    self.backends.first().map(|b| b.name())
  }

  pub fn backend_names(&self) -> Vec<&str> {
    self.backends.iter().map(|b| b.name()).collect()
  }

  /// Raw model text on success; a JSON error string otherwise. Never fails.
  pub async fn send(&self, prompt: &str) -> String {
    let Some(backend) = self.backends.first() else {
      warn!("no completion backend configured");
      return BackendError::Unconfigured.to_error_json();
    };

    debug!(backend = backend.name(), prompt_chars = prompt.len(), "sending prompt");
    match backend.complete(prompt).await {
      Ok(text) => {
        debug!(backend = backend.name(), response_chars = text.len(), "completion received");
        text
      }
      Err(e) => {
        warn!(backend = backend.name(), kind = e.kind(), error = %e, "completion failed");
        e.to_error_json()
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};

  struct Fixed {
    name: &'static str,
    reply: Result<&'static str, ()>,
    calls: AtomicUsize,
  }

  impl Fixed {
    fn ok(name: &'static str, reply: &'static str) -> Arc<Self> {
      Arc::new(Self {
        name,
        reply: Ok(reply),
        calls: AtomicUsize::new(0),
      })
    }

    fn failing(name: &'static str) -> Arc<Self> {
      Arc::new(Self {
        name,
        reply: Err(()),
        calls: AtomicUsize::new(0),
      })
    }
  }

  #[async_trait]
  impl CompletionBackend for Fixed {
    fn name(&self) -> &str {
      self.name
    }

    async fn complete(&self, _prompt: &str) -> Result<String, BackendError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      match self.reply {
        Ok(text) => Ok(text.to_string()),
        Err(()) => Err(BackendError::Connect {
          backend: self.name.to_string(),
        }),
      }
    }
  }

  #[tokio::test]
  async fn first_backend_wins() {
    let first = Fixed::ok("first", "one");
    let second = Fixed::ok("second", "two");
    let gateway = Gateway::new(vec![first.clone() as Arc<dyn CompletionBackend>, second.clone()]);

    assert_eq!(gateway.send("p").await, "one");
    assert_eq!(first.calls.load(Ordering::SeqCst), 1);
    assert_eq!(second.calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn failure_is_returned_as_error_json_without_falling_through() {
    let first = Fixed::failing("cloud");
    let second = Fixed::ok("mock", "{}");
    let gateway = Gateway::new(vec![first as Arc<dyn CompletionBackend>, second.clone()]);

    let out = gateway.send("p").await;
    assert_eq!(out, r#"{"error":"Cannot connect to cloud API"}"#);
    assert_eq!(second.calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn empty_gateway_reports_unconfigured() {
    let gateway = Gateway::new(Vec::new());
    let out: serde_json::Value = serde_json::from_str(&gateway.send("p").await).unwrap();
    assert!(out["error"].as_str().unwrap().contains("No completion backend configured"));
    assert!(gateway.selected().is_none());
  }

  #[test]
  fn credential_outranks_mock_flag() {
    let config = GatewayConfig {
      groq_api_key: Some("gsk_test".to_string()),
      mock_mode: true,
      ..GatewayConfig::default()
    };
    let gateway = Gateway::from_config(&config).unwrap();
    assert_eq!(gateway.backend_names(), vec!["Groq", "mock"]);
    assert_eq!(gateway.selected(), Some("Groq"));
  }

  #[test]
  fn mock_flag_alone_selects_mock() {
    let config = GatewayConfig {
      mock_mode: true,
      ..GatewayConfig::default()
    };
    let gateway = Gateway::from_config(&config).unwrap();
    assert_eq!(gateway.selected(), Some("mock"));
  }

  #[test]
  fn nothing_configured_selects_nothing() {
    let gateway = Gateway::from_config(&GatewayConfig::default()).unwrap();
    assert!(gateway.backend_names().is_empty());
  }
}
