//! Structured error types for the impact engine.

use serde_json::{json, Value};
use thiserror::Error;

/// Failures reading the story collection or the manifest.
#[derive(Debug, Error)]
pub enum EngineError {
  #[error("io: {0}")]
  Io(#[from] std::io::Error),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("http: {0}")]
  Http(#[from] reqwest::Error),

  #[error("unavailable: {0}")]
  Unavailable(String),
}

impl EngineError {
  pub fn unavailable(msg: impl Into<String>) -> Self {
    Self::Unavailable(msg.into())
  }
}

/// Completion backend failures. Never crosses the gateway boundary as an
/// `Err`; [`BackendError::to_error_json`] turns it into the returned text.
#[derive(Debug, Error)]
pub enum BackendError {
  #[error("No completion backend configured. Set GROQ_API_KEY or enable MOCK_LLM.")]
  Unconfigured,

  #[error("{backend} API returned status {status}")]
  Status {
    backend: String,
    status: u16,
    body: Value,
  },

  #[error("{backend} request timed out after {seconds} seconds")]
  Timeout { backend: String, seconds: u64 },

  #[error("Cannot connect to {backend} API")]
  Connect { backend: String },

  #[error("{backend} error: {message}")]
  Other { backend: String, message: String },
}

impl BackendError {
  pub fn other(backend: &str, message: impl Into<String>) -> Self {
    Self::Other {
      backend: backend.to_string(),
      message: message.into(),
    }
  }

  /// Short category name used in logs.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Unconfigured => "unconfigured",
      Self::Status { .. } => "status",
      Self::Timeout { .. } => "timeout",
      Self::Connect { .. } => "connect",
      Self::Other { .. } => "other",
    }
  }

  /// JSON error text handed back in place of model output.
  pub fn to_error_json(&self) -> String {
    let value = match self {
      Self::Status { status, body, .. } => json!({
        "error": self.to_string(),
        "status": status,
        "response": body,
      }),
      _ => json!({ "error": self.to_string() }),
    };
    value.to_string()
  }
}
