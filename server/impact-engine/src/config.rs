//! Gateway configuration with sane defaults.

use std::time::Duration;

pub const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

/// Backend selection and request tuning for the model gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
  /// Cloud credential. Its presence alone selects the Groq backend.
  pub groq_api_key: Option<String>,
  /// OpenAI-compatible base URL (`/chat/completions` is appended).
  pub groq_api_url: String,
  pub groq_model: String,
  /// Kept low so repeated analyses of one story stay close to deterministic.
  pub temperature: f32,
  /// Response token ceiling.
  pub max_tokens: u32,
  /// Upper bound on one completion request.
  pub request_timeout: Duration,
  /// Serve canned responses instead of calling a model.
  pub mock_mode: bool,
}

impl Default for GatewayConfig {
  fn default() -> Self {
    Self {
      groq_api_key: None,
      groq_api_url: DEFAULT_GROQ_API_URL.to_string(),
      groq_model: DEFAULT_GROQ_MODEL.to_string(),
      temperature: 0.1,
      max_tokens: 8000,
      request_timeout: Duration::from_secs(300),
      mock_mode: false,
    }
  }
}

impl GatewayConfig {
  /// Build from a key lookup (normally `std::env::var`). Unparseable
  /// numbers fall back to the default for that field.
  pub fn from_lookup<F>(lookup: F) -> Self
  where
    F: Fn(&str) -> Option<String>,
  {
    let defaults = Self::default();
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    Self {
      groq_api_key: get("GROQ_API_KEY"),
      groq_api_url: get("GROQ_API_URL")
        .map(|u| u.trim_end_matches('/').to_string())
        .unwrap_or(defaults.groq_api_url),
      groq_model: get("GROQ_MODEL").unwrap_or(defaults.groq_model),
      temperature: get("LLM_TEMPERATURE")
        .and_then(|v| v.parse().ok())
        .unwrap_or(defaults.temperature),
      max_tokens: get("LLM_MAX_TOKENS")
        .and_then(|v| v.parse().ok())
        .unwrap_or(defaults.max_tokens),
      request_timeout: get("LLM_TIMEOUT_SECS")
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(defaults.request_timeout),
      mock_mode: get("MOCK_LLM")
        .or_else(|| get("MOCK_OLLAMA"))
        .map(|v| parse_flag(&v))
        .unwrap_or(defaults.mock_mode),
    }
  }

  pub fn from_env() -> Self {
    Self::from_lookup(|key| std::env::var(key).ok())
  }
}

/// `true`, `1`, `yes` (any case) are on; everything else is off.
pub fn parse_flag(value: &str) -> bool {
  matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}
