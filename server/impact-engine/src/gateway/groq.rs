//! Groq cloud backend (OpenAI-compatible chat completions).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::CompletionBackend;
use crate::config::GatewayConfig;
use crate::error::BackendError;

const NAME: &str = "Groq";

pub struct GroqBackend {
  http: Client,
  api_key: String,
  url: String,
  model: String,
  temperature: f32,
  max_tokens: u32,
  timeout: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  messages: [ChatMessage<'a>; 1],
  temperature: f32,
  max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
  role: &'static str,
  content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  #[serde(default)]
  message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
  #[serde(default)]
  content: Option<String>,
}

impl GroqBackend {
  pub fn new(api_key: String, config: &GatewayConfig) -> Result<Self, BackendError> {
    let http = Client::builder()
      .timeout(config.request_timeout)
      .build()
      .map_err(|e| BackendError::other(NAME, format!("failed to build HTTP client: {}", e)))?;

    Ok(Self {
      http,
      api_key,
      url: format!("{}/chat/completions", config.groq_api_url),
      model: config.groq_model.clone(),
      temperature: config.temperature,
      max_tokens: config.max_tokens,
      timeout: config.request_timeout,
    })
  }

  fn transport_error(&self, e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
      BackendError::Timeout {
        backend: NAME.to_string(),
        seconds: self.timeout.as_secs(),
      }
    } else if e.is_connect() {
      BackendError::Connect {
        backend: NAME.to_string(),
      }
    } else {
      BackendError::other(NAME, e.to_string())
    }
  }
}

#[async_trait]
impl CompletionBackend for GroqBackend {
  fn name(&self) -> &str {
    NAME
  }

  async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
    let request = ChatRequest {
      model: &self.model,
      messages: [ChatMessage {
        role: "user",
        content: prompt,
      }],
      temperature: self.temperature,
      max_tokens: self.max_tokens,
    };

    let response = self
      .http
      .post(&self.url)
      .bearer_auth(&self.api_key)
      .json(&request)
      .send()
      .await
      .map_err(|e| self.transport_error(e))?;

    let status = response.status();
    if !status.is_success() {
      let text = response.text().await.unwrap_or_default();
      let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
      return Err(BackendError::Status {
        backend: NAME.to_string(),
        status: status.as_u16(),
        body,
      });
    }

    let parsed: ChatResponse = response.json().await.map_err(|e| self.transport_error(e))?;
    let content = parsed
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message)
      .and_then(|m| m.content)
      .unwrap_or_default();

    debug!(model = %self.model, chars = content.len(), "groq completion");
    Ok(content)
  }
}
