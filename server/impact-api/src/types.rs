//! Request/response types for the HTTP layer.

use impact_engine::Story;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
  pub status: &'static str,
}

/// Client-facing error body. Only the message travels; raw model text and
/// snippets stay in the logs.
#[derive(Serialize)]
pub struct ErrorBody {
  pub detail: String,
}

#[derive(Serialize)]
pub struct AddStoryResponse {
  pub message: &'static str,
  pub story: Story,
}
