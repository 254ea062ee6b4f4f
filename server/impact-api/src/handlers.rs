//! HTTP handlers for the impact API.

use std::sync::Arc;

use axum::{
  extract::{rejection::JsonRejection, Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use impact_engine::{AnalysisResult, Story};
use tracing::{error, warn};

use crate::state::AppState;
use crate::types::{AddStoryResponse, ErrorBody, HealthResponse};

fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
  (
    status,
    Json(ErrorBody {
      detail: detail.into(),
    }),
  )
    .into_response()
}

pub async fn health() -> Json<HealthResponse> {
  Json(HealthResponse { status: "ok" })
}

pub async fn list_stories(State(state): State<Arc<AppState>>) -> Response {
  match state.stories.list().await {
    Ok(stories) => Json(stories).into_response(),
    Err(e) => {
      error!(path = %state.stories.path().display(), error = %e, "stories: read failed");
      error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load stories")
    }
  }
}

/// Unreadable bodies get the same `{detail}` 400 as validation failures.
pub async fn add_story(
  State(state): State<Arc<AppState>>,
  body: Result<Json<Story>, JsonRejection>,
) -> Response {
  let Json(story) = match body {
    Ok(body) => body,
    Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
  };
  match state.stories.add(story).await {
    Ok(story) => Json(AddStoryResponse {
      message: "Story added successfully",
      story,
    })
    .into_response(),
    Err(e) if e.is_client_error() => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    Err(e) => {
      error!(error = %e, "stories: write failed");
      error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save story")
    }
  }
}

pub async fn repo_manifest(State(state): State<Arc<AppState>>) -> Response {
  match state.manifest.full_manifest().await {
    Ok(manifest) => Json(manifest).into_response(),
    Err(e) => {
      error!(error = %e, "manifest: load failed");
      error_response(StatusCode::BAD_GATEWAY, "Repo manifest unavailable")
    }
  }
}

pub async fn repo_inventory(
  State(state): State<Arc<AppState>>,
  Path(csi): Path<String>,
) -> Response {
  match state.manifest.inventory_for(&csi).await {
    Ok(inventory) => Json(inventory).into_response(),
    Err(e) => {
      error!(%csi, error = %e, "manifest: load failed");
      error_response(StatusCode::BAD_GATEWAY, "Repo manifest unavailable")
    }
  }
}

/// Failures surface their message only; the full structure goes to the log.
fn failure_response(story_number: &str, result: &AnalysisResult) -> Option<Response> {
  let AnalysisResult::Failure(failure) = result else {
    return None;
  };
  warn!(
    story = %story_number,
    error = %failure.error,
    raw = ?failure.raw,
    json_snippet = ?failure.json_snippet,
    details = %serde_json::Value::Object(failure.details.clone()),
    "impact: analysis failed"
  );
  let status = if result.is_story_not_found(story_number) {
    StatusCode::NOT_FOUND
  } else {
    StatusCode::BAD_REQUEST
  };
  Some(error_response(status, failure.error.clone()))
}

pub async fn impact(
  State(state): State<Arc<AppState>>,
  Path(story_number): Path<String>,
) -> Response {
  let result = state.analyzer.analyze(&story_number).await;
  if let Some(response) = failure_response(&story_number, &result) {
    return response;
  }
  Json(result).into_response()
}

/// Only the `testing_and_validation` block of a fresh analysis.
pub async fn testing(
  State(state): State<Arc<AppState>>,
  Path(story_number): Path<String>,
) -> Response {
  let result = state.analyzer.analyze(&story_number).await;
  if let Some(response) = failure_response(&story_number, &result) {
    return response;
  }
  match result.report().and_then(|r| r.get("testing_and_validation")) {
    Some(block) => Json(block.clone()).into_response(),
    None => error_response(
      StatusCode::NOT_FOUND,
      format!("No testing_and_validation block for story {}", story_number),
    ),
  }
}
