//! Recover one JSON object from free-form model output.
//!
//! Slices from the first `{` to the last `}` and parses that. Prose or
//! markdown fences around a single object are discarded. Output holding
//! several objects, or stray braces in the surrounding prose, will not
//! parse; that is accepted and reported as a parse failure.

use serde_json::{Map, Value};

use crate::types::{AnalysisFailure, AnalysisResult};

pub const NO_JSON_FOUND: &str = "No JSON object found in model output";
pub const PARSE_FAILED: &str = "Failed to parse JSON from model output";

pub fn extract(text: &str) -> AnalysisResult {
  let (start, end) = match (text.find('{'), text.rfind('}')) {
    (Some(s), Some(e)) => (s, e),
    _ => return AnalysisResult::Failure(AnalysisFailure::new(NO_JSON_FOUND).with_raw(text)),
  };

  // A `}` before the first `{` leaves nothing to parse.
  let snippet = if end >= start { &text[start..=end] } else { "" };

  match serde_json::from_str::<Map<String, Value>>(snippet) {
    Ok(object) => AnalysisResult::from_object(object),
    Err(_) => AnalysisResult::Failure(
      AnalysisFailure::new(PARSE_FAILED)
        .with_raw(text)
        .with_snippet(snippet),
    ),
  }
}
