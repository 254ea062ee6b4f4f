//! Analysis pipeline: story lookup -> inventory -> prompt -> gateway -> extract.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::extract;
use crate::gateway::Gateway;
use crate::inventory;
use crate::prompt;
use crate::sources::{ManifestSource, StoryRepository};
use crate::types::AnalysisResult;

/// Runs one analysis per call. Holds no mutable state, so a single instance
/// can serve concurrent requests.
pub struct Analyzer {
  stories: Arc<dyn StoryRepository>,
  manifest: Arc<dyn ManifestSource>,
  gateway: Gateway,
}

impl Analyzer {
  pub fn new(
    stories: Arc<dyn StoryRepository>,
    manifest: Arc<dyn ManifestSource>,
    gateway: Gateway,
  ) -> Self {
    Self {
      stories,
      manifest,
      gateway,
    }
  }

  pub fn gateway(&self) -> &Gateway {
    &self.gateway
  }

  /// Analyze one story. Always returns a result object; the first failing
  /// stage determines the error, and nothing is retried.
  pub async fn analyze(&self, story_number: &str) -> AnalysisResult {
    let started = Instant::now();

    let story = match self.stories.find(story_number).await {
      Ok(Some(story)) => story,
      Ok(None) => {
        info!(story = %story_number, "story not found");
        return AnalysisResult::story_not_found(story_number);
      }
      Err(e) => {
        warn!(story = %story_number, error = %e, "story lookup failed");
        return AnalysisResult::failure(format!("Failed to load stories: {}", e));
      }
    };

    // One manifest snapshot feeds both the filtered inventory and the full listing.
    let manifest = match self.manifest.full_manifest().await {
      Ok(m) => m,
      Err(e) => {
        warn!(story = %story_number, error = %e, "manifest load failed");
        return AnalysisResult::failure(format!("Failed to load repo manifest: {}", e));
      }
    };
    let inventory = inventory::filter(&manifest, &story.impacted_csi);

    let prompt = match prompt::build(&story, &inventory, &manifest) {
      Ok(p) => p,
      Err(e) => return AnalysisResult::failure(format!("Failed to build prompt: {}", e)),
    };

    let raw = self.gateway.send(&prompt).await;
    let result = extract::extract(&raw);

    match &result {
      AnalysisResult::Report(_) => info!(
        story = %story_number,
        csi = %story.impacted_csi,
        frontend = inventory.frontend.len(),
        backend = inventory.backend.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "analysis complete"
      ),
      AnalysisResult::Failure(f) => warn!(
        story = %story_number,
        error = %f.error,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "analysis failed"
      ),
    }
    result
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::{BackendError, EngineError};
  use crate::gateway::CompletionBackend;
  use crate::sources::{StaticManifest, StaticStories};
  use crate::types::{Manifest, Story};
  use async_trait::async_trait;
  use std::sync::Mutex;

  /// Records prompts and replies with a fixed string.
  struct Recording {
    reply: String,
    prompts: Mutex<Vec<String>>,
  }

  #[async_trait]
  impl CompletionBackend for Recording {
    fn name(&self) -> &str {
      "recording"
    }

    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
      self.prompts.lock().unwrap().push(prompt.to_string());
      Ok(self.reply.clone())
    }
  }

  struct BrokenManifest;

  #[async_trait]
  impl ManifestSource for BrokenManifest {
    async fn full_manifest(&self) -> Result<Manifest, EngineError> {
      Err(EngineError::unavailable("manifest offline"))
    }
  }

  fn story(number: &str, csi: &str) -> Story {
    Story {
      story_number: number.to_string(),
      story_type: "feature".to_string(),
      description: "d".to_string(),
      acceptance_criteria: "a".to_string(),
      impacted_csi: csi.to_string(),
      ..Story::default()
    }
  }

  fn build(reply: &str, manifest: Arc<dyn ManifestSource>) -> (Analyzer, Arc<Recording>) {
    let backend = Arc::new(Recording {
      reply: reply.to_string(),
      prompts: Mutex::new(Vec::new()),
    });
    let stories = StaticStories(vec![story("US-1", "Payment")]);
    let analyzer = Analyzer::new(Arc::new(stories), manifest, Gateway::new(vec![backend.clone() as Arc<dyn CompletionBackend>]));
    (analyzer, backend)
  }

  #[tokio::test]
  async fn missing_story_skips_gateway() {
    let (analyzer, backend) = build("{}", Arc::new(StaticManifest::default()));
    let result = analyzer.analyze("US-999").await;
    assert_eq!(result.error_message(), Some("Story US-999 not found"));
    assert!(backend.prompts.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn prompt_carries_story_csi_inventory() {
    let manifest: Manifest = serde_json::from_value(serde_json::json!({
      "frontend": [{"component_name": "PaymentForm", "csi": ["payment"]}],
      "backend": [{"service_name": "AuthService", "csi": ["Security"]}]
    }))
    .unwrap();
    let (analyzer, backend) = build("sure! {\"story_number\": \"US-1\"}", Arc::new(StaticManifest(manifest)));

    let result = analyzer.analyze("US-1").await;
    assert_eq!(result.report().unwrap()["story_number"], "US-1");

    let prompts = backend.prompts.lock().unwrap();
    let (_, payload) = prompts[0].split_once(prompt::USER_INPUT_MARKER).unwrap();
    let v: serde_json::Value = serde_json::from_str(payload).unwrap();
    assert_eq!(v["filtered_inventory_for_csi"]["frontend"][0]["component_name"], "PaymentForm");
    assert_eq!(v["filtered_inventory_for_csi"]["backend"].as_array().unwrap().len(), 0);
    assert_eq!(v["full_manifest"]["backend"].as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn malformed_output_is_reported_with_raw_text() {
    let (analyzer, _) = build("I could not decide.", Arc::new(StaticManifest::default()));
    let AnalysisResult::Failure(f) = analyzer.analyze("US-1").await else {
      panic!("expected failure");
    };
    assert_eq!(f.error, extract::NO_JSON_FOUND);
    assert_eq!(f.raw.as_deref(), Some("I could not decide."));
  }

  #[tokio::test]
  async fn manifest_failure_stops_before_gateway() {
    let (analyzer, backend) = build("{}", Arc::new(BrokenManifest));
    let result = analyzer.analyze("US-1").await;
    assert!(result.error_message().unwrap().contains("manifest offline"));
    assert!(backend.prompts.lock().unwrap().is_empty());
  }
}
