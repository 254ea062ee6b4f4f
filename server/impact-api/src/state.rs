//! Shared application state.

use std::sync::Arc;

use impact_engine::{Analyzer, Gateway, ManifestSource};

use crate::stories::FileStoryStore;

pub struct AppState {
  pub stories: Arc<FileStoryStore>,
  pub manifest: Arc<dyn ManifestSource>,
  pub analyzer: Analyzer,
}

impl AppState {
  /// Wire the analyzer to the same story store and manifest source the
  /// listing routes use.
  pub fn new(
    stories: Arc<FileStoryStore>,
    manifest: Arc<dyn ManifestSource>,
    gateway: Gateway,
  ) -> Self {
    let analyzer = Analyzer::new(stories.clone(), manifest.clone(), gateway);
    Self {
      stories,
      manifest,
      analyzer,
    }
  }
}
