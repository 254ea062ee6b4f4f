//! Read-only collaborators the analyzer pulls stories and the manifest from.

use async_trait::async_trait;

use crate::error::EngineError;
use crate::inventory;
use crate::types::{Inventory, Manifest, Story};

#[async_trait]
pub trait StoryRepository: Send + Sync {
  async fn find(&self, story_number: &str) -> Result<Option<Story>, EngineError>;
}

#[async_trait]
pub trait ManifestSource: Send + Sync {
  async fn full_manifest(&self) -> Result<Manifest, EngineError>;

  async fn inventory_for(&self, csi: &str) -> Result<Inventory, EngineError> {
    let manifest = self.full_manifest().await?;
    Ok(inventory::filter(&manifest, csi))
  }
}

/// Fixed in-memory story list.
#[derive(Debug, Clone, Default)]
pub struct StaticStories(pub Vec<Story>);

#[async_trait]
impl StoryRepository for StaticStories {
  async fn find(&self, story_number: &str) -> Result<Option<Story>, EngineError> {
    Ok(self.0.iter().find(|s| s.story_number == story_number).cloned())
  }
}

/// Fixed in-memory manifest.
#[derive(Debug, Clone, Default)]
pub struct StaticManifest(pub Manifest);

#[async_trait]
impl ManifestSource for StaticManifest {
  async fn full_manifest(&self) -> Result<Manifest, EngineError> {
    Ok(self.0.clone())
  }
}
