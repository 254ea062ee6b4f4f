//! Flat-file story collection.
//!
//! Reads go straight to disk on every call. Appends hold a lock across the
//! whole read, uniqueness check, append and write so concurrent intakes
//! cannot lose each other's stories. The file is replaced by rename, never
//! rewritten in place, so unlocked readers always parse a complete file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use impact_engine::{EngineError, Story, StoryRepository};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

/// Canonical CSI spellings accepted by intake.
pub const CSI_TAGS: [&str; 3] = ["Security", "Payment", "User Management"];

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("{field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("Story {0} already exists")]
  Duplicate(String),

  #[error("io: {0}")]
  Io(#[from] std::io::Error),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}

impl StoreError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  /// Caller mistakes as opposed to storage failures.
  pub fn is_client_error(&self) -> bool {
    matches!(self, Self::Validation { .. } | Self::Duplicate(_))
  }
}

pub struct FileStoryStore {
  path: PathBuf,
  write_lock: Mutex<()>,
}

impl FileStoryStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      write_lock: Mutex::new(()),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Every story, in file order. A missing file is an empty collection.
  pub async fn list(&self) -> Result<Vec<Story>, StoreError> {
    match tokio::fs::read(&self.path).await {
      Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
      Err(e) => Err(e.into()),
    }
  }

  pub async fn get(&self, story_number: &str) -> Result<Option<Story>, StoreError> {
    Ok(self.list().await?.into_iter().find(|s| s.story_number == story_number))
  }

  /// Validate, then append under the write lock. Returns the stored form.
  pub async fn add(&self, story: Story) -> Result<Story, StoreError> {
    let story = validate(story)?;

    let _guard = self.write_lock.lock().await;
    let mut stories = self.list().await?;
    if stories.iter().any(|s| s.story_number == story.story_number) {
      return Err(StoreError::Duplicate(story.story_number));
    }
    stories.push(story.clone());

    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent).await?;
    }
    self.replace_file(&serde_json::to_vec_pretty(&stories)?).await?;

    info!(story = %story.story_number, total = stories.len(), "story added");
    Ok(story)
  }

  /// Write a sibling temp file and rename it over the collection, so readers
  /// only ever see the old or the new file. Callers hold the write lock.
  async fn replace_file(&self, bytes: &[u8]) -> Result<(), StoreError> {
    let mut tmp = self.path.clone().into_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, bytes).await?;
    if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
      let _ = tokio::fs::remove_file(&tmp).await;
      return Err(e.into());
    }
    Ok(())
  }
}

#[async_trait]
impl StoryRepository for FileStoryStore {
  async fn find(&self, story_number: &str) -> Result<Option<Story>, EngineError> {
    self.get(story_number).await.map_err(|e| match e {
      StoreError::Io(e) => EngineError::Io(e),
      StoreError::Json(e) => EngineError::Json(e),
      other => EngineError::unavailable(other.to_string()),
    })
  }
}

/// Trim every field, require it non-empty, and map the CSI onto its
/// canonical spelling.
pub fn validate(story: Story) -> Result<Story, StoreError> {
  let required = |field: &str, value: String| -> Result<String, StoreError> {
    let value = value.trim().to_string();
    if value.is_empty() {
      return Err(StoreError::validation(field, "must not be empty"));
    }
    Ok(value)
  };

  let story_number = required("story_number", story.story_number)?;
  let story_type = required("story_type", story.story_type)?;
  let description = required("description", story.description)?;
  let acceptance_criteria = required("acceptance_criteria", story.acceptance_criteria)?;
  let csi = required("impacted_csi", story.impacted_csi)?;
  let impacted_csi = canonical_csi(&csi)
    .ok_or_else(|| StoreError::validation("impacted_csi", "expected Security|Payment|User Management"))?;

  Ok(Story {
    story_number,
    story_type,
    description,
    acceptance_criteria,
    impacted_csi: impacted_csi.to_string(),
    extra: story.extra,
  })
}

/// Case, spaces and underscores are ignored: `user_management` and
/// `UserManagement` both map to `User Management`.
pub fn canonical_csi(value: &str) -> Option<&'static str> {
  let squash = |s: &str| -> String {
    s.chars()
      .filter(|c| !c.is_whitespace() && *c != '_')
      .flat_map(char::to_lowercase)
      .collect()
  };
  let wanted = squash(value);
  CSI_TAGS.iter().copied().find(|tag| squash(tag) == wanted)
}
