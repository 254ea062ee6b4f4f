//! Change Impact Engine: story-driven impact prediction over a repo manifest.
//!
//! Filters the manifest by a story's CSI tag, builds a fixed-shape prompt,
//! sends it to the first configured completion backend, and recovers a single
//! JSON object from whatever text comes back.
//!
//! Stories and the manifest are read-only inputs supplied through the
//! [`StoryRepository`] and [`ManifestSource`] traits.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod inventory;
pub mod prompt;
pub mod sources;
pub mod types;

pub use analyzer::Analyzer;
pub use config::GatewayConfig;
pub use error::{BackendError, EngineError};
pub use gateway::{CompletionBackend, Gateway, GroqBackend, MockBackend};
pub use sources::{ManifestSource, StaticManifest, StaticStories, StoryRepository};
pub use types::{AnalysisFailure, AnalysisResult, ImpactReport, Inventory, Manifest, Story};
