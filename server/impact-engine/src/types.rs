//! Core types for the impact engine (JSON contracts + result model).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Stories
// ---------------------------------------------------------------------------

/// One user story as captured by story intake.
///
/// Missing fields read as empty strings; intake rejects them, but an
/// incomplete record already on disk does not poison the whole collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Story {
  #[serde(default)]
  pub story_number: String,
  #[serde(default)]
  pub story_type: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub acceptance_criteria: String,
  #[serde(default)]
  pub impacted_csi: String,
  /// Extra story fields; sent to the model with the rest of the story.
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Manifest (read-only input)
// ---------------------------------------------------------------------------

/// Listing of UI components and backend services with their CSI tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
  #[serde(default)]
  pub frontend: Vec<FrontendEntry>,
  #[serde(default)]
  pub backend: Vec<BackendEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontendEntry {
  #[serde(default, alias = "name")]
  pub component_name: String,
  #[serde(default)]
  pub file_path: String,
  #[serde(default)]
  pub csi: Vec<String>,
  /// Anything else the manifest carries; passed through to the prompt untouched.
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendEntry {
  #[serde(default, alias = "name")]
  pub service_name: String,
  #[serde(default)]
  pub file_path: String,
  #[serde(default)]
  pub csi: Vec<String>,
  #[serde(default)]
  pub endpoints: Vec<Endpoint>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
  #[serde(default)]
  pub method: String,
  #[serde(default)]
  pub path: String,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// Manifest subset relevant to one CSI tag. Derived per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inventory {
  pub csi: String,
  pub frontend: Vec<FrontendEntry>,
  pub backend: Vec<BackendEntry>,
}

// ---------------------------------------------------------------------------
// Impact schema (what the model is asked to produce)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
  Low,
  Medium,
  High,
  Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
  pub name: String,
  #[serde(rename = "type")]
  pub field_type: String,
  #[serde(default)]
  pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontendImpact {
  pub component_name: String,
  pub file_path: String,
  pub reason: String,
  #[serde(default)]
  pub fields_to_add: Vec<FieldChange>,
  pub risk_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendImpact {
  pub service_name: String,
  pub endpoint_path: String,
  pub method: String,
  pub reason: String,
  #[serde(default)]
  pub fields_to_add: Vec<FieldChange>,
  #[serde(default)]
  pub db_changes: Vec<String>,
  pub risk_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossServiceRisk {
  pub from_service: String,
  pub to_service: String,
  pub reason: String,
  pub risk_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestingAndValidation {
  #[serde(default)]
  pub critical_test_cases: Vec<String>,
  #[serde(default)]
  pub edge_cases_to_validate: Vec<String>,
  #[serde(default)]
  pub monitoring_and_alerts: Vec<String>,
  #[serde(default)]
  pub data_migration_risks: Vec<String>,
  #[serde(default)]
  pub production_deployment_checklist: Vec<String>,
}

/// Typed view of the impact schema. The extractor never validates against
/// this; callers opt in with [`AnalysisResult::to_report`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactReport {
  pub story_number: String,
  pub suggested_branch_name: String,
  pub overall_summary: String,
  pub overall_risk_level: RiskLevel,
  pub overall_risk_score: f64,
  #[serde(default)]
  pub frontend_impacts: Vec<FrontendImpact>,
  #[serde(default)]
  pub backend_impacts: Vec<BackendImpact>,
  #[serde(default)]
  pub cross_service_risks: Vec<CrossServiceRisk>,
  #[serde(default)]
  pub testing_and_validation: TestingAndValidation,
}

// ---------------------------------------------------------------------------
// Analysis result (one shape per invocation, never both)
// ---------------------------------------------------------------------------

/// Error shape shared by every stage: `{error, raw?, json_snippet?}`.
///
/// `details` keeps any extra members a backend put next to `error`
/// (e.g. `status` and `response` for non-2xx replies).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisFailure {
  pub error: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub raw: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub json_snippet: Option<String>,
  #[serde(flatten)]
  pub details: Map<String, Value>,
}

impl AnalysisFailure {
  pub fn new(error: impl Into<String>) -> Self {
    Self {
      error: error.into(),
      raw: None,
      json_snippet: None,
      details: Map::new(),
    }
  }

  pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
    self.raw = Some(raw.into());
    self
  }

  pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
    self.json_snippet = Some(snippet.into());
    self
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisResult {
  /// The recovered model object, verbatim.
  Report(Map<String, Value>),
  Failure(AnalysisFailure),
}

impl AnalysisResult {
  pub fn failure(error: impl Into<String>) -> Self {
    Self::Failure(AnalysisFailure::new(error))
  }

  pub fn story_not_found(story_number: &str) -> Self {
    Self::failure(format!("Story {} not found", story_number))
  }

  /// Classify a recovered object. A string `error` member marks a failure;
  /// that is how gateway error strings come back through the extractor.
  pub fn from_object(mut object: Map<String, Value>) -> Self {
    let error = match object.get("error") {
      Some(Value::String(s)) => s.clone(),
      _ => return Self::Report(object),
    };
    object.remove("error");
    let raw = take_string(&mut object, "raw");
    let json_snippet = take_string(&mut object, "json_snippet");
    Self::Failure(AnalysisFailure {
      error,
      raw,
      json_snippet,
      details: object,
    })
  }

  pub fn is_story_not_found(&self, story_number: &str) -> bool {
    match self {
      Self::Failure(f) => f.error == format!("Story {} not found", story_number),
      Self::Report(_) => false,
    }
  }

  pub fn is_failure(&self) -> bool {
    matches!(self, Self::Failure(_))
  }

  pub fn error_message(&self) -> Option<&str> {
    match self {
      Self::Failure(f) => Some(&f.error),
      Self::Report(_) => None,
    }
  }

  pub fn report(&self) -> Option<&Map<String, Value>> {
    match self {
      Self::Report(r) => Some(r),
      Self::Failure(_) => None,
    }
  }

  /// Deserialize the report into the typed schema. `None` for failures or
  /// objects that do not conform.
  pub fn to_report(&self) -> Option<ImpactReport> {
    let object = self.report()?;
    serde_json::from_value(Value::Object(object.clone())).ok()
  }
}

fn take_string(object: &mut Map<String, Value>, key: &str) -> Option<String> {
  match object.get(key) {
    Some(Value::String(_)) => match object.remove(key) {
      Some(Value::String(s)) => Some(s),
      _ => None,
    },
    _ => None,
  }
}
