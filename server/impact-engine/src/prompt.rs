//! Prompt construction: fixed instructions + per-story JSON payload.

use serde::Serialize;

use crate::types::{Inventory, Manifest, Story};

/// Separates the instruction block from the JSON payload. The mock backend
/// splits on it to recover the story number.
pub const USER_INPUT_MARKER: &str = "\n\nUSER INPUT:\n";

/// Task description and the literal output schema. Downstream parsing relies
/// on the model honouring the JSON-only directive, which is never guaranteed.
pub const SYSTEM_PROMPT: &str = r#"You are a senior architect and tech lead for a banking application.

You will receive:
- A single user story (with CSI: Security, Payment, or User Management)
- A filtered inventory of the codebase listing UI components and backend services relevant to that CSI
- A full manifest of all services/components for cross-service reasoning

Your tasks:
1. Suggest a Git branch name for implementing this story.
   - Format: <type>/<story-number>-<short-kebab-summary>
2. Identify FRONTEND/UI impact:
   - which UI components are affected (from the provided inventory)
   - what new fields or UI elements must be added
   - per-component risk_score 0-10
3. Identify BACKEND impact:
   - impacted services and endpoints (method + path)
   - what new request/response fields or DB fields may be needed
   - per-service risk_score 0-10
4. Cross-service risk:
   - dependencies where a change in one service might break another, with risk_score 0-10.
5. Overall risk:
   - overall_risk_level: one of ["low", "medium", "high", "critical"]
   - overall_risk_score: 0-10
6. Testing & Validation (CRITICAL for production safety):
   - List specific test cases testers should validate BEFORE prod deployment
   - Include edge cases, error scenarios, integration points
   - Specify what metrics/logs should be monitored post-deployment
   - Call out any data migration or rollback concerns

Respond ONLY with JSON in this structure:

{
  "story_number": "US-101",
  "suggested_branch_name": "feature/US-101-two-factor-login",
  "overall_summary": "short summary",
  "overall_risk_level": "low|medium|high|critical",
  "overall_risk_score": 0,
  "frontend_impacts": [
    {
      "component_name": "LoginPage",
      "file_path": "frontend/src/components/LoginPage.jsx",
      "reason": "why this component is impacted",
      "fields_to_add": [
        {"name": "otp", "type": "string", "description": "One-time password sent to email"}
      ],
      "risk_score": 0
    }
  ],
  "backend_impacts": [
    {
      "service_name": "AuthService",
      "endpoint_path": "/auth/verify-otp",
      "method": "POST",
      "reason": "why this endpoint is impacted",
      "fields_to_add": [
        {"name": "otp", "type": "string", "description": "OTP entered by user"}
      ],
      "db_changes": [
        "Add otp_secret and otp_expires_at to user auth table"
      ],
      "risk_score": 0
    }
  ],
  "cross_service_risks": [
    {
      "from_service": "AuthService",
      "to_service": "UserService",
      "reason": "how they interact and what could break",
      "risk_score": 0
    }
  ],
  "testing_and_validation": {
    "critical_test_cases": [
      "Test case 1: Happy path scenario with expected behavior",
      "Test case 2: Error handling and edge cases",
      "Test case 3: Integration with dependent services",
      "Test case 4: Performance impact on transaction throughput",
      "Test case 5: Data consistency across services"
    ],
    "edge_cases_to_validate": [
      "Concurrent requests from multiple users",
      "Timeout and retry scenarios",
      "Invalid/malformed input handling",
      "Backwards compatibility with existing data"
    ],
    "monitoring_and_alerts": [
      "Error rate threshold for this endpoint",
      "Response time SLA (e.g., p99 latency)",
      "Failed transaction logs",
      "Database lock contention metrics"
    ],
    "data_migration_risks": [
      "Any existing data that needs transformation",
      "Rollback strategy if issues detected",
      "Data validation checkpoints"
    ],
    "production_deployment_checklist": [
      "Feature flag deployment for gradual rollout",
      "Database migration order and validation",
      "Service restart sequence to prevent outages",
      "Incident response contact and escalation path"
    ]
  }
}
"#;

#[derive(Serialize)]
struct PromptPayload<'a> {
  story: &'a Story,
  filtered_inventory_for_csi: &'a Inventory,
  full_manifest: &'a Manifest,
}

/// Pretty-printed JSON payload for one story.
pub fn payload_json(
  story: &Story,
  inventory: &Inventory,
  full_manifest: &Manifest,
) -> Result<String, serde_json::Error> {
  serde_json::to_string_pretty(&PromptPayload {
    story,
    filtered_inventory_for_csi: inventory,
    full_manifest,
  })
}

/// Full prompt: instructions, marker, payload.
pub fn build(
  story: &Story,
  inventory: &Inventory,
  full_manifest: &Manifest,
) -> Result<String, serde_json::Error> {
  let payload = payload_json(story, inventory, full_manifest)?;
  let mut prompt = String::with_capacity(SYSTEM_PROMPT.len() + USER_INPUT_MARKER.len() + payload.len());
  prompt.push_str(SYSTEM_PROMPT);
  prompt.push_str(USER_INPUT_MARKER);
  prompt.push_str(&payload);
  Ok(prompt)
}
