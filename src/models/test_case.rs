//! Test case domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::test_case;

/// Example data attached to a test case.
///
/// The generator returns a string, a list or an object here; the variant is
/// kept explicitly so storage and API responses stay typed. Encoded as
/// `{"kind": "text" | "list" | "structured", "value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExampleData {
    Text(String),
    List(Vec<JsonValue>),
    Structured(Map<String, JsonValue>),
}

impl ExampleData {
    /// Decode a generator-supplied value. Scalars other than strings keep
    /// their JSON text; `null` means no example data.
    pub fn from_generated(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Null => None,
            JsonValue::String(s) => Some(Self::Text(s.clone())),
            JsonValue::Array(items) => Some(Self::List(items.clone())),
            JsonValue::Object(map) => Some(Self::Structured(map.clone())),
            other => Some(Self::Text(other.to_string())),
        }
    }

    /// Encode for the JSON column.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Text(s) => serde_json::json!({ "kind": "text", "value": s }),
            Self::List(items) => serde_json::json!({ "kind": "list", "value": items }),
            Self::Structured(map) => serde_json::json!({ "kind": "structured", "value": map }),
        }
    }

    /// Decode from the JSON column.
    pub fn from_json(value: Option<&JsonValue>) -> Option<Self> {
        value.and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Positive/negative tag for cases flattened from a grouped scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Positive,
    Negative,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            _ => None,
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical flat test case record produced by normalization.
///
/// Every field is optional: whatever the generator left out stays `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTestCase {
    pub case_ref: Option<String>,
    pub scenario: Option<String>,
    pub summary: Option<String>,
    pub precondition: Option<String>,
    /// Null entries keep their position.
    pub steps: Option<Vec<Option<String>>>,
    pub example_data: Option<ExampleData>,
    pub expected_result: Option<String>,
    pub priority: Option<String>,
    pub severity: Option<String>,
    pub classification: Option<Classification>,
}

/// Response for a persisted test case.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TestCaseResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub batch_id: Option<Uuid>,
    pub source_key: Option<String>,
    /// Short identifier invented by the generator (not unique).
    pub case_ref: Option<String>,
    pub scenario: Option<String>,
    pub summary: Option<String>,
    pub precondition: Option<String>,
    pub steps: Option<Vec<Option<String>>>,
    /// `{"kind": "text"|"list"|"structured", "value": ...}`
    #[schema(value_type = Option<Object>)]
    pub example_data: Option<ExampleData>,
    pub expected_result: Option<String>,
    pub priority: Option<String>,
    pub severity: Option<String>,
    pub classification: Option<Classification>,
    pub sequence: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<test_case::Model> for TestCaseResponse {
    fn from(m: test_case::Model) -> Self {
        Self {
            steps: m
                .steps
                .as_ref()
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
            example_data: ExampleData::from_json(m.example_data.as_ref()),
            classification: m.classification.as_deref().and_then(Classification::parse),
            id: m.id,
            project_id: m.project_id,
            batch_id: m.batch_id,
            source_key: m.source_key,
            case_ref: m.case_ref,
            scenario: m.scenario,
            summary: m.summary,
            precondition: m.precondition,
            expected_result: m.expected_result,
            priority: m.priority,
            severity: m.severity,
            sequence: m.sequence,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Request to create a test case by hand.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTestCaseRequest {
    /// External origin key, e.g. an issue identifier.
    pub source_key: Option<String>,
    pub case_ref: Option<String>,
    pub scenario: Option<String>,
    pub summary: String,
    pub precondition: Option<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[schema(value_type = Option<Object>)]
    pub example_data: Option<JsonValue>,
    pub expected_result: Option<String>,
    pub priority: Option<String>,
    pub severity: Option<String>,
}

impl CreateTestCaseRequest {
    pub fn into_normalized(self) -> (Option<String>, NormalizedTestCase) {
        let record = NormalizedTestCase {
            case_ref: self.case_ref,
            scenario: self.scenario,
            summary: Some(self.summary),
            precondition: self.precondition,
            steps: Some(self.steps.into_iter().map(Some).collect()),
            example_data: self.example_data.as_ref().and_then(ExampleData::from_generated),
            expected_result: self.expected_result,
            priority: self.priority,
            severity: self.severity,
            classification: None,
        };
        (self.source_key, record)
    }
}

/// Partial update; only supplied fields change.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTestCaseRequest {
    pub source_key: Option<String>,
    pub case_ref: Option<String>,
    pub scenario: Option<String>,
    pub summary: Option<String>,
    pub precondition: Option<String>,
    pub steps: Option<Vec<String>>,
    #[schema(value_type = Option<Object>)]
    pub example_data: Option<JsonValue>,
    pub expected_result: Option<String>,
    pub priority: Option<String>,
    pub severity: Option<String>,
}

impl UpdateTestCaseRequest {
    pub fn is_empty(&self) -> bool {
        self.source_key.is_none()
            && self.case_ref.is_none()
            && self.scenario.is_none()
            && self.summary.is_none()
            && self.precondition.is_none()
            && self.steps.is_none()
            && self.example_data.is_none()
            && self.expected_result.is_none()
            && self.priority.is_none()
            && self.severity.is_none()
    }
}

/// Query parameters for listing test cases.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListTestCasesQuery {
    pub batch_id: Option<Uuid>,
    pub severity: Option<String>,
    /// Results per page (default 20, max 100).
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Paginated test cases response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TestCaseListResponse {
    pub test_cases: Vec<TestCaseResponse>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}
