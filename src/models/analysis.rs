//! Analysis models: defect triage, automation candidates and change impact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::analysis;

/// Fixed set of single-object analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    DefectTriage,
    AutomationCandidate,
    ChangeImpact,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DefectTriage => "defect_triage",
            Self::AutomationCandidate => "automation_candidate",
            Self::ChangeImpact => "change_impact",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "defect_triage" => Some(Self::DefectTriage),
            "automation_candidate" => Some(Self::AutomationCandidate),
            "change_impact" => Some(Self::ChangeImpact),
            _ => None,
        }
    }
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized defect triage result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DefectTriage {
    pub root_cause: Option<String>,
    pub severity: Option<String>,
    pub severity_justification: Option<String>,
    pub summary: Option<String>,
}

/// Normalized automation recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AutomationCandidate {
    pub recommendation: Option<String>,
    pub justification: Option<String>,
}

/// Normalized change impact estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChangeImpact {
    pub likelihood: Option<String>,
    pub reasoning: Option<String>,
}

/// Normalized payload of any analysis kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum AnalysisPayload {
    DefectTriage(DefectTriage),
    AutomationCandidate(AutomationCandidate),
    ChangeImpact(ChangeImpact),
}

impl AnalysisPayload {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            Self::DefectTriage(_) => AnalysisKind::DefectTriage,
            Self::AutomationCandidate(_) => AnalysisKind::AutomationCandidate,
            Self::ChangeImpact(_) => AnalysisKind::ChangeImpact,
        }
    }
}

/// Request body for `POST /analyses/defect`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DefectAnalysisRequest {
    pub failed_test: String,
    pub error_logs: String,
    pub steps_reproduced: Option<String>,
    pub context: Option<String>,
}

/// Request body for `POST /analyses/automation`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AutomationAnalysisRequest {
    pub test_case_description: String,
    pub execution_frequency: String,
    pub stability: String,
    /// Manual execution time in minutes; a positive integer or numeric string.
    #[schema(value_type = i64)]
    pub manual_time_mins: JsonValue,
}

impl AutomationAnalysisRequest {
    /// Accepts `12` or `"12"`; anything else (including 0) is rejected.
    pub fn manual_minutes(&self) -> Option<u32> {
        let minutes = match &self.manual_time_mins {
            JsonValue::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            JsonValue::String(s) => s.trim().parse::<u32>().ok(),
            _ => None,
        }?;
        (minutes > 0).then_some(minutes)
    }
}

/// Request body for `POST /analyses/impact`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ImpactAnalysisRequest {
    pub code_change_description: String,
    pub test_case_description: String,
}

/// Persisted analysis as returned by the API.
///
/// Exactly one of `payload` or `raw_text` is set; `warning` accompanies `raw_text`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub kind: AnalysisKind,
    pub source: String,
    #[schema(value_type = Option<Object>)]
    pub payload: Option<JsonValue>,
    pub raw_text: Option<String>,
    pub warning: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<analysis::Model> for AnalysisResponse {
    type Error = crate::error::AppError;

    fn try_from(m: analysis::Model) -> Result<Self, Self::Error> {
        let kind = AnalysisKind::parse(&m.kind).ok_or_else(|| {
            crate::error::AppError::Database(format!("Unknown analysis kind '{}'", m.kind))
        })?;
        Ok(Self {
            id: m.id,
            project_id: m.project_id,
            kind,
            source: m.source,
            payload: m.payload,
            raw_text: m.raw_text,
            warning: m.warning,
            created_at: m.created_at,
        })
    }
}

/// Query parameters for listing analyses.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListAnalysesQuery {
    pub kind: Option<AnalysisKind>,
    /// Number of analyses to return (default 10, max 100).
    pub limit: Option<u64>,
}
