//! Project models and statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::batch::BatchSummary;
use crate::entity::project;

/// Project as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<project::Model> for Project {
    fn from(m: project::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Request to create a project.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Number of test cases sharing one severity tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SeverityCount {
    /// Severity tier, "Unspecified" when the generator gave none.
    pub severity: String,
    pub count: i64,
}

/// Aggregated statistics for one project.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProjectStats {
    pub project_id: Uuid,
    pub test_case_count: u64,
    pub batch_count: u64,
    pub analysis_count: u64,
    pub severity_counts: Vec<SeverityCount>,
    pub recent_batches: Vec<BatchSummary>,
}
