//! Generation batch models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::test_case::TestCaseResponse;
use crate::entity::generation_batch;
use crate::error::{AppError, AppResult};

/// Batch without its children.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchSummary {
    pub id: Uuid,
    pub project_id: Uuid,
    pub source: String,
    pub test_case_count: i32,
    /// Child test case ids in generation order.
    pub test_case_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<generation_batch::Model> for BatchSummary {
    type Error = AppError;

    fn try_from(m: generation_batch::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            test_case_ids: child_ids(&m)?,
            id: m.id,
            project_id: m.project_id,
            source: m.source,
            test_case_count: m.test_case_count,
            created_at: m.created_at,
        })
    }
}

/// Decode the ordered child id list stored on a batch row.
pub fn child_ids(batch: &generation_batch::Model) -> AppResult<Vec<Uuid>> {
    serde_json::from_value(batch.test_case_ids.clone()).map_err(|e| {
        AppError::Database(format!(
            "Corrupt child list on batch {}: {}",
            batch.id, e
        ))
    })
}

/// Batch with its test cases in child-list order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BatchDetail {
    #[serde(flatten)]
    pub batch: BatchSummary,
    pub test_cases: Vec<TestCaseResponse>,
}

/// Query parameters for recent batch listings.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListBatchesQuery {
    /// Number of batches to return (default 10, max 100).
    pub limit: Option<u64>,
}
