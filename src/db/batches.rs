//! Database queries for generation batches.
//!
//! A batch and its test cases are always written and removed together, inside
//! one transaction, so a committed batch's `test_case_count` equals the number
//! of test cases referencing it.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use crate::entity::generation_batch::{self, ActiveModel, Entity as Batch};
use crate::entity::test_case;
use crate::error::{AppError, AppResult};
use crate::models::NormalizedTestCase;

use super::DbPool;

/// Build the stored row for one generated record.
pub(crate) fn test_case_row(
    id: Uuid,
    project_id: Uuid,
    batch_id: Option<Uuid>,
    source_key: Option<String>,
    sequence: i32,
    record: &NormalizedTestCase,
) -> test_case::Model {
    let now = Utc::now();
    test_case::Model {
        id,
        project_id,
        batch_id,
        source_key,
        case_ref: record.case_ref.clone(),
        scenario: record.scenario.clone(),
        summary: record.summary.clone(),
        precondition: record.precondition.clone(),
        steps: record.steps.as_ref().map(|steps| json!(steps)),
        example_data: record.example_data.as_ref().map(|data| data.to_json()),
        expected_result: record.expected_result.clone(),
        priority: record.priority.clone(),
        severity: record.severity.clone(),
        classification: record.classification.map(|c| c.as_str().to_string()),
        sequence,
        created_at: now,
        updated_at: now,
    }
}

impl DbPool {
    /// Persist a batch and one test case per record as a single unit.
    ///
    /// Returns `None` without writing anything when `records` is empty.
    pub async fn insert_generation_batch(
        &self,
        project_id: Uuid,
        source: &str,
        records: &[NormalizedTestCase],
    ) -> AppResult<Option<(generation_batch::Model, Vec<test_case::Model>)>> {
        if records.is_empty() {
            return Ok(None);
        }

        let batch_id = Uuid::now_v7();
        let count = i32::try_from(records.len())
            .map_err(|_| AppError::InvalidInput("Too many generated test cases".to_string()))?;
        let children: Vec<test_case::Model> = records
            .iter()
            .zip(0..count)
            .map(|(record, sequence)| {
                test_case_row(Uuid::now_v7(), project_id, Some(batch_id), None, sequence, record)
            })
            .collect();
        let child_ids: Vec<Uuid> = children.iter().map(|c| c.id).collect();

        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // The child list is complete from the first write.
        let batch = ActiveModel {
            id: Set(batch_id),
            project_id: Set(project_id),
            source: Set(source.to_string()),
            test_case_count: Set(count),
            test_case_ids: Set(json!(child_ids)),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert generation batch: {}", e)))?;

        test_case::Entity::insert_many(
            children
                .iter()
                .cloned()
                .map(|c| c.into_active_model().reset_all()),
        )
        .exec(&txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert test cases: {}", e)))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit generation batch: {}", e)))?;

        Ok(Some((batch, children)))
    }

    /// Get a batch within a project.
    pub async fn get_batch(
        &self,
        project_id: Uuid,
        batch_id: Uuid,
    ) -> AppResult<Option<generation_batch::Model>> {
        Batch::find_by_id(batch_id)
            .filter(generation_batch::Column::ProjectId.eq(project_id))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get batch: {}", e)))
    }

    /// Test cases of a batch in generation order.
    pub async fn get_batch_test_cases(&self, batch_id: Uuid) -> AppResult<Vec<test_case::Model>> {
        test_case::Entity::find()
            .filter(test_case::Column::BatchId.eq(batch_id))
            .order_by_asc(test_case::Column::Sequence)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get batch test cases: {}", e)))
    }

    /// Most recent batches of a project, newest first.
    pub async fn list_recent_batches(
        &self,
        project_id: Uuid,
        limit: u64,
    ) -> AppResult<Vec<generation_batch::Model>> {
        Batch::find()
            .filter(generation_batch::Column::ProjectId.eq(project_id))
            .order_by_desc(generation_batch::Column::CreatedAt)
            .order_by_desc(generation_batch::Column::Id) // UUIDv7 is time-ordered
            .limit(limit)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list batches: {}", e)))
    }

    /// Count a project's batches.
    pub async fn count_batches(&self, project_id: Uuid) -> AppResult<u64> {
        Batch::find()
            .filter(generation_batch::Column::ProjectId.eq(project_id))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count batches: {}", e)))
    }

    /// Delete a batch and all of its test cases.
    pub async fn delete_batch(&self, project_id: Uuid, batch_id: Uuid) -> AppResult<bool> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        test_case::Entity::delete_many()
            .filter(test_case::Column::BatchId.eq(batch_id))
            .filter(test_case::Column::ProjectId.eq(project_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete batch test cases: {}", e)))?;

        let result = Batch::delete_many()
            .filter(generation_batch::Column::Id.eq(batch_id))
            .filter(generation_batch::Column::ProjectId.eq(project_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete batch: {}", e)))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit batch delete: {}", e)))?;

        Ok(result.rows_affected > 0)
    }
}
