//! Database queries for test cases.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, FromQueryResult, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use crate::entity::generation_batch;
use crate::entity::test_case::{self, Entity as TestCase};
use crate::error::{AppError, AppResult};
use crate::models::{ExampleData, NormalizedTestCase, SeverityCount, UpdateTestCaseRequest};

use super::DbPool;
use super::batches::test_case_row;

/// Label for test cases without a severity in aggregations.
pub const UNSPECIFIED_SEVERITY: &str = "Unspecified";

#[derive(Debug, FromQueryResult)]
struct SeverityRow {
    severity: Option<String>,
    count: i64,
}

/// Filters for test case queries.
#[derive(Debug, Default, Clone)]
pub struct TestCaseFilter {
    pub batch_id: Option<Uuid>,
    pub severity: Option<String>,
}

impl DbPool {
    /// Insert a manually authored test case (no batch).
    pub async fn insert_test_case(
        &self,
        project_id: Uuid,
        source_key: Option<String>,
        record: &NormalizedTestCase,
    ) -> AppResult<test_case::Model> {
        let row = test_case_row(Uuid::now_v7(), project_id, None, source_key, 0, record);
        row.into_active_model()
            .reset_all()
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert test case: {}", e)))
    }

    /// Get a test case within a project.
    pub async fn get_test_case(
        &self,
        project_id: Uuid,
        id: Uuid,
    ) -> AppResult<Option<test_case::Model>> {
        TestCase::find_by_id(id)
            .filter(test_case::Column::ProjectId.eq(project_id))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get test case: {}", e)))
    }

    /// Query a project's test cases with pagination, oldest first.
    pub async fn query_test_cases(
        &self,
        project_id: Uuid,
        filter: &TestCaseFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<test_case::Model>, u64)> {
        let mut query = TestCase::find().filter(test_case::Column::ProjectId.eq(project_id));
        if let Some(batch_id) = filter.batch_id {
            query = query.filter(test_case::Column::BatchId.eq(batch_id));
        }
        if let Some(ref severity) = filter.severity {
            query = query.filter(test_case::Column::Severity.eq(severity.as_str()));
        }

        let total = query
            .clone()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count test cases: {}", e)))?;

        let items = query
            .order_by_asc(test_case::Column::CreatedAt)
            .order_by_asc(test_case::Column::Sequence)
            .order_by_asc(test_case::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to query test cases: {}", e)))?;

        Ok((items, total))
    }

    /// Apply a partial update; fields absent from `changes` keep their value.
    pub async fn update_test_case(
        &self,
        existing: test_case::Model,
        changes: UpdateTestCaseRequest,
    ) -> AppResult<test_case::Model> {
        let mut active: test_case::ActiveModel = existing.into();

        if let Some(v) = changes.source_key {
            active.source_key = Set(Some(v));
        }
        if let Some(v) = changes.case_ref {
            active.case_ref = Set(Some(v));
        }
        if let Some(v) = changes.scenario {
            active.scenario = Set(Some(v));
        }
        if let Some(v) = changes.summary {
            active.summary = Set(Some(v));
        }
        if let Some(v) = changes.precondition {
            active.precondition = Set(Some(v));
        }
        if let Some(steps) = changes.steps {
            active.steps = Set(Some(json!(steps)));
        }
        if let Some(data) = changes.example_data {
            active.example_data = Set(ExampleData::from_generated(&data).map(|d| d.to_json()));
        }
        if let Some(v) = changes.expected_result {
            active.expected_result = Set(Some(v));
        }
        if let Some(v) = changes.priority {
            active.priority = Set(Some(v));
        }
        if let Some(v) = changes.severity {
            active.severity = Set(Some(v));
        }
        active.updated_at = Set(Utc::now());

        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update test case: {}", e)))
    }

    /// Delete one test case. A batch child is also removed from its batch's
    /// child list in the same transaction; an emptied batch is deleted.
    pub async fn delete_test_case(&self, project_id: Uuid, id: Uuid) -> AppResult<bool> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let Some(existing) = TestCase::find_by_id(id)
            .filter(test_case::Column::ProjectId.eq(project_id))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get test case: {}", e)))?
        else {
            return Ok(false);
        };

        // Sibling deletes serialize on the batch row.
        let batch = match existing.batch_id {
            Some(batch_id) => generation_batch::Entity::find_by_id(batch_id)
                .lock_exclusive()
                .one(&txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to lock batch: {}", e)))?,
            None => None,
        };

        TestCase::delete_by_id(existing.id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete test case: {}", e)))?;

        if let Some(batch) = batch {
            let remaining: Vec<Uuid> = TestCase::find()
                .select_only()
                .column(test_case::Column::Id)
                .filter(test_case::Column::BatchId.eq(batch.id))
                .order_by_asc(test_case::Column::Sequence)
                .into_tuple()
                .all(&txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to list batch children: {}", e)))?;

            if remaining.is_empty() {
                generation_batch::Entity::delete_by_id(batch.id)
                    .exec(&txn)
                    .await
                    .map_err(|e| AppError::Database(format!("Failed to delete batch: {}", e)))?;
            } else {
                let count = i32::try_from(remaining.len())
                    .map_err(|_| AppError::Database("Batch child count overflow".to_string()))?;
                let mut active: generation_batch::ActiveModel = batch.into();
                active.test_case_count = Set(count);
                active.test_case_ids = Set(json!(remaining));
                active
                    .update(&txn)
                    .await
                    .map_err(|e| AppError::Database(format!("Failed to update batch: {}", e)))?;
            }
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit test case delete: {}", e)))?;

        Ok(true)
    }

    /// Count a project's test cases.
    pub async fn count_test_cases(&self, project_id: Uuid) -> AppResult<u64> {
        TestCase::find()
            .filter(test_case::Column::ProjectId.eq(project_id))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count test cases: {}", e)))
    }

    /// Test case counts grouped by severity tier, largest group first.
    pub async fn severity_counts(&self, project_id: Uuid) -> AppResult<Vec<SeverityCount>> {
        let rows = TestCase::find()
            .select_only()
            .column(test_case::Column::Severity)
            .column_as(Expr::col(test_case::Column::Id).count(), "count")
            .filter(test_case::Column::ProjectId.eq(project_id))
            .group_by(test_case::Column::Severity)
            .into_model::<SeverityRow>()
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to aggregate severities: {}", e)))?;

        let mut counts: Vec<SeverityCount> = Vec::with_capacity(rows.len());
        for row in rows {
            let severity = row
                .severity
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| UNSPECIFIED_SEVERITY.to_string());
            // NULL and blank severities fold into one bucket
            match counts.iter_mut().find(|c| c.severity == severity) {
                Some(existing) => existing.count += row.count,
                None => counts.push(SeverityCount {
                    severity,
                    count: row.count,
                }),
            }
        }
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.severity.cmp(&b.severity)));

        Ok(counts)
    }
}
