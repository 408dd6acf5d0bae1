//! Database queries for analyses.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::entity::analysis::{self, ActiveModel, Entity as Analysis};
use crate::error::{AppError, AppResult};
use crate::models::AnalysisKind;

use super::DbPool;

/// Body of an analysis row: normalized payload, or raw text with a warning.
#[derive(Debug, Clone)]
pub enum AnalysisBody {
    Payload(JsonValue),
    Fallback { raw_text: String, warning: String },
}

impl DbPool {
    /// Insert one analysis.
    pub async fn insert_analysis(
        &self,
        project_id: Uuid,
        kind: AnalysisKind,
        source: &str,
        body: AnalysisBody,
    ) -> AppResult<analysis::Model> {
        let (payload, raw_text, warning) = match body {
            AnalysisBody::Payload(payload) => (Some(payload), None, None),
            AnalysisBody::Fallback { raw_text, warning } => (None, Some(raw_text), Some(warning)),
        };

        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            project_id: Set(project_id),
            kind: Set(kind.as_str().to_string()),
            source: Set(source.to_string()),
            payload: Set(payload),
            raw_text: Set(raw_text),
            warning: Set(warning),
            created_at: Set(Utc::now()),
        };

        model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert analysis: {}", e)))
    }

    /// Get an analysis within a project.
    pub async fn get_analysis(
        &self,
        project_id: Uuid,
        id: Uuid,
    ) -> AppResult<Option<analysis::Model>> {
        Analysis::find_by_id(id)
            .filter(analysis::Column::ProjectId.eq(project_id))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get analysis: {}", e)))
    }

    /// Most recent analyses of a project, optionally of one kind.
    pub async fn list_recent_analyses(
        &self,
        project_id: Uuid,
        kind: Option<AnalysisKind>,
        limit: u64,
    ) -> AppResult<Vec<analysis::Model>> {
        let mut query = Analysis::find().filter(analysis::Column::ProjectId.eq(project_id));
        if let Some(kind) = kind {
            query = query.filter(analysis::Column::Kind.eq(kind.as_str()));
        }

        query
            .order_by_desc(analysis::Column::CreatedAt)
            .order_by_desc(analysis::Column::Id)
            .limit(limit)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list analyses: {}", e)))
    }

    /// Count a project's analyses.
    pub async fn count_analyses(&self, project_id: Uuid) -> AppResult<u64> {
        Analysis::find()
            .filter(analysis::Column::ProjectId.eq(project_id))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count analyses: {}", e)))
    }
}
