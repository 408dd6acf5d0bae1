//! Database queries for projects.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::project::{self, ActiveModel, Entity as Project};
use crate::entity::{analysis, generation_batch, test_case};
use crate::error::{AppError, AppResult};

use super::DbPool;

impl DbPool {
    /// Insert a new project owned by `owner_id`.
    pub async fn insert_project(
        &self,
        owner_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<project::Model> {
        let now = Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            owner_id: Set(owner_id),
            name: Set(name.to_string()),
            description: Set(description.map(str::to_string)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert project: {}", e)))
    }

    /// Get a project by ID, regardless of owner.
    pub async fn get_project(&self, id: Uuid) -> AppResult<Option<project::Model>> {
        Project::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get project: {}", e)))
    }

    /// List an owner's projects, newest first.
    pub async fn list_projects_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<project::Model>> {
        Project::find()
            .filter(project::Column::OwnerId.eq(owner_id))
            .order_by_desc(project::Column::CreatedAt)
            .order_by_desc(project::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list projects: {}", e)))
    }

    /// Delete a project with all of its test cases, batches and analyses.
    pub async fn delete_project(&self, id: Uuid) -> AppResult<bool> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        test_case::Entity::delete_many()
            .filter(test_case::Column::ProjectId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete project test cases: {}", e)))?;

        generation_batch::Entity::delete_many()
            .filter(generation_batch::Column::ProjectId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete project batches: {}", e)))?;

        analysis::Entity::delete_many()
            .filter(analysis::Column::ProjectId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete project analyses: {}", e)))?;

        let result = Project::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete project: {}", e)))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit project delete: {}", e)))?;

        Ok(result.rows_affected > 0)
    }
}
