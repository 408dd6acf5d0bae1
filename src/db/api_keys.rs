//! Database operations for API keys (principals).

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::api_key::{self, ActiveModel, Entity as ApiKeyEntity};
use crate::error::{AppError, AppResult};
use crate::models::ApiKey;

use super::DbPool;

impl DbPool {
    /// Insert a new API key.
    pub async fn insert_api_key(&self, key: &ApiKey) -> AppResult<()> {
        let model = ActiveModel {
            id: Set(key.id),
            key_hash: Set(key.key_hash.clone()),
            key_prefix: Set(key.key_prefix.clone()),
            name: Set(key.name.clone()),
            expires_at: Set(key.expires_at),
            last_used_at: Set(key.last_used_at),
            created_at: Set(key.created_at),
            revoked_at: Set(key.revoked_at),
        };

        ApiKeyEntity::insert(model)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert API key: {}", e)))?;

        Ok(())
    }

    /// Find an API key by its hash.
    pub async fn find_api_key_by_hash(&self, key_hash: &str) -> AppResult<Option<ApiKey>> {
        let result = ApiKeyEntity::find()
            .filter(api_key::Column::KeyHash.eq(key_hash))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up API key: {}", e)))?;

        Ok(result.map(ApiKey::from))
    }

    /// Update last used timestamp.
    pub async fn touch_api_key(&self, id: Uuid) -> AppResult<()> {
        ApiKeyEntity::update_many()
            .col_expr(
                api_key::Column::LastUsedAt,
                sea_orm::sea_query::Expr::value(Some(Utc::now())),
            )
            .filter(api_key::Column::Id.eq(id))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update API key usage: {}", e)))?;

        Ok(())
    }

    /// List all API keys (including revoked).
    pub async fn list_api_keys(&self) -> AppResult<Vec<ApiKey>> {
        let results = ApiKeyEntity::find()
            .order_by_desc(api_key::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list API keys: {}", e)))?;

        Ok(results.into_iter().map(ApiKey::from).collect())
    }

    /// Revoke an API key (soft delete). Returns false if missing or already revoked.
    pub async fn revoke_api_key(&self, id: Uuid) -> AppResult<bool> {
        let model = ApiKeyEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get API key: {}", e)))?;

        match model {
            Some(m) if m.revoked_at.is_none() => {
                let mut active: ActiveModel = m.into();
                active.revoked_at = Set(Some(Utc::now()));
                active
                    .update(self.connection())
                    .await
                    .map_err(|e| AppError::Database(format!("Failed to revoke API key: {}", e)))?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
