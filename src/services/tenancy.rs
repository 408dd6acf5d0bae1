//! Project ownership checks.

use tracing::warn;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entity::project;
use crate::error::{AppError, AppResult};
use crate::models::Principal;

/// Resolve `project_id` for `principal`.
///
/// Fails with `NotFound` when the project does not exist and with `Forbidden`
/// when another principal owns it. Looks the project up on every call.
pub async fn authorize_project(
    pool: &DbPool,
    principal: &Principal,
    project_id: Uuid,
) -> AppResult<project::Model> {
    let project = pool
        .get_project(project_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {}", project_id)))?;

    if project.owner_id != principal.id {
        warn!(
            project_id = %project_id,
            principal = %principal.key_prefix,
            "Project access denied"
        );
        return Err(AppError::Forbidden(
            "Project belongs to another principal".to_string(),
        ));
    }

    Ok(project)
}
