//! Project API handlers.

use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::ApiKeyAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{BatchSummary, CreateProjectRequest, Project, ProjectStats};
use crate::services::tenancy::authorize_project;

/// Maximum project name length.
const MAX_NAME_LEN: usize = 200;

/// Recent batches included in project statistics.
const STATS_RECENT_BATCHES: u64 = 5;

/// Response for project listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectListResponse {
    pub projects: Vec<Project>,
}

/// Create a project owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    tag = "Projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn create_project(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    body: web::Json<CreateProjectRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Project name is required".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::InvalidInput(format!(
            "Project name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    let description = req
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let project = pool
        .insert_project(auth.principal.id, name, description)
        .await?;

    info!(project_id = %project.id, owner = %auth.principal.key_prefix, "Project created");

    Ok(HttpResponse::Created().json(Project::from(project)))
}

/// List the caller's projects, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    tag = "Projects",
    responses(
        (status = 200, description = "Projects owned by the caller", body = ProjectListResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn list_projects(auth: ApiKeyAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let projects = pool.list_projects_by_owner(auth.principal.id).await?;

    Ok(HttpResponse::Ok().json(ProjectListResponse {
        projects: projects.into_iter().map(Project::from).collect(),
    }))
}

/// Get a project.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{project_id}",
    tag = "Projects",
    params(
        ("project_id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project", body = Project),
        (status = 403, description = "Project owned by another principal", body = crate::error::ErrorResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn get_project(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let project = authorize_project(&pool, &auth.principal, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Project::from(project)))
}

/// Delete a project with all of its batches, test cases and analyses.
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{project_id}",
    tag = "Projects",
    params(
        ("project_id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 403, description = "Project owned by another principal", body = crate::error::ErrorResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn delete_project(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let project = authorize_project(&pool, &auth.principal, path.into_inner()).await?;

    if !pool.delete_project(project.id).await? {
        return Err(AppError::NotFound(format!("Project {}", project.id)));
    }

    info!(project_id = %project.id, "Project deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// Aggregated statistics for a project.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{project_id}/stats",
    tag = "Projects",
    params(
        ("project_id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project statistics", body = ProjectStats),
        (status = 403, description = "Project owned by another principal", body = crate::error::ErrorResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn get_project_stats(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let project = authorize_project(&pool, &auth.principal, path.into_inner()).await?;

    let test_case_count = pool.count_test_cases(project.id).await?;
    let batch_count = pool.count_batches(project.id).await?;
    let analysis_count = pool.count_analyses(project.id).await?;
    let severity_counts = pool.severity_counts(project.id).await?;
    let recent_batches = pool
        .list_recent_batches(project.id, STATS_RECENT_BATCHES)
        .await?;

    let recent_batches = recent_batches
        .into_iter()
        .map(BatchSummary::try_from)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(HttpResponse::Ok().json(ProjectStats {
        project_id: project.id,
        test_case_count,
        batch_count,
        analysis_count,
        severity_counts,
        recent_batches,
    }))
}

/// Configure project routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/projects")
            .route(web::get().to(list_projects))
            .route(web::post().to(create_project)),
    )
    .service(
        web::resource("/projects/{project_id}")
            .route(web::get().to(get_project))
            .route(web::delete().to(delete_project)),
    )
    .service(web::resource("/projects/{project_id}/stats").route(web::get().to(get_project_stats)));
}
