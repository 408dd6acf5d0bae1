//! Test case and batch API handlers.

use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::ApiKeyAuth;
use crate::db::DbPool;
use crate::db::test_cases::TestCaseFilter;
use crate::error::{AppError, AppResult};
use crate::models::{
    BatchDetail, BatchSummary, CreateTestCaseRequest, DEFAULT_LIMIT, ListBatchesQuery,
    ListTestCasesQuery, TestCaseListResponse, TestCaseResponse, UpdateTestCaseRequest, clamp_limit,
};
use crate::services::tenancy::authorize_project;

/// Default number of batches in recent listings.
const DEFAULT_BATCH_LIMIT: u64 = 10;

/// Response for batch listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct BatchListResponse {
    pub batches: Vec<BatchSummary>,
}

/// List a project's test cases.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{project_id}/test-cases",
    tag = "Test Cases",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("batch_id" = Option<Uuid>, Query, description = "Only cases from this batch"),
        ("severity" = Option<String>, Query, description = "Only cases with this severity"),
        ("limit" = Option<u64>, Query, description = "Page size (default 20, max 100)"),
        ("offset" = Option<u64>, Query, description = "Rows to skip"),
    ),
    responses(
        (status = 200, description = "Paginated test cases", body = TestCaseListResponse),
        (status = 403, description = "Project owned by another principal", body = crate::error::ErrorResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn list_test_cases(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    query: web::Query<ListTestCasesQuery>,
) -> AppResult<HttpResponse> {
    let project = authorize_project(&pool, &auth.principal, path.into_inner()).await?;
    let query = query.into_inner();

    let limit = clamp_limit(query.limit, DEFAULT_LIMIT);
    let offset = query.offset.unwrap_or(0);
    let filter = TestCaseFilter {
        batch_id: query.batch_id,
        severity: query.severity.filter(|s| !s.trim().is_empty()),
    };

    let (items, total) = pool.query_test_cases(project.id, &filter, limit, offset).await?;

    Ok(HttpResponse::Ok().json(TestCaseListResponse {
        test_cases: items.into_iter().map(TestCaseResponse::from).collect(),
        total,
        limit,
        offset,
    }))
}

/// Create a test case by hand.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{project_id}/test-cases",
    tag = "Test Cases",
    params(
        ("project_id" = Uuid, Path, description = "Project ID")
    ),
    request_body = CreateTestCaseRequest,
    responses(
        (status = 201, description = "Test case created", body = TestCaseResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 403, description = "Project owned by another principal", body = crate::error::ErrorResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn create_test_case(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<CreateTestCaseRequest>,
) -> AppResult<HttpResponse> {
    let project = authorize_project(&pool, &auth.principal, path.into_inner()).await?;
    let req = body.into_inner();

    if req.summary.trim().is_empty() {
        return Err(AppError::InvalidInput("'summary' is required".to_string()));
    }

    let (source_key, record) = req.into_normalized();
    let created = pool.insert_test_case(project.id, source_key, &record).await?;

    info!(project_id = %project.id, test_case_id = %created.id, "Test case created");
    Ok(HttpResponse::Created().json(TestCaseResponse::from(created)))
}

/// Get one test case.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{project_id}/test-cases/{case_id}",
    tag = "Test Cases",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("case_id" = Uuid, Path, description = "Test case ID"),
    ),
    responses(
        (status = 200, description = "Test case", body = TestCaseResponse),
        (status = 403, description = "Project owned by another principal", body = crate::error::ErrorResponse),
        (status = 404, description = "Project or test case not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn get_test_case(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (project_id, case_id) = path.into_inner();
    let project = authorize_project(&pool, &auth.principal, project_id).await?;

    let test_case = pool
        .get_test_case(project.id, case_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test case {}", case_id)))?;

    Ok(HttpResponse::Ok().json(TestCaseResponse::from(test_case)))
}

/// Update a test case; only supplied fields change.
#[utoipa::path(
    put,
    path = "/api/v1/projects/{project_id}/test-cases/{case_id}",
    tag = "Test Cases",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("case_id" = Uuid, Path, description = "Test case ID"),
    ),
    request_body = UpdateTestCaseRequest,
    responses(
        (status = 200, description = "Updated test case", body = TestCaseResponse),
        (status = 400, description = "No fields to update", body = crate::error::ErrorResponse),
        (status = 403, description = "Project owned by another principal", body = crate::error::ErrorResponse),
        (status = 404, description = "Project or test case not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn update_test_case(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<UpdateTestCaseRequest>,
) -> AppResult<HttpResponse> {
    let (project_id, case_id) = path.into_inner();
    let project = authorize_project(&pool, &auth.principal, project_id).await?;
    let changes = body.into_inner();

    if changes.is_empty() {
        return Err(AppError::InvalidInput("No fields to update".to_string()));
    }
    if changes.summary.as_deref().is_some_and(|s| s.trim().is_empty()) {
        return Err(AppError::InvalidInput("'summary' cannot be empty".to_string()));
    }

    let existing = pool
        .get_test_case(project.id, case_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test case {}", case_id)))?;
    let updated = pool.update_test_case(existing, changes).await?;

    Ok(HttpResponse::Ok().json(TestCaseResponse::from(updated)))
}

/// Delete a test case. Batch children are also removed from their batch.
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{project_id}/test-cases/{case_id}",
    tag = "Test Cases",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("case_id" = Uuid, Path, description = "Test case ID"),
    ),
    responses(
        (status = 204, description = "Test case deleted"),
        (status = 403, description = "Project owned by another principal", body = crate::error::ErrorResponse),
        (status = 404, description = "Project or test case not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn delete_test_case(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (project_id, case_id) = path.into_inner();
    let project = authorize_project(&pool, &auth.principal, project_id).await?;

    if !pool.delete_test_case(project.id, case_id).await? {
        return Err(AppError::NotFound(format!("Test case {}", case_id)));
    }

    Ok(HttpResponse::NoContent().finish())
}

/// List a project's most recent generation batches.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{project_id}/batches",
    tag = "Batches",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("limit" = Option<u64>, Query, description = "Number of batches (default 10, max 100)"),
    ),
    responses(
        (status = 200, description = "Recent batches, newest first", body = BatchListResponse),
        (status = 403, description = "Project owned by another principal", body = crate::error::ErrorResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn list_batches(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    query: web::Query<ListBatchesQuery>,
) -> AppResult<HttpResponse> {
    let project = authorize_project(&pool, &auth.principal, path.into_inner()).await?;
    let limit = clamp_limit(query.limit, DEFAULT_BATCH_LIMIT);

    let batches = pool.list_recent_batches(project.id, limit).await?;

    let batches = batches
        .into_iter()
        .map(BatchSummary::try_from)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(HttpResponse::Ok().json(BatchListResponse { batches }))
}

/// Get a batch with its test cases in generation order.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{project_id}/batches/{batch_id}",
    tag = "Batches",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("batch_id" = Uuid, Path, description = "Batch ID"),
    ),
    responses(
        (status = 200, description = "Batch with its test cases", body = BatchDetail),
        (status = 403, description = "Project owned by another principal", body = crate::error::ErrorResponse),
        (status = 404, description = "Project or batch not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn get_batch(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (project_id, batch_id) = path.into_inner();
    let project = authorize_project(&pool, &auth.principal, project_id).await?;

    let batch = pool
        .get_batch(project.id, batch_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Batch {}", batch_id)))?;
    let test_cases = pool.get_batch_test_cases(batch.id).await?;

    Ok(HttpResponse::Ok().json(BatchDetail {
        batch: BatchSummary::try_from(batch)?,
        test_cases: test_cases.into_iter().map(TestCaseResponse::from).collect(),
    }))
}

/// Delete a batch together with all of its test cases.
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{project_id}/batches/{batch_id}",
    tag = "Batches",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("batch_id" = Uuid, Path, description = "Batch ID"),
    ),
    responses(
        (status = 204, description = "Batch and its test cases deleted"),
        (status = 403, description = "Project owned by another principal", body = crate::error::ErrorResponse),
        (status = 404, description = "Project or batch not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn delete_batch(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (project_id, batch_id) = path.into_inner();
    let project = authorize_project(&pool, &auth.principal, project_id).await?;

    if !pool.delete_batch(project.id, batch_id).await? {
        return Err(AppError::NotFound(format!("Batch {}", batch_id)));
    }

    info!(project_id = %project.id, batch_id = %batch_id, "Batch deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// Configure test case and batch routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/projects/{project_id}/test-cases")
            .route(web::get().to(list_test_cases))
            .route(web::post().to(create_test_case)),
    )
    .service(
        web::resource("/projects/{project_id}/test-cases/{case_id}")
            .route(web::get().to(get_test_case))
            .route(web::put().to(update_test_case))
            .route(web::delete().to(delete_test_case)),
    )
    .service(web::resource("/projects/{project_id}/batches").route(web::get().to(list_batches)))
    .service(
        web::resource("/projects/{project_id}/batches/{batch_id}")
            .route(web::get().to(get_batch))
            .route(web::delete().to(delete_batch)),
    );
}
