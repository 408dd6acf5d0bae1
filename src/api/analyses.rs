//! Analysis handlers: defect triage, automation candidacy and change impact.
//!
//! Each run is persisted, including runs whose output could not be
//! normalized (stored as raw text with a warning).

use actix_web::{HttpResponse, web};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::generations::require_text;
use crate::auth::ApiKeyAuth;
use crate::db::DbPool;
use crate::entity::project;
use crate::error::{AppError, AppResult};
use crate::models::{
    AnalysisKind, AnalysisResponse, AutomationAnalysisRequest, DefectAnalysisRequest,
    ImpactAnalysisRequest, ListAnalysesQuery, clamp_limit,
};
use crate::services::generator::{PromptPart, TextGenerator};
use crate::services::pipeline::{self, PipelineSettings};
use crate::services::prompts;
use crate::services::tenancy::authorize_project;

const DEFAULT_ANALYSIS_LIMIT: u64 = 10;

/// Response for analysis listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalysisListResponse {
    pub analyses: Vec<AnalysisResponse>,
}

async fn run(
    pool: &DbPool,
    generator: &dyn TextGenerator,
    settings: &PipelineSettings,
    project: &project::Model,
    kind: AnalysisKind,
    source: &str,
    prompt: String,
) -> AppResult<HttpResponse> {
    let parts = [PromptPart::text(prompt)];
    let row =
        pipeline::generate_analysis(pool, generator, settings, project, kind, source, &parts)
            .await?;
    Ok(HttpResponse::Created().json(AnalysisResponse::try_from(row)?))
}

/// Suggest a root cause and severity for a failed test.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{project_id}/analyses/defect",
    tag = "Analyses",
    params(
        ("project_id" = Uuid, Path, description = "Project ID")
    ),
    request_body = DefectAnalysisRequest,
    responses(
        (status = 201, description = "Analysis persisted", body = AnalysisResponse),
        (status = 400, description = "Missing required fields", body = crate::error::ErrorResponse),
        (status = 403, description = "Project owned by another principal", body = crate::error::ErrorResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
        (status = 502, description = "Generator failure", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn analyze_defect(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    generator: web::Data<dyn TextGenerator>,
    settings: web::Data<PipelineSettings>,
    path: web::Path<Uuid>,
    body: web::Json<DefectAnalysisRequest>,
) -> AppResult<HttpResponse> {
    let project = authorize_project(&pool, &auth.principal, path.into_inner()).await?;

    let failed_test = require_text(&body.failed_test, "failed_test")?;
    let error_logs = require_text(&body.error_logs, "error_logs")?;
    let error_logs = prompts::truncate_chars(error_logs, settings.half_input_chars());

    let source = format!("Defect: {}", failed_test);
    let prompt = prompts::defect_prompt(&body, &error_logs);

    run(
        &pool,
        generator.get_ref(),
        &settings,
        &project,
        AnalysisKind::DefectTriage,
        &source,
        prompt,
    )
    .await
}

/// Recommend whether a manual test case should be automated.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{project_id}/analyses/automation",
    tag = "Analyses",
    params(
        ("project_id" = Uuid, Path, description = "Project ID")
    ),
    request_body = AutomationAnalysisRequest,
    responses(
        (status = 201, description = "Analysis persisted", body = AnalysisResponse),
        (status = 400, description = "Missing fields or invalid manual time", body = crate::error::ErrorResponse),
        (status = 403, description = "Project owned by another principal", body = crate::error::ErrorResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
        (status = 502, description = "Generator failure", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn analyze_automation(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    generator: web::Data<dyn TextGenerator>,
    settings: web::Data<PipelineSettings>,
    path: web::Path<Uuid>,
    body: web::Json<AutomationAnalysisRequest>,
) -> AppResult<HttpResponse> {
    let project = authorize_project(&pool, &auth.principal, path.into_inner()).await?;

    let description = require_text(&body.test_case_description, "test_case_description")?;
    require_text(&body.execution_frequency, "execution_frequency")?;
    require_text(&body.stability, "stability")?;
    let manual_minutes = body.manual_minutes().ok_or_else(|| {
        AppError::InvalidInput("'manual_time_mins' must be a positive integer.".to_string())
    })?;
    let description = prompts::truncate_chars(description, settings.half_input_chars());

    let source = format!(
        "Automation: {}",
        description.chars().take(80).collect::<String>()
    );
    let prompt = prompts::automation_prompt(&body, &description, manual_minutes);

    run(
        &pool,
        generator.get_ref(),
        &settings,
        &project,
        AnalysisKind::AutomationCandidate,
        &source,
        prompt,
    )
    .await
}

/// Estimate how likely a code change is to affect a test case.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{project_id}/analyses/impact",
    tag = "Analyses",
    params(
        ("project_id" = Uuid, Path, description = "Project ID")
    ),
    request_body = ImpactAnalysisRequest,
    responses(
        (status = 201, description = "Analysis persisted", body = AnalysisResponse),
        (status = 400, description = "Missing required fields", body = crate::error::ErrorResponse),
        (status = 403, description = "Project owned by another principal", body = crate::error::ErrorResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
        (status = 502, description = "Generator failure", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn analyze_impact(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    generator: web::Data<dyn TextGenerator>,
    settings: web::Data<PipelineSettings>,
    path: web::Path<Uuid>,
    body: web::Json<ImpactAnalysisRequest>,
) -> AppResult<HttpResponse> {
    let project = authorize_project(&pool, &auth.principal, path.into_inner()).await?;

    let half = settings.half_input_chars();
    let code_change = require_text(&body.code_change_description, "code_change_description")?;
    let test_case = require_text(&body.test_case_description, "test_case_description")?;
    let code_change = prompts::truncate_chars(code_change, half);
    let test_case = prompts::truncate_chars(test_case, half);

    let source = format!(
        "Impact: {}",
        code_change.chars().take(80).collect::<String>()
    );
    let prompt = prompts::impact_prompt(&code_change, &test_case);

    run(
        &pool,
        generator.get_ref(),
        &settings,
        &project,
        AnalysisKind::ChangeImpact,
        &source,
        prompt,
    )
    .await
}

/// List a project's most recent analyses.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{project_id}/analyses",
    tag = "Analyses",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("kind" = Option<String>, Query, description = "defect_triage, automation_candidate or change_impact"),
        ("limit" = Option<u64>, Query, description = "Number of analyses (default 10, max 100)"),
    ),
    responses(
        (status = 200, description = "Recent analyses, newest first", body = AnalysisListResponse),
        (status = 403, description = "Project owned by another principal", body = crate::error::ErrorResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn list_analyses(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    query: web::Query<ListAnalysesQuery>,
) -> AppResult<HttpResponse> {
    let project = authorize_project(&pool, &auth.principal, path.into_inner()).await?;
    let limit = clamp_limit(query.limit, DEFAULT_ANALYSIS_LIMIT);

    let rows = pool
        .list_recent_analyses(project.id, query.kind, limit)
        .await?;
    let analyses = rows
        .into_iter()
        .map(AnalysisResponse::try_from)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(HttpResponse::Ok().json(AnalysisListResponse { analyses }))
}

/// Get one analysis.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{project_id}/analyses/{analysis_id}",
    tag = "Analyses",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("analysis_id" = Uuid, Path, description = "Analysis ID"),
    ),
    responses(
        (status = 200, description = "Analysis", body = AnalysisResponse),
        (status = 403, description = "Project owned by another principal", body = crate::error::ErrorResponse),
        (status = 404, description = "Project or analysis not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn get_analysis(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (project_id, analysis_id) = path.into_inner();
    let project = authorize_project(&pool, &auth.principal, project_id).await?;

    let row = pool
        .get_analysis(project.id, analysis_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Analysis {}", analysis_id)))?;

    Ok(HttpResponse::Ok().json(AnalysisResponse::try_from(row)?))
}

/// Configure analysis routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/projects/{project_id}/analyses").route(web::get().to(list_analyses)),
    )
    .service(
        web::resource("/projects/{project_id}/analyses/defect")
            .route(web::post().to(analyze_defect)),
    )
    .service(
        web::resource("/projects/{project_id}/analyses/automation")
            .route(web::post().to(analyze_automation)),
    )
    .service(
        web::resource("/projects/{project_id}/analyses/impact")
            .route(web::post().to(analyze_impact)),
    )
    .service(
        web::resource("/projects/{project_id}/analyses/{analysis_id}")
            .route(web::get().to(get_analysis)),
    );
}
