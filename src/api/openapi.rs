//! OpenAPI documentation configuration.

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

use crate::config::{ADMIN_KEY_HEADER, API_KEY_HEADER};
use crate::{api, error, models, services};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Casegen Server",
        version = "0.1.0",
        description = "Generates test cases and QA analyses from requirements, documents, designs and screenshots, and stores them per project"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Project endpoints
        api::projects::create_project,
        api::projects::list_projects,
        api::projects::get_project,
        api::projects::delete_project,
        api::projects::get_project_stats,
        // Generation endpoints
        api::generations::generate_from_text,
        api::generations::generate_from_document,
        api::generations::generate_from_design,
        api::generations::generate_from_images,
        // Test case and batch endpoints
        api::test_cases::list_test_cases,
        api::test_cases::create_test_case,
        api::test_cases::get_test_case,
        api::test_cases::update_test_case,
        api::test_cases::delete_test_case,
        api::test_cases::list_batches,
        api::test_cases::get_batch,
        api::test_cases::delete_batch,
        // Analysis endpoints
        api::analyses::analyze_defect,
        api::analyses::analyze_automation,
        api::analyses::analyze_impact,
        api::analyses::list_analyses,
        api::analyses::get_analysis,
        // Auth endpoints
        services::auth_admin::create_api_key,
        services::auth_admin::list_api_keys,
        services::auth_admin::revoke_api_key,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Projects
            models::Project,
            models::CreateProjectRequest,
            models::ProjectStats,
            models::SeverityCount,
            api::projects::ProjectListResponse,
            // Generations
            models::ShapeHint,
            models::TextGenerationRequest,
            models::DocumentGenerationRequest,
            models::DesignGenerationRequest,
            models::ImageInput,
            models::ImageGenerationRequest,
            models::GenerationResponse,
            // Test cases and batches
            models::Classification,
            models::TestCaseResponse,
            models::CreateTestCaseRequest,
            models::UpdateTestCaseRequest,
            models::TestCaseListResponse,
            models::BatchSummary,
            models::BatchDetail,
            api::test_cases::BatchListResponse,
            // Analyses
            models::AnalysisKind,
            models::DefectTriage,
            models::AutomationCandidate,
            models::ChangeImpact,
            models::DefectAnalysisRequest,
            models::AutomationAnalysisRequest,
            models::ImpactAnalysisRequest,
            models::AnalysisResponse,
            api::analyses::AnalysisListResponse,
            // Auth
            models::ApiKeyCreateResponse,
            models::ApiKeyListItem,
            models::CreateApiKeyRequest,
            services::auth_admin::ListApiKeysResponse,
            services::auth_admin::RevokeApiKeyResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Projects", description = "Project ownership and statistics"),
        (name = "Generations", description = "Generate and persist test cases"),
        (name = "Test Cases", description = "Browse and edit persisted test cases"),
        (name = "Batches", description = "Generation batches"),
        (name = "Analyses", description = "Defect triage, automation and impact analyses"),
        (name = "Auth", description = "API key management")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add API key and admin key security schemes.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(API_KEY_HEADER))),
            );
            components.add_security_scheme(
                "admin_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(ADMIN_KEY_HEADER))),
            );
        }
    }
}
