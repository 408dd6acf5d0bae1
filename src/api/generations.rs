//! Test case generation handlers.
//!
//! Every handler resolves the project for the caller and validates its input
//! before the generator is invoked.

use actix_web::{HttpResponse, web};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use uuid::Uuid;

use crate::auth::ApiKeyAuth;
use crate::db::DbPool;
use crate::entity::project;
use crate::error::{AppError, AppResult};
use crate::models::{
    DesignGenerationRequest, DocumentGenerationRequest, GenerationResponse, ImageGenerationRequest,
    ShapeHint, TextGenerationRequest,
};
use crate::services::generator::{PromptPart, TextGenerator};
use crate::services::pipeline::{self, PipelineSettings};
use crate::services::prompts;
use crate::services::tenancy::authorize_project;

/// Document types whose extracted text is accepted.
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "docx"];

/// Image types accepted for screenshot generation.
const IMAGE_MIME_TYPES: &[&str] = &["image/png", "image/jpeg"];

/// Maximum screenshots per request.
const MAX_IMAGES: usize = 10;

pub(crate) fn require_text<'a>(value: &'a str, field: &str) -> AppResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "Missing or empty '{}' field",
            field
        )));
    }
    Ok(value)
}

/// Lower-cased extension of `file_name`, if it has one.
fn file_extension(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

fn respond(response: GenerationResponse) -> HttpResponse {
    if response.persisted() {
        HttpResponse::Created().json(response)
    } else {
        HttpResponse::Ok().json(response)
    }
}

async fn run(
    pool: &DbPool,
    generator: &dyn TextGenerator,
    settings: &PipelineSettings,
    project: &project::Model,
    source: &str,
    parts: &[PromptPart],
    shape: ShapeHint,
) -> AppResult<HttpResponse> {
    let response =
        pipeline::generate_test_cases(pool, generator, settings, project, source, parts, shape)
            .await?;
    Ok(respond(response))
}

/// Generate test cases from requirement text.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{project_id}/generations/text",
    tag = "Generations",
    params(
        ("project_id" = Uuid, Path, description = "Project ID")
    ),
    request_body = TextGenerationRequest,
    responses(
        (status = 201, description = "Test cases generated and persisted", body = GenerationResponse),
        (status = 200, description = "Empty result, or raw text with a warning when the output could not be parsed", body = GenerationResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 403, description = "Project owned by another principal", body = crate::error::ErrorResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
        (status = 502, description = "Generator failure", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn generate_from_text(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    generator: web::Data<dyn TextGenerator>,
    settings: web::Data<PipelineSettings>,
    path: web::Path<Uuid>,
    body: web::Json<TextGenerationRequest>,
) -> AppResult<HttpResponse> {
    let project = authorize_project(&pool, &auth.principal, path.into_inner()).await?;

    let requirements = require_text(&body.requirements, "requirements")?;
    let requirements = prompts::truncate_chars(requirements, settings.max_input_chars);
    let parts = [PromptPart::text(prompts::requirements_prompt(
        &requirements,
        body.shape,
    ))];

    run(
        &pool,
        generator.get_ref(),
        &settings,
        &project,
        "Text Input",
        &parts,
        body.shape,
    )
    .await
}

/// Generate test cases from text extracted from a PDF or DOCX document.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{project_id}/generations/document",
    tag = "Generations",
    params(
        ("project_id" = Uuid, Path, description = "Project ID")
    ),
    request_body = DocumentGenerationRequest,
    responses(
        (status = 201, description = "Test cases generated and persisted", body = GenerationResponse),
        (status = 200, description = "Empty result, or raw text with a warning", body = GenerationResponse),
        (status = 400, description = "Unsupported file type or empty text", body = crate::error::ErrorResponse),
        (status = 403, description = "Project owned by another principal", body = crate::error::ErrorResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
        (status = 502, description = "Generator failure", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn generate_from_document(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    generator: web::Data<dyn TextGenerator>,
    settings: web::Data<PipelineSettings>,
    path: web::Path<Uuid>,
    body: web::Json<DocumentGenerationRequest>,
) -> AppResult<HttpResponse> {
    let project = authorize_project(&pool, &auth.principal, path.into_inner()).await?;

    let file_name = require_text(&body.file_name, "file_name")?;
    match file_extension(file_name) {
        Some(ext) if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) => {}
        _ => {
            return Err(AppError::InvalidInput(
                "File type not allowed. Please upload PDF or DOCX.".to_string(),
            ));
        }
    }
    let text = require_text(&body.extracted_text, "extracted_text").map_err(|_| {
        AppError::InvalidInput(
            "Could not extract text from the file or file is empty.".to_string(),
        )
    })?;
    let text = prompts::truncate_chars(text, settings.max_input_chars);

    let source = format!("File: {}", file_name);
    let parts = [PromptPart::text(prompts::document_prompt(
        file_name, &text, body.shape,
    ))];

    run(
        &pool,
        generator.get_ref(),
        &settings,
        &project,
        &source,
        &parts,
        body.shape,
    )
    .await
}

/// Generate UI test cases from text flattened out of a design file.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{project_id}/generations/design",
    tag = "Generations",
    params(
        ("project_id" = Uuid, Path, description = "Project ID")
    ),
    request_body = DesignGenerationRequest,
    responses(
        (status = 201, description = "Test cases generated and persisted", body = GenerationResponse),
        (status = 200, description = "Empty result, or raw text with a warning", body = GenerationResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 403, description = "Project owned by another principal", body = crate::error::ErrorResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
        (status = 502, description = "Generator failure", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn generate_from_design(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    generator: web::Data<dyn TextGenerator>,
    settings: web::Data<PipelineSettings>,
    path: web::Path<Uuid>,
    body: web::Json<DesignGenerationRequest>,
) -> AppResult<HttpResponse> {
    let project = authorize_project(&pool, &auth.principal, path.into_inner()).await?;

    let file_key = require_text(&body.file_key, "file_key")?;
    if !file_key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(AppError::InvalidInput(
            "'file_key' may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }
    let text = require_text(&body.extracted_text, "extracted_text").map_err(|_| {
        AppError::InvalidInput(
            "Could not extract any text content from the design file.".to_string(),
        )
    })?;
    let text = prompts::truncate_chars(text, settings.max_input_chars);

    let source = format!("Figma File ({})", file_key);
    let parts = [PromptPart::text(prompts::design_prompt(
        file_key, &text, body.shape,
    ))];

    run(
        &pool,
        generator.get_ref(),
        &settings,
        &project,
        &source,
        &parts,
        body.shape,
    )
    .await
}

/// Generate UI test cases from screenshots.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{project_id}/generations/images",
    tag = "Generations",
    params(
        ("project_id" = Uuid, Path, description = "Project ID")
    ),
    request_body = ImageGenerationRequest,
    responses(
        (status = 201, description = "Test cases generated and persisted", body = GenerationResponse),
        (status = 200, description = "Empty result, or raw text with a warning", body = GenerationResponse),
        (status = 400, description = "No images, unsupported type or invalid base64", body = crate::error::ErrorResponse),
        (status = 403, description = "Project owned by another principal", body = crate::error::ErrorResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
        (status = 502, description = "Generator failure", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn generate_from_images(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    generator: web::Data<dyn TextGenerator>,
    settings: web::Data<PipelineSettings>,
    path: web::Path<Uuid>,
    body: web::Json<ImageGenerationRequest>,
) -> AppResult<HttpResponse> {
    let project = authorize_project(&pool, &auth.principal, path.into_inner()).await?;
    let req = body.into_inner();

    if req.images.is_empty() {
        return Err(AppError::InvalidInput(
            "At least one image is required".to_string(),
        ));
    }
    if req.images.len() > MAX_IMAGES {
        return Err(AppError::InvalidInput(format!(
            "At most {} images are accepted per request",
            MAX_IMAGES
        )));
    }

    let mut names = Vec::with_capacity(req.images.len());
    let mut image_parts = Vec::with_capacity(req.images.len());
    for image in &req.images {
        let name = require_text(&image.file_name, "file_name")?;
        let mime_type = image.mime_type.trim().to_ascii_lowercase();
        if !IMAGE_MIME_TYPES.contains(&mime_type.as_str()) {
            return Err(AppError::InvalidInput(format!(
                "Unsupported image type '{}' for {}; use PNG or JPEG",
                image.mime_type, name
            )));
        }
        let data = BASE64.decode(image.data_base64.trim()).map_err(|e| {
            AppError::InvalidInput(format!("Invalid base64 data for {}: {}", name, e))
        })?;
        if data.is_empty() {
            return Err(AppError::InvalidInput(format!("Image {} is empty", name)));
        }
        names.push(name);
        image_parts.push(PromptPart::Image { mime_type, data });
    }

    let context = req
        .context
        .as_deref()
        .map(|c| prompts::truncate_chars(c, settings.half_input_chars()));
    let mut parts = vec![PromptPart::text(prompts::images_prompt(
        &names,
        context.as_deref(),
        req.shape,
    ))];
    parts.extend(image_parts);

    let source = format!("Images: {}", names.join(", "));

    run(
        &pool,
        generator.get_ref(),
        &settings,
        &project,
        &source,
        &parts,
        req.shape,
    )
    .await
}

/// Configure generation routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/projects/{project_id}/generations/text")
            .route(web::post().to(generate_from_text)),
    )
    .service(
        web::resource("/projects/{project_id}/generations/document")
            .route(web::post().to(generate_from_document)),
    )
    .service(
        web::resource("/projects/{project_id}/generations/design")
            .route(web::post().to(generate_from_design)),
    )
    .service(
        web::resource("/projects/{project_id}/generations/images")
            .route(web::post().to(generate_from_images)),
    );
}
