//! API key management endpoints (admin key required).

use actix_web::{HttpResponse, delete, get, post, web};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AdminAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{ApiKeyCreateResponse, ApiKeyListItem, CreateApiKeyRequest};
use crate::services::api_key;

/// Configure auth admin routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_api_key)
        .service(list_api_keys)
        .service(revoke_api_key);
}

/// Create a new API key (a new principal).
///
/// POST /api/v1/auth/keys
/// Authorization: X-Admin-Key
#[utoipa::path(
    post,
    path = "/api/v1/auth/keys",
    tag = "Auth",
    request_body = CreateApiKeyRequest,
    responses(
        (status = 201, description = "API key created", body = ApiKeyCreateResponse),
        (status = 401, description = "Unauthorized - admin key required"),
        (status = 400, description = "Invalid input")
    ),
    security(
        ("admin_key" = [])
    )
)]
#[post("/auth/keys")]
pub async fn create_api_key(
    _admin: AdminAuth,
    body: web::Json<CreateApiKeyRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let (full_key, api_key) =
        api_key::create_key(pool.get_ref(), &body.name, body.expires_in.as_deref()).await?;

    info!(key_prefix = %api_key.key_prefix, name = %api_key.name, "API key created");

    Ok(HttpResponse::Created().json(ApiKeyCreateResponse {
        id: api_key.id,
        key: full_key,
        name: api_key.name,
        expires_at: api_key.expires_at,
        created_at: api_key.created_at,
    }))
}

/// List all API keys.
///
/// GET /api/v1/auth/keys
/// Authorization: X-Admin-Key
#[utoipa::path(
    get,
    path = "/api/v1/auth/keys",
    tag = "Auth",
    responses(
        (status = 200, description = "List of API keys", body = ListApiKeysResponse),
        (status = 401, description = "Unauthorized - admin key required")
    ),
    security(
        ("admin_key" = [])
    )
)]
#[get("/auth/keys")]
pub async fn list_api_keys(_admin: AdminAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let keys = pool.list_api_keys().await?;
    let items: Vec<ApiKeyListItem> = keys.into_iter().map(ApiKeyListItem::from).collect();

    Ok(HttpResponse::Ok().json(ListApiKeysResponse { keys: items }))
}

/// Revoke an API key. Projects owned by the key are kept.
///
/// DELETE /api/v1/auth/keys/{id}
/// Authorization: X-Admin-Key
#[utoipa::path(
    delete,
    path = "/api/v1/auth/keys/{id}",
    tag = "Auth",
    params(
        ("id" = Uuid, Path, description = "API key UUID")
    ),
    responses(
        (status = 200, description = "API key revoked", body = RevokeApiKeyResponse),
        (status = 401, description = "Unauthorized - admin key required"),
        (status = 404, description = "API key not found or already revoked")
    ),
    security(
        ("admin_key" = [])
    )
)]
#[delete("/auth/keys/{id}")]
pub async fn revoke_api_key(
    _admin: AdminAuth,
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    if pool.revoke_api_key(id).await? {
        info!(key_id = %id, "API key revoked");
        Ok(HttpResponse::Ok().json(RevokeApiKeyResponse {
            message: "API key revoked".to_string(),
            id,
        }))
    } else {
        Err(AppError::NotFound(format!("Active API key {}", id)))
    }
}

// Response types

#[derive(Debug, Serialize, ToSchema)]
pub struct ListApiKeysResponse {
    keys: Vec<ApiKeyListItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevokeApiKeyResponse {
    message: String,
    id: Uuid,
}
