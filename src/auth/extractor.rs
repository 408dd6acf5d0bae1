//! Actix-web extractors for API key and admin key authentication.
//!
//! # Security
//! - Secret header values are wrapped in `SecretString` as soon as they are read
//! - Secret values are never logged or exposed in debug output
//! - The admin key is compared in constant time

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;
use secrecy::{ExposeSecret, SecretString};
use std::future::{Ready, ready};

use super::AdminKey;
use crate::config::{ADMIN_KEY_HEADER, API_KEY_HEADER};
use crate::db::DbPool;
use crate::error::AppError;
use crate::models::Principal;
use crate::services::api_key;

/// Extract a secret header value, wrapping it in SecretString.
/// Returns None if the header is missing, empty or invalid UTF-8.
fn extract_secret_header(req: &HttpRequest, header_name: &str) -> Option<SecretString> {
    req.headers()
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| SecretString::from(s.to_string()))
}

/// Extractor that requires a valid API key and yields its principal.
///
/// ```ignore
/// async fn protected_handler(auth: ApiKeyAuth) -> impl Responder {
///     // auth.principal identifies the caller
/// }
/// ```
pub struct ApiKeyAuth {
    pub principal: Principal,
}

impl FromRequest for ApiKeyAuth {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let pool = req.app_data::<web::Data<DbPool>>().cloned();
        let provided = extract_secret_header(req, API_KEY_HEADER);

        Box::pin(async move {
            let pool = pool.ok_or_else(|| {
                AppError::Database("Database pool is not configured".to_string())
            })?;
            let key = provided.ok_or_else(|| {
                AppError::Unauthorized("Missing API key. Provide X-API-Key header.".to_string())
            })?;

            let principal = api_key::verify_key(pool.get_ref(), key.expose_secret()).await?;
            Ok(ApiKeyAuth { principal })
        })
    }
}

/// Extractor that requires the bootstrap admin key.
pub struct AdminAuth;

impl FromRequest for AdminAuth {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let stored = req.app_data::<web::Data<AdminKey>>();
        let provided = extract_secret_header(req, ADMIN_KEY_HEADER);

        let verified = match (stored, provided) {
            (Some(stored), Some(provided)) => stored.verify(provided.expose_secret()),
            _ => false,
        };

        if verified {
            ready(Ok(AdminAuth))
        } else {
            ready(Err(AppError::Unauthorized(
                "Valid X-Admin-Key header required".to_string(),
            )))
        }
    }
}
