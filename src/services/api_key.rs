//! API key service for generation, verification, and management.

use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{ApiKey, Principal};

/// API key prefix.
const KEY_PREFIX: &str = "cg_";
/// Length of random part of the key.
const KEY_RANDOM_LENGTH: usize = 40;
/// Length of the key prefix stored for identification.
pub const KEY_PREFIX_LEN: usize = 8;
/// Column width of `api_keys.name`.
const MAX_KEY_NAME_LEN: usize = 200;

/// Generate a new random API key.
///
/// Returns the full key (to be shown to user once) and the key data for storage.
pub fn generate_key(name: &str, expires_in: Option<&str>) -> AppResult<(String, ApiKey)> {
    if name.trim().is_empty() {
        return Err(AppError::InvalidInput("Name is required".to_string()));
    }
    if name.trim().chars().count() > MAX_KEY_NAME_LEN {
        return Err(AppError::InvalidInput(format!(
            "Name must be at most {} characters",
            MAX_KEY_NAME_LEN
        )));
    }

    let expires_at = match expires_in.map(str::trim).filter(|s| !s.is_empty()) {
        Some(spec) => Some(
            Utc::now()
                + parse_duration(spec).ok_or_else(|| {
                    AppError::InvalidInput(format!("Invalid expiration '{}'", spec))
                })?,
        ),
        None => None,
    };

    let random_part: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(KEY_RANDOM_LENGTH)
        .map(char::from)
        .collect();
    let full_key = format!("{}{}", KEY_PREFIX, random_part);

    let api_key = ApiKey {
        id: Uuid::now_v7(),
        key_hash: hash_key(&full_key),
        key_prefix: full_key.chars().take(KEY_PREFIX_LEN).collect(),
        name: name.trim().to_string(),
        expires_at,
        last_used_at: None,
        created_at: Utc::now(),
        revoked_at: None,
    };

    Ok((full_key, api_key))
}

/// Hash an API key using SHA-256.
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Parse a duration string like "365d", "30d", "1y", "6m", "2w".
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim().to_lowercase();

    let days = if let Some(days) = s.strip_suffix('d') {
        days.parse::<i64>().ok()
    } else if let Some(years) = s.strip_suffix('y') {
        years.parse::<i64>().ok().map(|y| y * 365)
    } else if let Some(months) = s.strip_suffix('m') {
        months.parse::<i64>().ok().map(|m| m * 30)
    } else if let Some(weeks) = s.strip_suffix('w') {
        weeks.parse::<i64>().ok().map(|w| w * 7)
    } else {
        s.parse::<i64>().ok()
    }?;

    if days <= 0 {
        return None;
    }
    Duration::try_days(days)
}

/// Verify an API key and return the principal it identifies.
pub async fn verify_key(pool: &DbPool, key: &str) -> AppResult<Principal> {
    let api_key = pool
        .find_api_key_by_hash(&hash_key(key))
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid API key".to_string()))?;

    if api_key.is_revoked() {
        return Err(AppError::Unauthorized(
            "API key has been revoked".to_string(),
        ));
    }

    if api_key.is_expired() {
        return Err(AppError::Unauthorized("API key has expired".to_string()));
    }

    // Usage tracking must not fail the request
    if let Err(e) = pool.touch_api_key(api_key.id).await {
        tracing::debug!("Failed to record API key usage: {}", e);
    }

    Ok(Principal {
        id: api_key.id,
        name: api_key.name,
        key_prefix: api_key.key_prefix,
    })
}

/// Create a new API key and store it in the database.
pub async fn create_key(
    pool: &DbPool,
    name: &str,
    expires_in: Option<&str>,
) -> AppResult<(String, ApiKey)> {
    let (full_key, api_key) = generate_key(name, expires_in)?;
    pool.insert_api_key(&api_key).await?;
    Ok((full_key, api_key))
}
