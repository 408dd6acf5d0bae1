//! API key and principal models.
//!
//! Every API key is a principal: projects are owned by the key that created them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// API key stored in database.
#[derive(Debug, Clone)]
pub struct ApiKey {
    pub id: Uuid,
    /// SHA-256 hash of the full key
    pub key_hash: String,
    /// First characters of the key for identification
    pub key_prefix: String,
    /// Human-readable name (e.g., "QA team laptop")
    pub name: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    /// Check if the key is revoked.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Check if the key is expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expires_at| Utc::now() > expires_at)
    }
}

impl From<crate::entity::api_key::Model> for ApiKey {
    fn from(m: crate::entity::api_key::Model) -> Self {
        Self {
            id: m.id,
            key_hash: m.key_hash,
            key_prefix: m.key_prefix,
            name: m.name,
            expires_at: m.expires_at,
            last_used_at: m.last_used_at,
            created_at: m.created_at,
            revoked_at: m.revoked_at,
        }
    }
}

/// Response when creating a new API key (includes the full key).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiKeyCreateResponse {
    pub id: Uuid,
    /// Full key - only shown once
    pub key: String,
    pub name: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Response for listing API keys (key masked).
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiKeyListItem {
    pub id: Uuid,
    pub key_prefix: String,
    pub name: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub is_revoked: bool,
}

impl From<ApiKey> for ApiKeyListItem {
    fn from(key: ApiKey) -> Self {
        Self {
            is_revoked: key.is_revoked(),
            id: key.id,
            key_prefix: key.key_prefix,
            name: key.name,
            expires_at: key.expires_at,
            last_used_at: key.last_used_at,
            created_at: key.created_at,
        }
    }
}

/// Request to create a new API key.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateApiKeyRequest {
    pub name: String,
    /// Expiration duration (e.g., "365d", "30d", "1y")
    #[serde(default)]
    pub expires_in: Option<String>,
}

/// Verified principal for the current request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
    pub key_prefix: String,
}
