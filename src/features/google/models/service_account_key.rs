use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use super::GoogleCredentials;

/// Database model for a key issued to a service account
#[derive(Debug, Clone, FromRow)]
pub struct ServiceAccountKey {
    pub id: Uuid,
    pub key_id: String,
    pub service_account_id: Uuid,
    /// Unix timestamp (seconds); advisory, enforced by external cleanup
    pub expires: i64,
    /// Credential payload; `None` once rotated out or when only an expiration was recorded
    pub private_key: Option<Json<GoogleCredentials>>,
    pub created_at: DateTime<Utc>,
}

impl ServiceAccountKey {
    /// Only keys that still carry private key material can sign anything
    pub fn is_usable(&self) -> bool {
        self.private_key.is_some()
    }

    pub fn credentials(&self) -> Option<&GoogleCredentials> {
        self.private_key.as_ref().map(|json| &json.0)
    }
}

/// Values for a new key row
#[derive(Debug, Clone)]
pub struct NewServiceAccountKey {
    pub key_id: String,
    pub service_account_id: Uuid,
    pub expires: i64,
    pub private_key: Option<GoogleCredentials>,
}
