use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::google::models::{LinkedAccountAccess, ServiceAccountKeyInfo};

/// Keys of the caller's service account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessKeysResponseDto {
    pub access_keys: Vec<ServiceAccountKeyInfo>,
}

/// Query params for minting a key for the caller's client
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct CreateKeyQuery {
    /// Requested key lifetime in seconds; recorded as the key's expiration
    #[param(minimum = 1)]
    pub expires_in: Option<i64>,
}

/// Query params for the primary key
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct PrimaryKeyQuery {
    /// Unix time at which a newly minted key expires. Ignored when a stored key exists.
    #[param(minimum = 0)]
    pub expires: Option<i64>,
    /// Mint a new primary key even when a stored one exists
    #[serde(default)]
    pub force: bool,
}

/// Linked Google account of the caller
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LinkedAccountResponseDto {
    pub linked_email: Option<String>,
}

/// Proxy group access of the caller's linked Google account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LinkedAccountAccessResponseDto {
    pub proxy_group_id: String,
    /// Unix timestamp (seconds) when access ends
    pub expires: i64,
}

impl From<LinkedAccountAccess> for LinkedAccountAccessResponseDto {
    fn from(access: LinkedAccountAccess) -> Self {
        Self {
            proxy_group_id: access.proxy_group_id,
            expires: access.expires,
        }
    }
}
