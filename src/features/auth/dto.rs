use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::model::AuthenticatedUser;

/// DTO for /api/auth/me response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponseDto {
    pub user_id: String,
    pub client_id: Option<String>,
    pub proxy_group_id: Option<String>,
    pub roles: Vec<String>,
}

impl From<AuthenticatedUser> for MeResponseDto {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            user_id: user.sub,
            client_id: user.client_id,
            proxy_group_id: user.proxy_group_id,
            roles: user.roles,
        }
    }
}
