use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::ROLE_ADMIN;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Local user identifier (`sub`)
    pub sub: String,
    /// OAuth client the token was issued to (`azp`), absent for first-party logins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// User's Google proxy group, when the identity provider includes it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_group_id: Option<String>,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }
}

/// `context` claim of access tokens
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenContext {
    #[serde(default)]
    pub user: TokenContextUser,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenContextUser {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub google: Option<TokenGoogleContext>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenGoogleContext {
    #[serde(default)]
    pub proxy_group: Option<String>,
}
