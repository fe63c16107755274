use sqlx::FromRow;
use uuid::Uuid;

/// External Google account linked to a local user
#[derive(Debug, Clone, FromRow)]
pub struct LinkedAccount {
    pub id: Uuid,
    pub email: String,
    pub user_id: String,
}

/// Membership of a linked account in its owner's proxy group
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct LinkedAccountAccess {
    pub id: Uuid,
    pub user_google_account_id: Uuid,
    pub proxy_group_id: String,
    /// Unix timestamp (seconds) after which access should be revoked
    pub expires: i64,
}

#[derive(Debug, Clone)]
pub struct NewLinkedAccountAccess {
    pub user_google_account_id: Uuid,
    pub proxy_group_id: String,
    pub expires: i64,
}
