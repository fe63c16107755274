use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a Google service account bound to a (client, user) pair
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ServiceAccount {
    pub id: Uuid,
    pub google_unique_id: String,
    /// `None` for the user's primary service account
    pub client_id: Option<String>,
    pub user_id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl ServiceAccount {
    pub fn is_primary(&self) -> bool {
        self.client_id.is_none()
    }
}

/// Values for a new service account row
#[derive(Debug, Clone)]
pub struct NewServiceAccountRecord {
    pub google_unique_id: String,
    pub client_id: Option<String>,
    pub user_id: String,
    pub email: String,
}
