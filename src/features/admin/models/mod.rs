use sqlx::FromRow;
use uuid::Uuid;

/// Access group granting its members a set of projects
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AccessGroup {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub auth_id: String,
}
