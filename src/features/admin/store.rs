use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::admin::models::{AccessGroup, Project};

/// Storage handle for access groups and their projects
#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn find_group_by_name(&self, name: &str) -> Result<Option<AccessGroup>>;

    async fn insert_group(&self, name: &str, description: Option<&str>) -> Result<AccessGroup>;

    async fn list_groups(&self) -> Result<Vec<AccessGroup>>;

    async fn delete_group(&self, group_id: Uuid) -> Result<()>;

    /// Names of the group's projects, sorted
    async fn group_project_names(&self, group_id: Uuid) -> Result<Vec<String>>;

    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>>;

    async fn insert_project(&self, name: &str, auth_id: &str) -> Result<Project>;

    /// Link all projects to the group or none of them. Existing links are kept.
    async fn add_projects_to_group(&self, group_id: Uuid, project_ids: &[Uuid]) -> Result<()>;
}

/// Convert a write error into a `Conflict` when it hits a unique constraint
fn handle_db_error(e: sqlx::Error, duplicate: impl FnOnce() -> String) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        // PostgreSQL unique_violation
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23505")) {
            return AppError::Conflict(duplicate());
        }

        // PostgreSQL foreign_key_violation
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23503")) {
            return AppError::BadRequest("Referenced record does not exist.".to_string());
        }
    }

    AppError::Database(e)
}

/// Postgres-backed [`GroupStore`]
pub struct PgGroupStore {
    pool: PgPool,
}

impl PgGroupStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupStore for PgGroupStore {
    async fn find_group_by_name(&self, name: &str) -> Result<Option<AccessGroup>> {
        sqlx::query_as::<_, AccessGroup>(
            r#"
            SELECT id, name, description FROM access_group WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get group by name: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn insert_group(&self, name: &str, description: Option<&str>) -> Result<AccessGroup> {
        sqlx::query_as::<_, AccessGroup>(
            r#"
            INSERT INTO access_group (id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, description
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create group: {:?}", e);
            handle_db_error(e, || format!("Group {} already exists", name))
        })
    }

    async fn list_groups(&self) -> Result<Vec<AccessGroup>> {
        sqlx::query_as::<_, AccessGroup>(
            r#"
            SELECT id, name, description FROM access_group ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list groups: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn delete_group(&self, group_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM access_group WHERE id = $1")
            .bind(group_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete group: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }

    async fn group_project_names(&self, group_id: Uuid) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.name
            FROM access_group_project agp
            JOIN project p ON p.id = agp.project_id
            WHERE agp.group_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list group projects: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, auth_id FROM project WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get project by name: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn insert_project(&self, name: &str, auth_id: &str) -> Result<Project> {
        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO project (id, name, auth_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, auth_id
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .bind(auth_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create project: {:?}", e);
            handle_db_error(e, || format!("Project {} already exists", name))
        })
    }

    async fn add_projects_to_group(&self, group_id: Uuid, project_ids: &[Uuid]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for project_id in project_ids {
            sqlx::query(
                r#"
                INSERT INTO access_group_project (group_id, project_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(group_id)
            .bind(project_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to add project to group: {:?}", e);
                handle_db_error(e, || "Project is already in the group".to_string())
            })?;
        }

        tx.commit().await?;

        Ok(())
    }
}
