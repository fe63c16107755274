use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::google::models::{
    LinkedAccount, LinkedAccountAccess, NewLinkedAccountAccess, NewServiceAccountKey,
    NewServiceAccountRecord, ServiceAccount, ServiceAccountKey,
};

/// Storage handle for service accounts, their keys and linked Google accounts.
///
/// Every service operation receives this explicitly; implementations must
/// make inserts durable before returning.
#[async_trait]
pub trait ServiceAccountStore: Send + Sync {
    /// Service account for `(client_id, user_id)`. `client_id = None` selects
    /// the user's primary account.
    async fn find_service_account(
        &self,
        client_id: Option<&str>,
        user_id: &str,
    ) -> Result<Option<ServiceAccount>>;

    async fn insert_service_account(&self, record: NewServiceAccountRecord)
        -> Result<ServiceAccount>;

    /// First key of the account that still carries private key material.
    async fn find_usable_key(&self, service_account_id: Uuid) -> Result<Option<ServiceAccountKey>>;

    async fn insert_key(&self, key: NewServiceAccountKey) -> Result<ServiceAccountKey>;

    async fn find_linked_account(&self, user_id: &str) -> Result<Option<LinkedAccount>>;

    /// Proxy group membership of a linked account, if it was ever granted
    async fn find_linked_account_access(
        &self,
        linked_account_id: Uuid,
    ) -> Result<Option<LinkedAccountAccess>>;

    async fn insert_linked_account_access(
        &self,
        access: NewLinkedAccountAccess,
    ) -> Result<LinkedAccountAccess>;

    async fn update_linked_account_access_expiration(
        &self,
        access_id: Uuid,
        expires: i64,
    ) -> Result<LinkedAccountAccess>;

    /// Remove the linked account together with its proxy group membership row
    async fn delete_linked_account(&self, linked_account_id: Uuid) -> Result<()>;

    /// Proxy group recorded for the user by user sync, if any.
    async fn find_proxy_group_id(&self, user_id: &str) -> Result<Option<String>>;
}

/// Postgres-backed [`ServiceAccountStore`]
pub struct PgServiceAccountStore {
    pool: PgPool,
}

impl PgServiceAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceAccountStore for PgServiceAccountStore {
    async fn find_service_account(
        &self,
        client_id: Option<&str>,
        user_id: &str,
    ) -> Result<Option<ServiceAccount>> {
        sqlx::query_as::<_, ServiceAccount>(
            r#"
            SELECT id, google_unique_id, client_id, user_id, email, created_at
            FROM google_service_account
            WHERE client_id IS NOT DISTINCT FROM $1 AND user_id = $2
            LIMIT 1
            "#,
        )
        .bind(client_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get service account: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn insert_service_account(
        &self,
        record: NewServiceAccountRecord,
    ) -> Result<ServiceAccount> {
        let mut tx = self.pool.begin().await?;

        let account = sqlx::query_as::<_, ServiceAccount>(
            r#"
            INSERT INTO google_service_account (id, google_unique_id, client_id, user_id, email)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, google_unique_id, client_id, user_id, email, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&record.google_unique_id)
        .bind(&record.client_id)
        .bind(&record.user_id)
        .bind(&record.email)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert service account: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await?;

        Ok(account)
    }

    async fn find_usable_key(&self, service_account_id: Uuid) -> Result<Option<ServiceAccountKey>> {
        sqlx::query_as::<_, ServiceAccountKey>(
            r#"
            SELECT id, key_id, service_account_id, expires, private_key, created_at
            FROM google_service_account_key
            WHERE service_account_id = $1 AND private_key IS NOT NULL
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(service_account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get service account key: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn insert_key(&self, key: NewServiceAccountKey) -> Result<ServiceAccountKey> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ServiceAccountKey>(
            r#"
            INSERT INTO google_service_account_key (id, key_id, service_account_id, expires, private_key)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, key_id, service_account_id, expires, private_key, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&key.key_id)
        .bind(key.service_account_id)
        .bind(key.expires)
        .bind(key.private_key.map(Json))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert service account key: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await?;

        Ok(row)
    }

    async fn find_linked_account(&self, user_id: &str) -> Result<Option<LinkedAccount>> {
        sqlx::query_as::<_, LinkedAccount>(
            r#"
            SELECT id, email, user_id
            FROM user_google_account
            WHERE user_id = $1
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get linked Google account: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_linked_account_access(
        &self,
        linked_account_id: Uuid,
    ) -> Result<Option<LinkedAccountAccess>> {
        sqlx::query_as::<_, LinkedAccountAccess>(
            r#"
            SELECT id, user_google_account_id, proxy_group_id, expires
            FROM user_google_account_to_proxy_group
            WHERE user_google_account_id = $1
            "#,
        )
        .bind(linked_account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get linked account access: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn insert_linked_account_access(
        &self,
        access: NewLinkedAccountAccess,
    ) -> Result<LinkedAccountAccess> {
        sqlx::query_as::<_, LinkedAccountAccess>(
            r#"
            INSERT INTO user_google_account_to_proxy_group (id, user_google_account_id, proxy_group_id, expires)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_google_account_id, proxy_group_id, expires
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(access.user_google_account_id)
        .bind(&access.proxy_group_id)
        .bind(access.expires)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert linked account access: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn update_linked_account_access_expiration(
        &self,
        access_id: Uuid,
        expires: i64,
    ) -> Result<LinkedAccountAccess> {
        sqlx::query_as::<_, LinkedAccountAccess>(
            r#"
            UPDATE user_google_account_to_proxy_group
            SET expires = $2
            WHERE id = $1
            RETURNING id, user_google_account_id, proxy_group_id, expires
            "#,
        )
        .bind(access_id)
        .bind(expires)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update linked account access: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn delete_linked_account(&self, linked_account_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_google_account_to_proxy_group WHERE user_google_account_id = $1")
            .bind(linked_account_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM user_google_account WHERE id = $1")
            .bind(linked_account_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete linked account: {:?}", e);
                AppError::Database(e)
            })?;

        tx.commit().await?;

        Ok(())
    }

    async fn find_proxy_group_id(&self, user_id: &str) -> Result<Option<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT id FROM google_proxy_group WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get proxy group: {:?}", e);
            AppError::Database(e)
        })
    }
}
