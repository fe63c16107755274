use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::google::clients::{valid_service_account_id_for_client, GoogleCloudProvider};
use crate::features::google::models::{
    GoogleCredentials, NewServiceAccountKey, NewServiceAccountRecord, ServiceAccount,
    ServiceAccountKey, ServiceAccountKeyInfo,
};
use crate::features::google::store::ServiceAccountStore;

/// Service for provisioning service accounts and issuing their keys
pub struct ServiceAccountService {
    store: Arc<dyn ServiceAccountStore>,
    cloud: Arc<dyn GoogleCloudProvider>,
    /// Seconds added to "now" when a primary key is minted without an expiration
    default_key_expires_in: i64,
}

impl ServiceAccountService {
    pub fn new(
        store: Arc<dyn ServiceAccountStore>,
        cloud: Arc<dyn GoogleCloudProvider>,
        default_key_expires_in: i64,
    ) -> Self {
        Self {
            store,
            cloud,
            default_key_expires_in,
        }
    }

    /// Stored service account for the pair; `client_id = None` is the user's primary account
    pub async fn get_service_account_for_client(
        &self,
        client_id: Option<&str>,
        user_id: &str,
    ) -> Result<Option<ServiceAccount>> {
        self.store.find_service_account(client_id, user_id).await
    }

    /// Proxy group from the caller's token, falling back to the one recorded by user sync
    pub async fn resolve_proxy_group(
        &self,
        user_id: &str,
        from_token: Option<&str>,
    ) -> Result<Option<String>> {
        match from_token {
            Some(group) => Ok(Some(group.to_string())),
            None => self.store.find_proxy_group_id(user_id).await,
        }
    }

    /// Create the client's service account inside the user's proxy group and persist it
    pub async fn create_service_account_for_client(
        &self,
        client_id: &str,
        user_id: &str,
        proxy_group_id: Option<&str>,
    ) -> Result<ServiceAccount> {
        let proxy_group_id = proxy_group_id.ok_or_else(|| {
            AppError::NotFound(
                "Could not find Google proxy group for current user in the given token."
                    .to_string(),
            )
        })?;

        let account_id = valid_service_account_id_for_client(Some(client_id), user_id);

        let created = self
            .cloud
            .create_service_account_for_proxy_group(proxy_group_id, &account_id)
            .await?;

        let account = self
            .store
            .insert_service_account(NewServiceAccountRecord {
                google_unique_id: created.unique_id,
                client_id: Some(client_id.to_string()),
                user_id: user_id.to_string(),
                email: created.email,
            })
            .await?;

        tracing::info!(
            "Provisioned service account {} for client {} and user {}",
            account.email,
            client_id,
            user_id
        );

        Ok(account)
    }

    /// Mint a key for the caller's (client, user) account, provisioning the
    /// account first when a client is given and none exists yet.
    pub async fn create_access_key_for_client(
        &self,
        client_id: Option<&str>,
        user_id: &str,
        proxy_group_id: Option<&str>,
    ) -> Result<(GoogleCredentials, ServiceAccount)> {
        let account = match self.get_service_account_for_client(client_id, user_id).await? {
            Some(account) => account,
            None => match client_id {
                Some(client_id) => {
                    self.create_service_account_for_client(client_id, user_id, proxy_group_id)
                        .await?
                }
                None => {
                    return Err(AppError::NotFound(
                        "Could not find client id in `azp` field of token. Cannot create Google key."
                            .to_string(),
                    ))
                }
            },
        };

        let key = self.cloud.get_access_key(&account.google_unique_id).await?;

        Ok((key, account))
    }

    /// Return the user's persisted primary key, or mint and persist one.
    ///
    /// An existing key is returned as-is: `expires` only applies when a new
    /// key has to be created. The second element is the cached row on a hit.
    pub async fn get_or_create_primary_key(
        &self,
        user_id: &str,
        proxy_group_id: Option<&str>,
        expires: Option<i64>,
    ) -> Result<(GoogleCredentials, Option<ServiceAccountKey>)> {
        let account = self.require_primary_account(user_id).await?;

        let stored = self
            .store
            .find_usable_key(account.id)
            .await?
            .filter(ServiceAccountKey::is_usable);

        if let Some(existing) = stored {
            if let Some(credentials) = existing.credentials() {
                tracing::debug!(
                    "Using primary key {} for user {} stored at {}",
                    existing.key_id,
                    user_id,
                    existing.created_at
                );
                let credentials = credentials.clone();
                return Ok((credentials, Some(existing)));
            }
        }

        let credentials = self
            .mint_primary_key(user_id, proxy_group_id, expires)
            .await?;

        Ok((credentials, None))
    }

    /// Always mint and persist a new key for the user's primary account
    pub async fn create_primary_key(
        &self,
        user_id: &str,
        proxy_group_id: Option<&str>,
        expires: Option<i64>,
    ) -> Result<GoogleCredentials> {
        self.require_primary_account(user_id).await?;
        self.mint_primary_key(user_id, proxy_group_id, expires)
            .await
    }

    /// Record an expiration for a key whose material is not kept
    pub async fn add_custom_key_expiration(
        &self,
        key_id: &str,
        service_account_id: Uuid,
        expires: i64,
    ) -> Result<ServiceAccountKey> {
        self.store
            .insert_key(NewServiceAccountKey {
                key_id: key_id.to_string(),
                service_account_id,
                expires,
                private_key: None,
            })
            .await
    }

    pub async fn get_linked_google_account_email(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self
            .store
            .find_linked_account(user_id)
            .await?
            .map(|linked| linked.email))
    }

    /// Keys of the caller's account; empty when the account doesn't exist yet
    pub async fn list_keys_for_client(
        &self,
        client_id: Option<&str>,
        user_id: &str,
    ) -> Result<Vec<ServiceAccountKeyInfo>> {
        match self.get_service_account_for_client(client_id, user_id).await? {
            Some(account) => {
                self.cloud
                    .get_service_account_keys_info(&account.google_unique_id)
                    .await
            }
            None => Ok(Vec::new()),
        }
    }

    /// Delete a key, only if it belongs to the caller's account
    pub async fn delete_key_for_client(
        &self,
        client_id: Option<&str>,
        user_id: &str,
        key_id: &str,
    ) -> Result<()> {
        let account = self
            .get_service_account_for_client(client_id, user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Could not find service account for current user.".to_string())
            })?;

        let keys = self
            .cloud
            .get_service_account_keys_info(&account.google_unique_id)
            .await?;

        if !keys.iter().any(|key| key.key_id() == key_id) {
            return Err(AppError::NotFound(format!(
                "Could not delete key {}. Not found for current user.",
                key_id
            )));
        }

        self.cloud
            .delete_service_account_key(&account.google_unique_id, key_id)
            .await
    }

    async fn require_primary_account(&self, user_id: &str) -> Result<ServiceAccount> {
        self.get_service_account_for_client(None, user_id)
            .await?
            .filter(ServiceAccount::is_primary)
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "User {} does not have a primary service account. Unable to get primary \
                     service account key. This service account should automatically get created \
                     when the user's proxy group was created.",
                    user_id
                ))
            })
    }

    async fn mint_primary_key(
        &self,
        user_id: &str,
        proxy_group_id: Option<&str>,
        expires: Option<i64>,
    ) -> Result<GoogleCredentials> {
        // Zero means "use the default", like an absent value
        let expires = expires
            .filter(|e| *e != 0)
            .unwrap_or_else(|| chrono::Utc::now().timestamp() + self.default_key_expires_in);

        let (credentials, account) = self
            .create_access_key_for_client(None, user_id, proxy_group_id)
            .await?;

        let row = self
            .store
            .insert_key(NewServiceAccountKey {
                key_id: credentials.private_key_id.clone(),
                service_account_id: account.id,
                expires,
                private_key: Some(credentials.clone()),
            })
            .await?;

        tracing::info!(
            "Created primary key {} for user {} (expires {})",
            row.key_id,
            user_id,
            row.expires
        );

        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{FakeGoogleCloud, InMemoryServiceAccountStore};

    const DEFAULT_EXPIRES_IN: i64 = 86400;

    struct Fixture {
        store: Arc<InMemoryServiceAccountStore>,
        cloud: Arc<FakeGoogleCloud>,
        service: ServiceAccountService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryServiceAccountStore::default());
        let cloud = Arc::new(FakeGoogleCloud::default());
        let service = ServiceAccountService::new(
            store.clone(),
            cloud.clone(),
            DEFAULT_EXPIRES_IN,
        );
        Fixture {
            store,
            cloud,
            service,
        }
    }

    #[tokio::test]
    async fn test_get_or_create_returns_existing_key_verbatim() {
        let f = fixture();
        let account = f.store.seed_primary_account("user-1");
        let stored = f.store.seed_key(&account, "stored-key", 1_000, true);

        for requested in [None, Some(5), Some(9_999_999_999)] {
            let (creds, cached) = f
                .service
                .get_or_create_primary_key("user-1", Some("group-1"), requested)
                .await
                .unwrap();

            assert_eq!(Some(&creds), stored.credentials());
            let cached = cached.expect("cache hit returns the stored row");
            assert_eq!(cached.id, stored.id);
            assert_eq!(cached.expires, 1_000);
        }

        assert_eq!(f.store.keys().len(), 1);
        assert_eq!(f.cloud.minted_keys(), 0);
    }

    #[tokio::test]
    async fn test_get_or_create_mints_and_persists_with_explicit_expiration() {
        let f = fixture();
        let account = f.store.seed_primary_account("user-1");

        let (creds, cached) = f
            .service
            .get_or_create_primary_key("user-1", Some("group-1"), Some(1_234_567))
            .await
            .unwrap();

        assert!(cached.is_none());
        let keys = f.store.keys();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].service_account_id, account.id);
        assert_eq!(keys[0].key_id, creds.private_key_id);
        assert_eq!(keys[0].expires, 1_234_567);
        assert_eq!(keys[0].credentials(), Some(&creds));
        assert_eq!(f.cloud.minted_keys(), 1);
    }

    #[tokio::test]
    async fn test_get_or_create_uses_default_expiration() {
        let f = fixture();
        f.store.seed_primary_account("user-1");

        let before = chrono::Utc::now().timestamp();
        f.service
            .get_or_create_primary_key("user-1", None, None)
            .await
            .unwrap();
        let after = chrono::Utc::now().timestamp();

        let keys = f.store.keys();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].expires >= before + DEFAULT_EXPIRES_IN);
        assert!(keys[0].expires <= after + DEFAULT_EXPIRES_IN);
    }

    #[tokio::test]
    async fn test_zero_expiration_falls_back_to_default() {
        let f = fixture();
        f.store.seed_primary_account("user-1");

        let before = chrono::Utc::now().timestamp();
        f.service
            .create_primary_key("user-1", None, Some(0))
            .await
            .unwrap();

        let keys = f.store.keys();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].expires >= before + DEFAULT_EXPIRES_IN);
    }

    #[tokio::test]
    async fn test_get_or_create_then_repeat_hits_cache() {
        let f = fixture();
        f.store.seed_primary_account("user-1");

        let (first, _) = f
            .service
            .get_or_create_primary_key("user-1", None, Some(100))
            .await
            .unwrap();
        let (second, cached) = f
            .service
            .get_or_create_primary_key("user-1", None, Some(200))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(cached.unwrap().expires, 100);
        assert_eq!(f.store.keys().len(), 1);
        assert_eq!(f.cloud.minted_keys(), 1);
    }

    #[tokio::test]
    async fn test_keys_without_material_are_not_reused() {
        let f = fixture();
        let account = f.store.seed_primary_account("user-1");
        f.store.seed_key(&account, "rotated-out", 50, false);

        let (_, cached) = f
            .service
            .get_or_create_primary_key("user-1", None, Some(100))
            .await
            .unwrap();

        assert!(cached.is_none());
        assert_eq!(f.store.keys().len(), 2);
        assert_eq!(f.cloud.minted_keys(), 1);
    }

    #[tokio::test]
    async fn test_missing_primary_account_is_internal_error() {
        let f = fixture();

        let err = f
            .service
            .get_or_create_primary_key("user-1", Some("group-1"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        assert!(f.store.keys().is_empty());
        assert!(f.store.accounts().is_empty());
        assert_eq!(f.cloud.minted_keys(), 0);

        let err = f
            .service
            .create_primary_key("user-1", Some("group-1"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn test_create_primary_key_always_mints() {
        let f = fixture();
        let account = f.store.seed_primary_account("user-1");
        f.store.seed_key(&account, "stored-key", 1_000, true);

        let creds = f
            .service
            .create_primary_key("user-1", None, Some(2_000))
            .await
            .unwrap();

        assert_ne!(creds.private_key_id, "stored-key");
        assert_eq!(f.store.keys().len(), 2);
    }

    #[tokio::test]
    async fn test_create_account_without_proxy_group_is_request_error() {
        let f = fixture();

        let err = f
            .service
            .create_service_account_for_client("client-a", "user-1", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(f.store.accounts().is_empty());
        assert_eq!(f.cloud.created_accounts().len(), 0);
    }

    #[tokio::test]
    async fn test_create_account_in_proxy_group() {
        let f = fixture();

        let account = f
            .service
            .create_service_account_for_client("client-a", "user-1", Some("group-1"))
            .await
            .unwrap();

        assert_eq!(account.client_id.as_deref(), Some("client-a"));
        assert_eq!(account.user_id, "user-1");
        assert_eq!(
            f.cloud.created_accounts(),
            vec![("group-1".to_string(), "client-a-user-1".to_string())]
        );
        assert_eq!(f.store.accounts(), vec![account]);
    }

    #[tokio::test]
    async fn test_resolve_primary_distinct_from_client_account() {
        let f = fixture();
        let primary = f.store.seed_primary_account("user-1");
        let client = f
            .service
            .create_service_account_for_client("client-a", "user-1", Some("group-1"))
            .await
            .unwrap();

        let found_primary = f
            .service
            .get_service_account_for_client(None, "user-1")
            .await
            .unwrap()
            .unwrap();
        let found_client = f
            .service
            .get_service_account_for_client(Some("client-a"), "user-1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found_primary, primary);
        assert!(found_primary.is_primary());
        assert_eq!(found_client, client);
        assert_ne!(found_primary.id, found_client.id);

        let missing = f
            .service
            .get_service_account_for_client(Some("client-b"), "user-1")
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_access_key_provisions_account_once() {
        let f = fixture();

        let (first, account) = f
            .service
            .create_access_key_for_client(Some("client-a"), "user-1", Some("group-1"))
            .await
            .unwrap();
        let (second, same_account) = f
            .service
            .create_access_key_for_client(Some("client-a"), "user-1", Some("group-1"))
            .await
            .unwrap();

        assert_eq!(account, same_account);
        assert_ne!(first.private_key_id, second.private_key_id);
        assert_eq!(first.client_email, account.email);
        assert_eq!(f.cloud.created_accounts().len(), 1);
        assert_eq!(f.cloud.minted_keys(), 2);
    }

    #[tokio::test]
    async fn test_access_key_without_client_context_is_request_error() {
        let f = fixture();

        let err = f
            .service
            .create_access_key_for_client(None, "user-1", Some("group-1"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(f.cloud.minted_keys(), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_propagates_and_persists_nothing() {
        let f = fixture();
        f.store.seed_primary_account("user-1");
        f.cloud.fail_next_call();

        let err = f
            .service
            .get_or_create_primary_key("user-1", None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ExternalServiceError(_)));
        assert!(f.store.keys().is_empty());
    }

    #[tokio::test]
    async fn test_add_custom_key_expiration_stores_no_material() {
        let f = fixture();
        let account = f.store.seed_primary_account("user-1");

        let row = f
            .service
            .add_custom_key_expiration("key-xyz", account.id, 42)
            .await
            .unwrap();

        assert_eq!(row.key_id, "key-xyz");
        assert_eq!(row.expires, 42);
        assert!(!row.is_usable());
    }

    #[tokio::test]
    async fn test_linked_email_lookup() {
        let f = fixture();
        f.store.seed_linked_account("user-1", "someone@gmail.com");

        assert_eq!(
            f.service
                .get_linked_google_account_email("user-1")
                .await
                .unwrap()
                .as_deref(),
            Some("someone@gmail.com")
        );
        assert!(f
            .service
            .get_linked_google_account_email("user-2")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_resolve_proxy_group_prefers_token() {
        let f = fixture();
        f.store.seed_proxy_group("user-1", "stored-group");

        let from_token = f
            .service
            .resolve_proxy_group("user-1", Some("token-group"))
            .await
            .unwrap();
        let from_store = f.service.resolve_proxy_group("user-1", None).await.unwrap();
        let none = f.service.resolve_proxy_group("user-2", None).await.unwrap();

        assert_eq!(from_token.as_deref(), Some("token-group"));
        assert_eq!(from_store.as_deref(), Some("stored-group"));
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_list_and_delete_keys_for_client() {
        let f = fixture();
        assert!(f
            .service
            .list_keys_for_client(Some("client-a"), "user-1")
            .await
            .unwrap()
            .is_empty());

        let (creds, _) = f
            .service
            .create_access_key_for_client(Some("client-a"), "user-1", Some("group-1"))
            .await
            .unwrap();

        let keys = f
            .service
            .list_keys_for_client(Some("client-a"), "user-1")
            .await
            .unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].key_id(), creds.private_key_id);

        let err = f
            .service
            .delete_key_for_client(Some("client-a"), "user-1", "someone-elses-key")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        f.service
            .delete_key_for_client(Some("client-a"), "user-1", &creds.private_key_id)
            .await
            .unwrap();
        assert!(f
            .service
            .list_keys_for_client(Some("client-a"), "user-1")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_key_without_account_is_request_error() {
        let f = fixture();
        let err = f
            .service
            .delete_key_for_client(None, "user-1", "k")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
