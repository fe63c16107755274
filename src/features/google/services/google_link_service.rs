use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::google::clients::GoogleCloudProvider;
use crate::features::google::models::{LinkedAccountAccess, NewLinkedAccountAccess};
use crate::features::google::store::ServiceAccountStore;

/// Manages the proxy group membership of a user's linked Google account
pub struct GoogleLinkService {
    store: Arc<dyn ServiceAccountStore>,
    cloud: Arc<dyn GoogleCloudProvider>,
    /// Seconds of access granted by each extension
    access_expires_in: i64,
}

impl GoogleLinkService {
    pub fn new(
        store: Arc<dyn ServiceAccountStore>,
        cloud: Arc<dyn GoogleCloudProvider>,
        access_expires_in: i64,
    ) -> Self {
        Self {
            store,
            cloud,
            access_expires_in,
        }
    }

    /// Push the linked account's access out to now + the configured lifetime.
    ///
    /// Adds the account to the proxy group first if it was never a member.
    pub async fn extend_account_expiration(
        &self,
        user_id: &str,
        proxy_group_id: Option<&str>,
    ) -> Result<LinkedAccountAccess> {
        let linked = self
            .store
            .find_linked_account(user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(
                    "User does not have a linked Google account. Update was attempted and failed."
                        .to_string(),
                )
            })?;

        let expires = chrono::Utc::now()
            .timestamp()
            .checked_add(self.access_expires_in)
            .ok_or_else(|| AppError::Internal("Account access expiration overflows".to_string()))?;

        let access = match self.store.find_linked_account_access(linked.id).await? {
            Some(existing) => {
                self.store
                    .update_linked_account_access_expiration(existing.id, expires)
                    .await?
            }
            None => {
                let proxy_group_id = proxy_group_id.ok_or_else(|| {
                    AppError::NotFound(format!(
                        "No proxy group found for user {}. Could not give Google Account access.",
                        user_id
                    ))
                })?;

                self.cloud
                    .add_member_to_group(proxy_group_id, &linked.email)
                    .await?;

                self.store
                    .insert_linked_account_access(NewLinkedAccountAccess {
                        user_google_account_id: linked.id,
                        proxy_group_id: proxy_group_id.to_string(),
                        expires,
                    })
                    .await?
            }
        };

        tracing::info!(
            "Google account {} of user {} has access through proxy group {} until {}",
            linked.email,
            linked.user_id,
            access.proxy_group_id,
            access.expires
        );

        Ok(access)
    }

    /// Revoke the linked account's proxy group access and delete the linkage
    pub async fn unlink_account(&self, user_id: &str) -> Result<()> {
        let linked = self
            .store
            .find_linked_account(user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(
                    "Couldn't unlink account for user, no linked Google account found."
                        .to_string(),
                )
            })?;

        if let Some(access) = self.store.find_linked_account_access(linked.id).await? {
            self.cloud
                .remove_member_from_group(&access.proxy_group_id, &linked.email)
                .await
                .map_err(|e| {
                    AppError::BadRequest(format!(
                        "Couldn't remove account from user's proxy group, Google API failure: {}",
                        e
                    ))
                })?;
        }

        self.store.delete_linked_account(linked.id).await?;

        tracing::info!("Unlinked Google account {} from user {}", linked.email, linked.user_id);

        Ok(())
    }
}
