use async_trait::async_trait;
use base64::prelude::*;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::core::config::GoogleConfig;
use crate::core::error::{AppError, Result};
use crate::features::google::clients::token_manager::GoogleTokenManager;
use crate::features::google::models::{GoogleCredentials, NewServiceAccount, ServiceAccountKeyInfo};

/// Operations the broker needs from Google Cloud
#[async_trait]
pub trait GoogleCloudProvider: Send + Sync {
    /// Create a service account in the broker project and make it a member
    /// of the given proxy group.
    async fn create_service_account_for_proxy_group(
        &self,
        proxy_group_id: &str,
        account_id: &str,
    ) -> Result<NewServiceAccount>;

    /// Mint a new key for the account and return it as a credential file
    async fn get_access_key(&self, unique_id: &str) -> Result<GoogleCredentials>;

    /// User-managed keys of the account
    async fn get_service_account_keys_info(
        &self,
        unique_id: &str,
    ) -> Result<Vec<ServiceAccountKeyInfo>>;

    async fn delete_service_account_key(&self, unique_id: &str, key_id: &str) -> Result<()>;

    async fn add_member_to_group(&self, group_id: &str, member_email: &str) -> Result<()>;

    async fn remove_member_from_group(&self, group_id: &str, member_email: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedKeyResponse {
    private_key_data: String,
}

#[derive(Debug, Default, Deserialize)]
struct ListKeysResponse {
    #[serde(default)]
    keys: Vec<ServiceAccountKeyInfo>,
}

/// Decode the base64 `privateKeyData` of a key created with
/// `TYPE_GOOGLE_CREDENTIALS_FILE`.
pub fn decode_private_key_data(private_key_data: &str) -> Result<GoogleCredentials> {
    let bytes = BASE64_STANDARD.decode(private_key_data).map_err(|e| {
        AppError::ExternalServiceError(format!("Invalid privateKeyData encoding: {}", e))
    })?;

    serde_json::from_slice(&bytes).map_err(|e| {
        AppError::ExternalServiceError(format!("Invalid credentials in privateKeyData: {}", e))
    })
}

/// Google Cloud client over the IAM and Admin Directory REST APIs
pub struct GoogleCloudManager {
    config: GoogleConfig,
    token_manager: Arc<GoogleTokenManager>,
    http_client: reqwest::Client,
}

/// Authenticated handle for a single provider call.
///
/// Acquired at the start of every operation and released when dropped, so
/// it is released on success and on every error path alike.
pub struct CloudSession<'a> {
    manager: &'a GoogleCloudManager,
    access_token: String,
    operation: &'static str,
}

impl Drop for CloudSession<'_> {
    fn drop(&mut self) {
        tracing::debug!("Released Google Cloud session for {}", self.operation);
    }
}

impl<'a> CloudSession<'a> {
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Google API request failed ({}): {}", self.operation, e);
                AppError::ExternalServiceError(format!("Google API request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                "Google API error ({}): HTTP {} - {}",
                self.operation,
                status,
                body
            );
            return Err(AppError::ExternalServiceError(format!(
                "Google API error: HTTP {} - {}",
                status, body
            )));
        }

        Ok(response)
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        self.send(request).await?.json::<T>().await.map_err(|e| {
            tracing::error!("Failed to parse Google API response ({}): {}", self.operation, e);
            AppError::ExternalServiceError(format!("Failed to parse Google API response: {}", e))
        })
    }

    fn client(&self) -> &reqwest::Client {
        &self.manager.http_client
    }
}

impl GoogleCloudManager {
    pub fn new(config: GoogleConfig, token_manager: Arc<GoogleTokenManager>) -> Self {
        Self {
            config,
            token_manager,
            http_client: reqwest::Client::new(),
        }
    }

    async fn session(&self, operation: &'static str) -> Result<CloudSession<'_>> {
        let token = self
            .token_manager
            .get_access_token()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Failed to get access token: {}", e)))?;

        tracing::debug!("Opened Google Cloud session for {}", operation);

        Ok(CloudSession {
            manager: self,
            access_token: token.access_token,
            operation,
        })
    }

    fn group_members_url(&self, group_id: &str) -> String {
        format!(
            "{}/groups/{}/members",
            self.config.directory_base_url,
            urlencoding::encode(group_id)
        )
    }

    async fn insert_group_member(
        &self,
        session: &CloudSession<'_>,
        group_id: &str,
        member_email: &str,
    ) -> Result<()> {
        session
            .send(
                session
                    .client()
                    .post(self.group_members_url(group_id))
                    .json(&json!({
                        "email": member_email,
                        "role": "MEMBER",
                    })),
            )
            .await?;
        Ok(())
    }

    /// `projects/-/serviceAccounts/{id}` accepts either the email or the unique id
    fn service_account_url(&self, unique_id: &str) -> String {
        format!(
            "{}/projects/-/serviceAccounts/{}",
            self.config.iam_base_url,
            urlencoding::encode(unique_id)
        )
    }
}

#[async_trait]
impl GoogleCloudProvider for GoogleCloudManager {
    async fn create_service_account_for_proxy_group(
        &self,
        proxy_group_id: &str,
        account_id: &str,
    ) -> Result<NewServiceAccount> {
        let session = self.session("create_service_account").await?;

        let url = format!(
            "{}/projects/{}/serviceAccounts",
            self.config.iam_base_url,
            urlencoding::encode(&self.config.project_id)
        );
        tracing::debug!("Creating service account {} in {}", account_id, url);

        let account: NewServiceAccount = session
            .send_json(session.client().post(&url).json(&json!({
                "accountId": account_id,
                "serviceAccount": {
                    "displayName": account_id,
                    "description": format!("proxy group {}", proxy_group_id),
                },
            })))
            .await?;

        self.insert_group_member(&session, proxy_group_id, &account.email)
            .await?;

        tracing::info!(
            "Created service account {} in proxy group {}",
            account.email,
            proxy_group_id
        );

        Ok(account)
    }

    async fn get_access_key(&self, unique_id: &str) -> Result<GoogleCredentials> {
        let session = self.session("create_key").await?;

        let url = format!("{}/keys", self.service_account_url(unique_id));
        let created: CreatedKeyResponse = session
            .send_json(session.client().post(&url).json(&json!({
                "privateKeyType": "TYPE_GOOGLE_CREDENTIALS_FILE",
                "keyAlgorithm": "KEY_ALG_RSA_2048",
            })))
            .await?;

        let credentials = decode_private_key_data(&created.private_key_data)?;
        tracing::info!(
            "Created key {} for service account {}",
            credentials.private_key_id,
            unique_id
        );

        Ok(credentials)
    }

    async fn get_service_account_keys_info(
        &self,
        unique_id: &str,
    ) -> Result<Vec<ServiceAccountKeyInfo>> {
        let session = self.session("list_keys").await?;

        let url = format!("{}/keys", self.service_account_url(unique_id));
        let listed: ListKeysResponse = session
            .send_json(
                session
                    .client()
                    .get(&url)
                    .query(&[("keyTypes", "USER_MANAGED")]),
            )
            .await?;

        Ok(listed.keys)
    }

    async fn delete_service_account_key(&self, unique_id: &str, key_id: &str) -> Result<()> {
        let session = self.session("delete_key").await?;

        let url = format!(
            "{}/keys/{}",
            self.service_account_url(unique_id),
            urlencoding::encode(key_id)
        );
        session.send(session.client().delete(&url)).await?;

        tracing::info!("Deleted key {} of service account {}", key_id, unique_id);

        Ok(())
    }
    async fn add_member_to_group(&self, group_id: &str, member_email: &str) -> Result<()> {
        let session = self.session("add_group_member").await?;
        self.insert_group_member(&session, group_id, member_email)
            .await?;

        tracing::info!("Added {} to group {}", member_email, group_id);

        Ok(())
    }

    async fn remove_member_from_group(&self, group_id: &str, member_email: &str) -> Result<()> {
        let session = self.session("remove_group_member").await?;

        let url = format!(
            "{}/{}",
            self.group_members_url(group_id),
            urlencoding::encode(member_email)
        );
        session.send(session.client().delete(&url)).await?;

        tracing::info!("Removed {} from group {}", member_email, group_id);

        Ok(())
    }
}
