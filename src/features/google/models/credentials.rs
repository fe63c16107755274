use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Google service account credential file (`type = "service_account"`)
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GoogleCredentials {
    #[serde(rename = "type")]
    pub credential_type: String,
    pub project_id: String,
    pub private_key_id: String,
    pub private_key: String,
    pub client_email: String,
    pub client_id: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub auth_provider_x509_cert_url: String,
    pub client_x509_cert_url: String,
}

impl std::fmt::Debug for GoogleCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCredentials")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .finish_non_exhaustive()
    }
}

/// Result of creating a service account in Google
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewServiceAccount {
    pub unique_id: String,
    pub email: String,
}

/// Key metadata as listed by the IAM API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountKeyInfo {
    /// `projects/{project}/serviceAccounts/{account}/keys/{key}`
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_after_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_before_time: Option<String>,
}

impl ServiceAccountKeyInfo {
    /// Trailing key id of the resource name
    pub fn key_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}
