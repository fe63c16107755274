use crate::core::config::GoogleConfig;
use crate::features::google::models::GoogleCredentials;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Scopes needed to manage service accounts and proxy group membership
pub const BROKER_SCOPES: &str = "https://www.googleapis.com/auth/cloud-platform \
https://www.googleapis.com/auth/admin.directory.group";

/// Response from the Google OAuth2 token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(rename = "token_type", default)]
    pub _token_type: String,
}

/// Claims of the self-signed assertion exchanged for an access token
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
}

impl AssertionClaims {
    pub fn new(credentials: &GoogleCredentials, subject: Option<&str>, now: i64) -> Self {
        Self {
            iss: credentials.client_email.clone(),
            scope: BROKER_SCOPES.to_string(),
            aud: credentials.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
            sub: subject.map(str::to_string),
        }
    }
}

struct TokenCache {
    token: TokenResponse,
    fetched_at: Instant,
}

/// Manages access tokens for the broker's own Google service account
pub struct GoogleTokenManager {
    credentials: GoogleCredentials,
    subject: Option<String>,
    client: reqwest::Client,
    cache: Arc<RwLock<Option<TokenCache>>>,
    /// Refresh token this many seconds before expiration
    refresh_margin: Duration,
}

impl GoogleTokenManager {
    pub fn new(credentials: GoogleCredentials, subject: Option<String>) -> Self {
        Self {
            credentials,
            subject,
            client: reqwest::Client::new(),
            cache: Arc::new(RwLock::new(None)),
            refresh_margin: Duration::from_secs(60),
        }
    }

    /// Read the credential file named by the configuration
    pub fn from_config(config: &GoogleConfig) -> Result<Self, TokenError> {
        let raw = std::fs::read_to_string(&config.credentials_path).map_err(|e| {
            TokenError::CredentialsError(format!("{}: {}", config.credentials_path, e))
        })?;
        let credentials: GoogleCredentials = serde_json::from_str(&raw)
            .map_err(|e| TokenError::CredentialsError(e.to_string()))?;

        Ok(Self::new(credentials, config.admin_email.clone()))
    }

    pub fn client_email(&self) -> &str {
        &self.credentials.client_email
    }

    /// Get a valid access token, fetching a new one if necessary
    pub async fn get_access_token(&self) -> Result<TokenResponse, TokenError> {
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                let elapsed = cached.fetched_at.elapsed();
                let expires_in = Duration::from_secs(cached.token.expires_in);

                if elapsed + self.refresh_margin < expires_in {
                    tracing::debug!(
                        "Using cached Google access token (expires in {} seconds)",
                        (expires_in - elapsed).as_secs()
                    );
                    return Ok(cached.token.clone());
                }
            }
        }

        self.fetch_token().await
    }

    fn sign_assertion(&self) -> Result<String, TokenError> {
        let claims = AssertionClaims::new(
            &self.credentials,
            self.subject.as_deref(),
            chrono::Utc::now().timestamp(),
        );

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.credentials.private_key_id.clone());

        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(|e| TokenError::CredentialsError(e.to_string()))?;

        encode(&header, &claims, &key).map_err(|e| TokenError::CredentialsError(e.to_string()))
    }

    async fn fetch_token(&self) -> Result<TokenResponse, TokenError> {
        tracing::debug!(
            "Fetching new Google access token from {}",
            self.credentials.token_uri
        );

        let assertion = self.sign_assertion()?;

        let response = self
            .client
            .post(&self.credentials.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| TokenError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TokenError::FetchError(format!(
                "Token request failed: HTTP {} - {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| TokenError::ParseError(e.to_string()))?;

        tracing::info!(
            "Fetched new Google access token, expires in {} seconds",
            token_response.expires_in
        );

        let mut cache = self.cache.write().await;
        *cache = Some(TokenCache {
            token: token_response.clone(),
            fetched_at: Instant::now(),
        });

        Ok(token_response)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Invalid broker credentials: {0}")]
    CredentialsError(String),

    #[error("Failed to fetch token: {0}")]
    FetchError(String),

    #[error("Failed to parse token response: {0}")]
    ParseError(String),
}
