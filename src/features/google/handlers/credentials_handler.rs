use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::google::dtos::{AccessKeysResponseDto, CreateKeyQuery, PrimaryKeyQuery};
use crate::features::google::models::GoogleCredentials;
use crate::features::google::services::ServiceAccountService;
use crate::shared::types::ApiResponse;

/// List keys of the service account for the caller's client
#[utoipa::path(
    get,
    path = "/api/credentials/google",
    responses(
        (status = 200, description = "Key metadata from Google", body = ApiResponse<AccessKeysResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "google",
    security(("bearer_auth" = []))
)]
pub async fn list_keys(
    user: AuthenticatedUser,
    State(service): State<Arc<ServiceAccountService>>,
) -> Result<Json<ApiResponse<AccessKeysResponseDto>>> {
    let access_keys = service
        .list_keys_for_client(user.client_id.as_deref(), &user.sub)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(AccessKeysResponseDto { access_keys }),
        None,
        None,
    )))
}

/// Mint a key for the caller's client, creating its service account on first use.
///
/// The body is a Google credentials file and can be saved as-is. PUT is accepted as an alias.
#[utoipa::path(
    method(post, put),
    path = "/api/credentials/google",
    params(CreateKeyQuery),
    responses(
        (status = 200, description = "Google service account credentials", body = GoogleCredentials),
        (status = 400, description = "Invalid or too large expires_in"),
        (status = 404, description = "No client context or no proxy group for the user")
    ),
    tag = "google",
    security(("bearer_auth" = []))
)]
pub async fn create_key(
    user: AuthenticatedUser,
    State(service): State<Arc<ServiceAccountService>>,
    Query(query): Query<CreateKeyQuery>,
) -> Result<Json<GoogleCredentials>> {
    if matches!(query.expires_in, Some(secs) if secs <= 0) {
        return Err(AppError::BadRequest(
            "expires_in must be a positive number of seconds".to_string(),
        ));
    }

    // Checked before minting: a rejected request creates nothing at Google
    let expires = query
        .expires_in
        .map(|expires_in| {
            chrono::Utc::now()
                .timestamp()
                .checked_add(expires_in)
                .ok_or_else(|| AppError::BadRequest("expires_in is too large".to_string()))
        })
        .transpose()?;

    let proxy_group = service
        .resolve_proxy_group(&user.sub, user.proxy_group_id.as_deref())
        .await?;

    let (key, account) = service
        .create_access_key_for_client(user.client_id.as_deref(), &user.sub, proxy_group.as_deref())
        .await?;

    if let Some(expires) = expires {
        service
            .add_custom_key_expiration(&key.private_key_id, account.id, expires)
            .await?;
    }

    Ok(Json(key))
}

/// Get or create the caller's primary service account key.
///
/// With `force=true` a new key is minted and stored even when one exists.
#[utoipa::path(
    post,
    path = "/api/credentials/google/primary",
    params(PrimaryKeyQuery),
    responses(
        (status = 200, description = "Google service account credentials", body = GoogleCredentials),
        (status = 400, description = "Negative expires"),
        (status = 500, description = "User has no primary service account")
    ),
    tag = "google",
    security(("bearer_auth" = []))
)]
pub async fn get_or_create_primary_key(
    user: AuthenticatedUser,
    State(service): State<Arc<ServiceAccountService>>,
    Query(query): Query<PrimaryKeyQuery>,
) -> Result<Json<GoogleCredentials>> {
    if matches!(query.expires, Some(expires) if expires < 0) {
        return Err(AppError::BadRequest(
            "expires must be a Unix timestamp, or 0 for the default".to_string(),
        ));
    }

    let proxy_group = service
        .resolve_proxy_group(&user.sub, user.proxy_group_id.as_deref())
        .await?;

    let key = if query.force {
        service
            .create_primary_key(&user.sub, proxy_group.as_deref(), query.expires)
            .await?
    } else {
        service
            .get_or_create_primary_key(&user.sub, proxy_group.as_deref(), query.expires)
            .await?
            .0
    };

    Ok(Json(key))
}

/// Delete a key of the caller's service account
#[utoipa::path(
    delete,
    path = "/api/credentials/google/{key_id}",
    params(("key_id" = String, Path, description = "Key id (`private_key_id` of the credentials)")),
    responses(
        (status = 200, description = "Key deleted"),
        (status = 404, description = "Key not found for the current user")
    ),
    tag = "google",
    security(("bearer_auth" = []))
)]
pub async fn delete_key(
    user: AuthenticatedUser,
    State(service): State<Arc<ServiceAccountService>>,
    Path(key_id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    service
        .delete_key_for_client(user.client_id.as_deref(), &user.sub, &key_id)
        .await?;
    Ok(Json(ApiResponse::success(
        None,
        Some(format!("Key {} deleted", key_id)),
        None,
    )))
}
