use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::google::dtos::{LinkedAccountAccessResponseDto, LinkedAccountResponseDto};
use crate::features::google::services::{GoogleLinkService, ServiceAccountService};
use crate::shared::types::ApiResponse;

/// State for linked account handlers
#[derive(Clone)]
pub struct LinkState {
    pub service_account_service: Arc<ServiceAccountService>,
    pub link_service: Arc<GoogleLinkService>,
}

/// Google account linked to the current user
#[utoipa::path(
    get,
    path = "/api/link/google",
    responses(
        (status = 200, description = "Linked account (email is null when none)", body = ApiResponse<LinkedAccountResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "google",
    security(("bearer_auth" = []))
)]
pub async fn get_linked_account(
    user: AuthenticatedUser,
    State(state): State<LinkState>,
) -> Result<Json<ApiResponse<LinkedAccountResponseDto>>> {
    let linked_email = state
        .service_account_service
        .get_linked_google_account_email(&user.sub)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(LinkedAccountResponseDto { linked_email }),
        None,
        None,
    )))
}

/// Extend the linked account's proxy group access
#[utoipa::path(
    patch,
    path = "/api/link/google",
    responses(
        (status = 200, description = "New access expiration", body = ApiResponse<LinkedAccountAccessResponseDto>),
        (status = 404, description = "No linked account, or no proxy group to grant access through"),
        (status = 502, description = "Google API failure")
    ),
    tag = "google",
    security(("bearer_auth" = []))
)]
pub async fn extend_link_expiration(
    user: AuthenticatedUser,
    State(state): State<LinkState>,
) -> Result<Json<ApiResponse<LinkedAccountAccessResponseDto>>> {
    let proxy_group = state
        .service_account_service
        .resolve_proxy_group(&user.sub, user.proxy_group_id.as_deref())
        .await?;

    let access = state
        .link_service
        .extend_account_expiration(&user.sub, proxy_group.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(access.into()),
        None,
        None,
    )))
}

/// Unlink the current user's Google account
#[utoipa::path(
    delete,
    path = "/api/link/google",
    responses(
        (status = 200, description = "Account unlinked"),
        (status = 400, description = "Google refused to remove the account from the proxy group"),
        (status = 404, description = "No linked account")
    ),
    tag = "google",
    security(("bearer_auth" = []))
)]
pub async fn unlink_account(
    user: AuthenticatedUser,
    State(state): State<LinkState>,
) -> Result<Json<ApiResponse<()>>> {
    state.link_service.unlink_account(&user.sub).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Google account unlinked".to_string()),
        None,
    )))
}
