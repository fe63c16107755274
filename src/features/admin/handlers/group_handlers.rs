use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::admin::dtos::*;
use crate::features::admin::services::AdminService;
use crate::features::auth::guards::RequireAdmin;
use crate::shared::types::{ApiResponse, Meta};

/// List all access groups
#[utoipa::path(
    get,
    path = "/api/admin/groups",
    responses(
        (status = 200, description = "List of groups", body = ApiResponse<Vec<GroupInfoDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn list_groups(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
) -> Result<Json<ApiResponse<Vec<GroupInfoDto>>>> {
    let items = service.list_groups().await?;
    let total = items.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Create an access group
#[utoipa::path(
    post,
    path = "/api/admin/groups",
    request_body = CreateGroupDto,
    responses(
        (status = 201, description = "Group created", body = ApiResponse<GroupInfoDto>),
        (status = 400, description = "Invalid group name"),
        (status = 409, description = "Group already exists")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn create_group(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    AppJson(dto): AppJson<CreateGroupDto>,
) -> Result<(StatusCode, Json<ApiResponse<GroupInfoDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let group = service
        .create_group(&dto.name, dto.description.as_deref())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(group),
            Some("Group created successfully".to_string()),
            None,
        )),
    ))
}

/// Get an access group and its projects by name
#[utoipa::path(
    get,
    path = "/api/admin/groups/{name}",
    params(("name" = String, Path, description = "Group name")),
    responses(
        (status = 200, description = "Group found", body = ApiResponse<GroupInfoDto>),
        (status = 404, description = "Group not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn get_group(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<GroupInfoDto>>> {
    let group = service.get_group_info(&name).await?;
    Ok(Json(ApiResponse::success(Some(group), None, None)))
}

/// Delete an access group
#[utoipa::path(
    delete,
    path = "/api/admin/groups/{name}",
    params(("name" = String, Path, description = "Group name")),
    responses(
        (status = 200, description = "Group deleted"),
        (status = 404, description = "Group not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn delete_group(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete_group(&name).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some(format!("Group {} deleted", name)),
        None,
    )))
}

/// Grant projects to an access group
#[utoipa::path(
    post,
    path = "/api/admin/groups/{name}/projects",
    params(("name" = String, Path, description = "Group name")),
    request_body = AddProjectsDto,
    responses(
        (status = 200, description = "Projects granted", body = ApiResponse<GroupInfoDto>),
        (status = 404, description = "Group or project not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn add_projects_to_group(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(name): Path<String>,
    AppJson(dto): AppJson<AddProjectsDto>,
) -> Result<Json<ApiResponse<GroupInfoDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let group = service.add_projects_to_group(&name, &dto.projects).await?;
    Ok(Json(ApiResponse::success(Some(group), None, None)))
}

/// Register a project
#[utoipa::path(
    post,
    path = "/api/admin/projects",
    request_body = CreateProjectDto,
    responses(
        (status = 201, description = "Project created", body = ApiResponse<ProjectResponseDto>),
        (status = 409, description = "Project already exists")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn create_project(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    AppJson(dto): AppJson<CreateProjectDto>,
) -> Result<(StatusCode, Json<ApiResponse<ProjectResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let project = service.create_project(&dto.name, &dto.auth_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(project), None, None)),
    ))
}
