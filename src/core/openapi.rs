use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::{dtos as admin_dtos, handlers as admin_handlers};
use crate::features::auth;
use crate::features::google::{
    dtos as google_dtos, handlers as google_handlers, models as google_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handler::get_me,
        // Google credentials
        google_handlers::list_keys,
        google_handlers::create_key,
        google_handlers::get_or_create_primary_key,
        google_handlers::delete_key,
        google_handlers::get_linked_account,
        google_handlers::extend_link_expiration,
        google_handlers::unlink_account,
        // Admin
        admin_handlers::list_groups,
        admin_handlers::create_group,
        admin_handlers::get_group,
        admin_handlers::delete_group,
        admin_handlers::add_projects_to_group,
        admin_handlers::create_project,
    ),
    components(
        schemas(
            Meta,
            // Auth
            auth::dto::MeResponseDto,
            ApiResponse<auth::dto::MeResponseDto>,
            // Google
            google_models::GoogleCredentials,
            google_models::ServiceAccountKeyInfo,
            google_dtos::AccessKeysResponseDto,
            google_dtos::LinkedAccountResponseDto,
            ApiResponse<google_dtos::AccessKeysResponseDto>,
            ApiResponse<google_dtos::LinkedAccountResponseDto>,
            google_dtos::LinkedAccountAccessResponseDto,
            ApiResponse<google_dtos::LinkedAccountAccessResponseDto>,
            // Admin
            admin_dtos::CreateGroupDto,
            admin_dtos::GroupInfoDto,
            admin_dtos::AddProjectsDto,
            admin_dtos::CreateProjectDto,
            admin_dtos::ProjectResponseDto,
            ApiResponse<admin_dtos::GroupInfoDto>,
            ApiResponse<Vec<admin_dtos::GroupInfoDto>>,
            ApiResponse<admin_dtos::ProjectResponseDto>,
        )
    ),
    tags(
        (name = "auth", description = "Current user"),
        (name = "google", description = "Google service accounts and keys"),
        (name = "admin", description = "Access groups and projects (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Fence Google API",
        version = "0.1.0",
        description = "Google service account credentials for authenticated users",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Overrides OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
