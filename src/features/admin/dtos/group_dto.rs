use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::admin::models::{AccessGroup, Project};

/// Request DTO for creating an access group
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateGroupDto {
    #[validate(
        length(min = 1, max = 255, message = "Name must be 1-255 characters"),
        regex(
            path = "*crate::shared::validation::GROUP_NAME_REGEX",
            message = "Name may only contain letters, digits, underscores and hyphens"
        )
    )]
    pub name: String,

    #[validate(length(max = 1024, message = "Description must not exceed 1024 characters"))]
    pub description: Option<String>,
}

/// Group with the names of the projects it grants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GroupInfoDto {
    pub name: String,
    pub description: Option<String>,
    pub projects: Vec<String>,
}

impl GroupInfoDto {
    pub fn new(group: AccessGroup, projects: Vec<String>) -> Self {
        Self {
            name: group.name,
            description: group.description,
            projects,
        }
    }
}

/// Request DTO for granting projects to a group
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddProjectsDto {
    #[validate(length(min = 1, message = "At least one project is required"))]
    pub projects: Vec<String>,
}

/// Request DTO for registering a project
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProjectDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 255, message = "Auth id must be 1-255 characters"))]
    pub auth_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectResponseDto {
    pub id: Uuid,
    pub name: String,
    pub auth_id: String,
}

impl From<Project> for ProjectResponseDto {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            auth_id: project.auth_id,
        }
    }
}
