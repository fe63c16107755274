use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::admin::dtos::{GroupInfoDto, ProjectResponseDto};
use crate::features::admin::models::AccessGroup;
use crate::features::admin::store::GroupStore;

/// Service for access group administration
pub struct AdminService {
    store: Arc<dyn GroupStore>,
}

impl AdminService {
    pub fn new(store: Arc<dyn GroupStore>) -> Self {
        Self { store }
    }

    async fn require_group(&self, name: &str) -> Result<AccessGroup> {
        self.store
            .find_group_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {} does not exist", name)))
    }

    /// Create a group; a taken name is a `Conflict` reported by the store
    pub async fn create_group(&self, name: &str, description: Option<&str>) -> Result<GroupInfoDto> {
        let group = self.store.insert_group(name, description).await?;
        tracing::info!("Created group {}", group.name);

        Ok(GroupInfoDto::new(group, Vec::new()))
    }

    pub async fn get_group_info(&self, name: &str) -> Result<GroupInfoDto> {
        let group = self.require_group(name).await?;
        let projects = self.store.group_project_names(group.id).await?;
        Ok(GroupInfoDto::new(group, projects))
    }

    pub async fn list_groups(&self) -> Result<Vec<GroupInfoDto>> {
        let groups = self.store.list_groups().await?;

        let mut items = Vec::with_capacity(groups.len());
        for group in groups {
            let projects = self.store.group_project_names(group.id).await?;
            items.push(GroupInfoDto::new(group, projects));
        }

        Ok(items)
    }

    pub async fn delete_group(&self, name: &str) -> Result<()> {
        let group = self.require_group(name).await?;
        self.store.delete_group(group.id).await?;
        tracing::info!("Deleted group {}", name);
        Ok(())
    }

    pub async fn create_project(&self, name: &str, auth_id: &str) -> Result<ProjectResponseDto> {
        let project = self.store.insert_project(name, auth_id).await?;
        Ok(project.into())
    }

    /// Grant projects to a group. Every project must exist; nothing is
    /// granted when one is missing.
    pub async fn add_projects_to_group(
        &self,
        name: &str,
        project_names: &[String],
    ) -> Result<GroupInfoDto> {
        let group = self.require_group(name).await?;

        let mut project_ids = Vec::with_capacity(project_names.len());
        for project_name in project_names {
            let project = self
                .store
                .find_project_by_name(project_name)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Project {} does not exist", project_name))
                })?;
            project_ids.push(project.id);
        }

        self.store.add_projects_to_group(group.id, &project_ids).await?;
        tracing::info!("Added {} projects to group {}", project_ids.len(), group.name);

        let names = self.store.group_project_names(group.id).await?;
        Ok(GroupInfoDto::new(group, names))
    }
}
