use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::admin::handlers;
use crate::features::admin::services::AdminService;

/// Create admin routes (all require admin access), nested under `/api/admin`
pub fn routes(admin_service: Arc<AdminService>) -> Router {
    Router::new()
        .route(
            "/groups",
            get(handlers::list_groups).post(handlers::create_group),
        )
        .route(
            "/groups/{name}",
            get(handlers::get_group).delete(handlers::delete_group),
        )
        .route(
            "/groups/{name}/projects",
            post(handlers::add_projects_to_group),
        )
        .route("/projects", post(handlers::create_project))
        .with_state(admin_service)
}
