use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::features::google::handlers::{self, LinkState};
use crate::features::google::services::{GoogleLinkService, ServiceAccountService};

/// Create routes for Google credentials and account linking (all require authentication)
pub fn routes(
    service_account_service: Arc<ServiceAccountService>,
    link_service: Arc<GoogleLinkService>,
) -> Router {
    let link_state = LinkState {
        service_account_service: Arc::clone(&service_account_service),
        link_service,
    };

    // Credential routes with ServiceAccountService
    let credential_routes = Router::new()
        .route(
            "/api/credentials/google",
            get(handlers::list_keys)
                .post(handlers::create_key)
                .put(handlers::create_key),
        )
        .route(
            "/api/credentials/google/primary",
            post(handlers::get_or_create_primary_key),
        )
        .route(
            "/api/credentials/google/{key_id}",
            delete(handlers::delete_key),
        )
        .with_state(service_account_service);

    // Link routes with LinkState
    let link_routes = Router::new()
        .route(
            "/api/link/google",
            get(handlers::get_linked_account)
                .patch(handlers::extend_link_expiration)
                .delete(handlers::unlink_account),
        )
        .with_state(link_state);

    Router::new().merge(credential_routes).merge(link_routes)
}
