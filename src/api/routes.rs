use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::auth::{auth_middleware, AuthService};

use super::handlers::{admin_panel, admin_stats, background_image, health_check, index, AppState};

/// Path of the tracked image
pub const IMAGE_ROUTE: &str = "/background.png";

pub fn create_router(state: Arc<AppState>, auth_service: Arc<AuthService>) -> Router {
    let admin_routes = Router::new()
        .route("/adminpanel", get(admin_panel))
        .route("/adminpanel/stats", get(admin_stats))
        .route_layer(middleware::from_fn_with_state(auth_service, auth_middleware));

    Router::new()
        .route("/", get(index))
        .route(IMAGE_ROUTE, get(background_image))
        .route("/health", get(health_check))
        .merge(admin_routes)
        .with_state(state)
}
