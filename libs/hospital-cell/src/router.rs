use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, patch},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn hospital_routes(state: Arc<AppConfig>) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/", get(handlers::list_hospitals))
        .route("/{hospital_id}", get(handlers::get_hospital))
        .route("/departments", get(handlers::list_departments))
        .route("/departments/{department_id}/doctors", get(handlers::get_doctors_in_department));

    // Protected routes (authentication required)
    let protected_routes = Router::new()
        .route("/", post(handlers::register_hospital))
        .route("/{hospital_id}/capacity", patch(handlers::report_capacity))
        .route("/{hospital_id}/on-duty", patch(handlers::update_on_duty))
        .route("/doctors", post(handlers::create_doctor))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
