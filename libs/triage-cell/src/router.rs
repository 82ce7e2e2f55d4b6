use std::sync::Arc;

use axum::{Router, routing::post};

use shared_config::AppConfig;

use crate::handlers;

pub fn triage_routes(state: Arc<AppConfig>) -> Router {
    // All public: emergency dispatch must work for unauthenticated users.
    Router::new()
        .route("/dispatch", post(handlers::dispatch_emergency))
        .route("/classify", post(handlers::classify_symptoms))
        .with_state(state)
}
