use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use hospital_cell::router::hospital_routes;
use patient_cell::router::create_patient_router;
use shared_config::AppConfig;
use triage_cell::router::triage_routes;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Hospitalizee API is running!" }))
        .nest("/emergency", triage_routes(state.clone()))
        .nest("/hospitals", hospital_routes(state.clone()))
        .nest("/patients", create_patient_router(state.clone()))
        .nest("/appointments", appointment_routes(state))
}
