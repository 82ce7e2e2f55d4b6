use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::EmergencyDispatchRequest;
use crate::services::dispatch::EmergencyDispatchService;

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub symptoms: String,
}

/// Emergency dispatch: classify the symptom text and return up to 3
/// candidate hospitals. Public - an emergency lookup must not require a
/// login.
#[axum::debug_handler]
pub async fn dispatch_emergency(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<EmergencyDispatchRequest>,
) -> Result<Json<Value>, AppError> {
    let service = EmergencyDispatchService::new(&state)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let response = service.dispatch(request).await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(json!({
        "classification": response.classification,
        "candidates": response.candidates,
        "total": response.candidates.len()
    })))
}

/// Classification preview without the hospital lookup, used by the
/// emergency form to show the predicted department as the patient types.
#[axum::debug_handler]
pub async fn classify_symptoms(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<Value>, AppError> {
    let service = EmergencyDispatchService::new(&state)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let classification = service.classify(&request.symptoms);

    Ok(Json(json!(classification)))
}
