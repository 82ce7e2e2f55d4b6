use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    CreateDoctorRequest, HospitalError, RegisterHospitalRequest, ReportCapacityRequest,
    UpdateOnDutyRequest,
};
use crate::services::{DirectoryService, HospitalService};

fn map_error(err: HospitalError) -> AppError {
    match err {
        HospitalError::NotFound => AppError::NotFound("Hospital not found".to_string()),
        HospitalError::EmailAlreadyExists { .. } => AppError::Conflict(err.to_string()),
        HospitalError::InvalidCapacity { .. } => AppError::ValidationError(err.to_string()),
        HospitalError::ValidationError(msg) => AppError::ValidationError(msg),
        HospitalError::DatabaseError(msg) => AppError::Internal(msg),
    }
}

// ==============================================================================
// PUBLIC HANDLERS (NO AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn list_hospitals(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = HospitalService::new(&state);
    let hospitals = service.list_hospitals().await.map_err(map_error)?;

    Ok(Json(json!({
        "hospitals": hospitals,
        "total": hospitals.len()
    })))
}

#[axum::debug_handler]
pub async fn get_hospital(
    State(state): State<Arc<AppConfig>>,
    Path(hospital_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = HospitalService::new(&state);
    let hospital = service.get_hospital(&hospital_id).await.map_err(map_error)?;

    Ok(Json(json!(hospital)))
}

#[axum::debug_handler]
pub async fn list_departments(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);
    let departments = service.list_departments().await.map_err(map_error)?;

    Ok(Json(json!({
        "departments": departments
    })))
}

/// Doctors offering appointments in one department, with hospital names
/// for display in the booking form.
#[axum::debug_handler]
pub async fn get_doctors_in_department(
    State(state): State<Arc<AppConfig>>,
    Path(department_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);
    let doctors = service.doctors_in_department(department_id).await.map_err(map_error)?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

// ==============================================================================
// PROTECTED HANDLERS (AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn register_hospital(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<RegisterHospitalRequest>,
) -> Result<Json<Value>, AppError> {
    let service = HospitalService::new(&state);
    let hospital = service
        .register_hospital(request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(hospital)))
}

#[axum::debug_handler]
pub async fn report_capacity(
    State(state): State<Arc<AppConfig>>,
    Path(hospital_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<ReportCapacityRequest>,
) -> Result<Json<Value>, AppError> {
    let service = HospitalService::new(&state);
    let hospital = service
        .report_capacity(&hospital_id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(hospital)))
}

#[axum::debug_handler]
pub async fn update_on_duty(
    State(state): State<Arc<AppConfig>>,
    Path(hospital_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<UpdateOnDutyRequest>,
) -> Result<Json<Value>, AppError> {
    let service = HospitalService::new(&state);
    let hospital = service
        .update_on_duty(&hospital_id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(hospital)))
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);
    let doctor = service
        .create_doctor(request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(doctor)))
}
