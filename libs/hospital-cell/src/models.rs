use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hospital {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub address: String,
    pub telephone: String,
    pub pincode: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub emergency_capacity: i32,
    pub emergency_available: i32,
    #[serde(default)]
    pub department_ids: Vec<Uuid>,
    #[serde(default)]
    pub on_duty_doctor_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub department_id: Uuid,
    pub hospital_id: Uuid,
    /// Named booking slots the doctor offers, e.g. "09:00-09:30".
    #[serde(default)]
    pub slots: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Doctor joined with its hospital's display name, as served by the
/// doctors-by-department directory lookup.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorListing {
    pub id: Uuid,
    pub name: String,
    pub hospital_id: Uuid,
    pub hospital_name: String,
    pub slots: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterHospitalRequest {
    pub email: String,
    pub name: String,
    pub address: String,
    pub telephone: String,
    pub pincode: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub emergency_capacity: i32,
    #[serde(default)]
    pub department_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportCapacityRequest {
    pub emergency_available: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOnDutyRequest {
    pub on_duty_doctor_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub department_id: Uuid,
    pub hospital_id: Uuid,
    #[serde(default)]
    pub slots: Vec<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum HospitalError {
    #[error("Hospital not found")]
    NotFound,

    #[error("Hospital with email {email} already exists")]
    EmailAlreadyExists { email: String },

    #[error("Reported availability {available} outside 0..={capacity}")]
    InvalidCapacity { available: i32, capacity: i32 },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
