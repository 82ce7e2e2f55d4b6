use std::collections::HashMap;

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use chrono::Utc;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{CreateDoctorRequest, Department, Doctor, DoctorListing, Hospital, HospitalError};

/// Department catalog and doctor directory reads used by the booking
/// flow ("pick a department, then a doctor at a hospital").
pub struct DirectoryService {
    supabase: SupabaseClient,
}

impl DirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_departments(&self) -> Result<Vec<Department>, HospitalError> {
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, "/rest/v1/departments?select=*&order=name.asc", None, None)
            .await
            .map_err(|e| HospitalError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(|row| {
                serde_json::from_value(row)
                    .map_err(|e| HospitalError::DatabaseError(e.to_string()))
            })
            .collect()
    }

    /// All doctors of one department joined with their hospital's name.
    pub async fn doctors_in_department(
        &self,
        department_id: Uuid,
    ) -> Result<Vec<DoctorListing>, HospitalError> {
        let path = format!("/rest/v1/doctors?department_id=eq.{}", department_id);
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| HospitalError::DatabaseError(e.to_string()))?;

        let doctors: Vec<Doctor> = rows
            .into_iter()
            .map(|row| {
                serde_json::from_value(row)
                    .map_err(|e| HospitalError::DatabaseError(e.to_string()))
            })
            .collect::<Result<_, _>>()?;

        let hospital_rows: Vec<Value> = self
            .supabase
            .request(Method::GET, "/rest/v1/hospitals?select=*", None, None)
            .await
            .map_err(|e| HospitalError::DatabaseError(e.to_string()))?;

        let hospitals: Vec<Hospital> = hospital_rows
            .into_iter()
            .map(|row| {
                serde_json::from_value(row)
                    .map_err(|e| HospitalError::DatabaseError(e.to_string()))
            })
            .collect::<Result<_, _>>()?;

        let names: HashMap<Uuid, String> =
            hospitals.into_iter().map(|h| (h.id, h.name)).collect();

        debug!("{} doctors found for department {}", doctors.len(), department_id);

        Ok(doctors
            .into_iter()
            .filter_map(|doctor| {
                names.get(&doctor.hospital_id).map(|hospital_name| DoctorListing {
                    id: doctor.id,
                    name: doctor.name,
                    hospital_id: doctor.hospital_id,
                    hospital_name: hospital_name.clone(),
                    slots: doctor.slots,
                })
            })
            .collect())
    }

    pub async fn create_doctor(
        &self,
        request: CreateDoctorRequest,
        auth_token: &str,
    ) -> Result<Doctor, HospitalError> {
        if request.name.trim().is_empty() {
            return Err(HospitalError::ValidationError(
                "Doctor name must not be empty".to_string(),
            ));
        }

        let doctor_data = json!({
            "name": request.name,
            "department_id": request.department_id,
            "hospital_id": request.hospital_id,
            "slots": request.slots,
            "created_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/doctors",
                Some(auth_token),
                Some(doctor_data),
                Some(headers),
            )
            .await
            .map_err(|e| HospitalError::DatabaseError(e.to_string()))?;

        let doctor: Doctor = result
            .into_iter()
            .next()
            .ok_or_else(|| HospitalError::DatabaseError("Empty insert response".to_string()))
            .and_then(|row| {
                serde_json::from_value(row)
                    .map_err(|e| HospitalError::DatabaseError(e.to_string()))
            })?;

        info!("Doctor {} added to hospital {}", doctor.id, doctor.hospital_id);
        Ok(doctor)
    }
}
