use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use chrono::Utc;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    Hospital, HospitalError, RegisterHospitalRequest, ReportCapacityRequest,
    UpdateOnDutyRequest,
};

pub struct HospitalService {
    supabase: SupabaseClient,
}

impl HospitalService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn register_hospital(
        &self,
        request: RegisterHospitalRequest,
        auth_token: &str,
    ) -> Result<Hospital, HospitalError> {
        debug!("Registering hospital: {}", request.email);

        if request.emergency_capacity < 0 {
            return Err(HospitalError::ValidationError(
                "emergency_capacity must be non-negative".to_string(),
            ));
        }

        let existing_check_path = format!("/rest/v1/hospitals?email=eq.{}", request.email);
        let existing: Vec<Value> = self
            .supabase
            .request(Method::GET, &existing_check_path, Some(auth_token), None)
            .await
            .map_err(|e| HospitalError::DatabaseError(e.to_string()))?;

        if !existing.is_empty() {
            return Err(HospitalError::EmailAlreadyExists { email: request.email });
        }

        let hospital_data = json!({
            "email": request.email,
            "name": request.name,
            "address": request.address,
            "telephone": request.telephone,
            "pincode": request.pincode,
            "lat": request.lat,
            "lon": request.lon,
            "emergency_capacity": request.emergency_capacity,
            // A new registration starts with every emergency bed open.
            "emergency_available": request.emergency_capacity,
            "department_ids": request.department_ids,
            "on_duty_doctor_ids": [],
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/hospitals",
                Some(auth_token),
                Some(hospital_data),
                Some(headers),
            )
            .await
            .map_err(|e| HospitalError::DatabaseError(e.to_string()))?;

        let hospital: Hospital = result
            .into_iter()
            .next()
            .ok_or_else(|| HospitalError::DatabaseError("Empty insert response".to_string()))
            .and_then(|row| {
                serde_json::from_value(row)
                    .map_err(|e| HospitalError::DatabaseError(e.to_string()))
            })?;

        info!("Hospital registered with ID: {}", hospital.id);
        Ok(hospital)
    }

    pub async fn get_hospital(&self, hospital_id: &str) -> Result<Hospital, HospitalError> {
        let path = format!("/rest/v1/hospitals?id=eq.{}", hospital_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| HospitalError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .next()
            .ok_or(HospitalError::NotFound)
            .and_then(|row| {
                serde_json::from_value(row)
                    .map_err(|e| HospitalError::DatabaseError(e.to_string()))
            })
    }

    pub async fn list_hospitals(&self) -> Result<Vec<Hospital>, HospitalError> {
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, "/rest/v1/hospitals?select=*&order=name.asc", None, None)
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

    /// Live occupancy report from a hospital dashboard. The invariant
    /// 0 <= available <= capacity is enforced here, on the write path;
    /// the triage engine only ever reads the stored counters.
    pub async fn report_capacity(
        &self,
        hospital_id: &str,
        request: ReportCapacityRequest,
        auth_token: &str,
    ) -> Result<Hospital, HospitalError> {
        let hospital = self.get_hospital(hospital_id).await?;

        if request.emergency_available < 0
            || request.emergency_available > hospital.emergency_capacity
        {
            return Err(HospitalError::InvalidCapacity {
                available: request.emergency_available,
                capacity: hospital.emergency_capacity,
            });
        }

        let patch = json!({
            "emergency_available": request.emergency_available,
            "updated_at": Utc::now().to_rfc3339()
        });

        let updated = self.patch_hospital(hospital_id, patch, auth_token).await?;

        info!(
            "Hospital {} reports {}/{} emergency beds open",
            updated.id, updated.emergency_available, updated.emergency_capacity
        );
        Ok(updated)
    }

    /// Replace the on-duty roster wholesale. The triage engine resolves
    /// specialty staffing through this list.
    pub async fn update_on_duty(
        &self,
        hospital_id: &str,
        request: UpdateOnDutyRequest,
        auth_token: &str,
    ) -> Result<Hospital, HospitalError> {
        let patch = json!({
            "on_duty_doctor_ids": request.on_duty_doctor_ids,
            "updated_at": Utc::now().to_rfc3339()
        });

        self.patch_hospital(hospital_id, patch, auth_token).await
    }

    async fn patch_hospital(
        &self,
        hospital_id: &str,
        patch: Value,
        auth_token: &str,
    ) -> Result<Hospital, HospitalError> {
        let path = format!("/rest/v1/hospitals?id=eq.{}", hospital_id);

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, Some(auth_token), Some(patch), Some(headers))
            .await
            .map_err(|e| HospitalError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .next()
            .ok_or(HospitalError::NotFound)
            .and_then(|row| {
                serde_json::from_value(row)
                    .map_err(|e| HospitalError::DatabaseError(e.to_string()))
            })
    }
}
