// libs/appointment-cell/src/services/booking.rs
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;
use chrono::{NaiveDate, Utc};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Appointment, AppointmentError, BookAppointmentRequest};

/// The slice of the doctor record booking needs: which hospital the
/// appointment lands at, and which named slots exist at all.
#[derive(Debug, Deserialize)]
struct DoctorRecord {
    id: Uuid,
    hospital_id: Uuid,
    #[serde(default)]
    slots: Vec<String>,
}

pub struct AppointmentBookingService {
    supabase: SupabaseClient,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Book a scheduled appointment. The triage engine's emergency
    /// suggestions are advisory; this is the authoritative, re-checked
    /// write path.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for patient {} with doctor {}",
            request.patient_id, request.doctor_id
        );

        let doctor = self.get_doctor(&request.doctor_id, auth_token).await?;
        debug!("Doctor {} offers {} slots", doctor.id, doctor.slots.len());

        if !doctor.slots.iter().any(|s| s == &request.appointment_slot) {
            return Err(AppointmentError::SlotNotOffered {
                slot: request.appointment_slot,
            });
        }

        self.ensure_slot_free(
            &request.doctor_id,
            request.appointment_date,
            &request.appointment_slot,
            auth_token,
        )
        .await?;

        let appointment_data = json!({
            "patient_id": request.patient_id,
            "doctor_id": request.doctor_id,
            "hospital_id": doctor.hospital_id,
            "appointment_date": request.appointment_date.format("%Y-%m-%d").to_string(),
            "appointment_slot": request.appointment_slot,
            "created_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(auth_token),
                Some(appointment_data),
                Some(headers),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let appointment: Appointment = result
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::DatabaseError("Empty insert response".to_string()))
            .and_then(|row| {
                serde_json::from_value(row)
                    .map_err(|e| AppointmentError::DatabaseError(e.to_string()))
            })?;

        info!(
            "Appointment {} booked at hospital {} ({} {})",
            appointment.id,
            appointment.hospital_id,
            appointment.appointment_date,
            appointment.appointment_slot
        );
        Ok(appointment)
    }

    pub async fn list_patient_appointments(
        &self,
        patient_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&order=appointment_date.asc",
            patient_id
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(|row| {
                serde_json::from_value(row)
                    .map_err(|e| AppointmentError::DatabaseError(e.to_string()))
            })
            .collect()
    }

    async fn get_doctor(
        &self,
        doctor_id: &Uuid,
        auth_token: &str,
    ) -> Result<DoctorRecord, AppointmentError> {
        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .next()
            .ok_or(AppointmentError::DoctorNotFound)
            .and_then(|row| {
                serde_json::from_value(row)
                    .map_err(|e| AppointmentError::DatabaseError(e.to_string()))
            })
    }

    /// Same doctor, same date, same slot: first writer wins. Stale
    /// emergency suggestions also funnel through here, so a full
    /// hospital simply fails the booking rather than the lookup.
    async fn ensure_slot_free(
        &self,
        doctor_id: &Uuid,
        date: NaiveDate,
        slot: &str,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&appointment_date=eq.{}&appointment_slot=eq.{}",
            doctor_id,
            date.format("%Y-%m-%d"),
            slot
        );
        let existing: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if existing.is_empty() {
            debug!("Slot {} on {} free for doctor {}", slot, date, doctor_id);
            Ok(())
        } else {
            Err(AppointmentError::SlotTaken {
                slot: slot.to_string(),
                date,
            })
        }
    }
}
