use reqwest::Method;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    DepartmentCatalog, DepartmentRecord, DoctorSnapshot, EmergencyDispatchRequest,
    EmergencyDispatchResponse, HospitalSnapshot, TriageError, TriageSnapshot,
};
use crate::services::classifier::{SymptomClassifier, TriageRuleTable};
use crate::services::matcher::{rank_hospitals, MatchRequest};

/// Orchestrates one emergency lookup: load a point-in-time snapshot of
/// hospitals, doctors and departments, classify the symptom text, rank
/// candidates. Holds no mutable state between invocations.
pub struct EmergencyDispatchService {
    supabase: SupabaseClient,
    classifier: SymptomClassifier,
}

impl EmergencyDispatchService {
    pub fn new(config: &AppConfig) -> Result<Self, TriageError> {
        Ok(Self {
            supabase: SupabaseClient::new(config),
            classifier: SymptomClassifier::new(TriageRuleTable::default())?,
        })
    }

    pub fn with_rules(config: &AppConfig, rules: TriageRuleTable) -> Result<Self, TriageError> {
        Ok(Self {
            supabase: SupabaseClient::new(config),
            classifier: SymptomClassifier::new(rules)?,
        })
    }

    pub async fn dispatch(
        &self,
        request: EmergencyDispatchRequest,
    ) -> Result<EmergencyDispatchResponse, TriageError> {
        let snapshot = self.load_snapshot().await?;

        let classification = self.classifier.classify(&request.symptoms);
        info!(
            "Emergency classified as {} (confidence {})",
            classification.department, classification.confidence
        );

        let coordinate = normalize_coordinate(request.lat, request.lon);
        let candidates = rank_hospitals(
            &MatchRequest {
                classification: &classification,
                coordinate,
                pincode: &request.pincode,
            },
            &snapshot,
        );

        info!(
            "Ranked {} candidate hospitals for {} emergency",
            candidates.len(),
            classification.department
        );

        Ok(EmergencyDispatchResponse { classification, candidates })
    }

    pub fn classify(&self, symptoms: &str) -> crate::models::Classification {
        self.classifier.classify(symptoms)
    }

    async fn load_snapshot(&self) -> Result<TriageSnapshot, TriageError> {
        let hospitals: Vec<HospitalSnapshot> = self
            .supabase
            .request(Method::GET, "/rest/v1/hospitals?select=*", None, None)
            .await
            .map_err(|e| TriageError::SnapshotLoad(e.to_string()))?;

        let doctors: Vec<DoctorSnapshot> = self
            .supabase
            .request(
                Method::GET,
                "/rest/v1/doctors?select=id,department_id,hospital_id",
                None,
                None,
            )
            .await
            .map_err(|e| TriageError::SnapshotLoad(e.to_string()))?;

        let departments: Vec<DepartmentRecord> = self
            .supabase
            .request(Method::GET, "/rest/v1/departments?select=id,name", None, None)
            .await
            .map_err(|e| TriageError::SnapshotLoad(e.to_string()))?;

        debug!(
            "Snapshot loaded: {} hospitals, {} doctors, {} departments",
            hospitals.len(),
            doctors.len(),
            departments.len()
        );

        Ok(TriageSnapshot {
            hospitals,
            doctors,
            departments: DepartmentCatalog::from_records(departments),
        })
    }
}

/// Treat malformed positions as absent rather than failing the lookup:
/// a missing coordinate just selects the pincode branch downstream.
fn normalize_coordinate(lat: Option<f64>, lon: Option<f64>) -> Option<(f64, f64)> {
    match (lat, lon) {
        (Some(lat), Some(lon))
            if lat.is_finite()
                && lon.is_finite()
                && (-90.0..=90.0).contains(&lat)
                && (-180.0..=180.0).contains(&lon) =>
        {
            Some((lat, lon))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_coordinates_pass_through() {
        assert_eq!(normalize_coordinate(Some(53.3), Some(-6.2)), Some((53.3, -6.2)));
    }

    #[test]
    fn partial_coordinates_are_absent() {
        assert_eq!(normalize_coordinate(Some(53.3), None), None);
        assert_eq!(normalize_coordinate(None, Some(-6.2)), None);
        assert_eq!(normalize_coordinate(None, None), None);
    }

    #[test]
    fn out_of_range_or_non_finite_coordinates_are_absent() {
        assert_eq!(normalize_coordinate(Some(91.0), Some(0.0)), None);
        assert_eq!(normalize_coordinate(Some(0.0), Some(181.0)), None);
        assert_eq!(normalize_coordinate(Some(f64::NAN), Some(0.0)), None);
        assert_eq!(normalize_coordinate(Some(0.0), Some(f64::INFINITY)), None);
    }
}
