use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-only view of a hospital as handed to the triage engine. The
/// engine never mutates these records; concurrency control over the
/// availability counters lives with the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalSnapshot {
    pub id: Uuid,
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
}

impl HospitalSnapshot {
    /// Both coordinates, or nothing. A hospital missing either value
    /// cannot take part in distance ranking.
    pub fn coordinate(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn has_free_beds(&self) -> bool {
        self.emergency_available > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSnapshot {
    pub id: Uuid,
    pub department_id: Uuid,
    pub hospital_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentRecord {
    pub id: Uuid,
    pub name: String,
}

/// Bidirectional department name/id lookup. Name resolution is
/// case-insensitive; the stored display name keeps its original casing.
#[derive(Debug, Clone, Default)]
pub struct DepartmentCatalog {
    by_name: HashMap<String, Uuid>,
    by_id: HashMap<Uuid, String>,
}

impl DepartmentCatalog {
    pub fn from_records(records: Vec<DepartmentRecord>) -> Self {
        let mut catalog = Self::default();
        for record in records {
            catalog.insert(record.id, record.name);
        }
        catalog
    }

    pub fn insert(&mut self, id: Uuid, name: String) {
        self.by_name.insert(name.to_lowercase(), id);
        self.by_id.insert(id, name);
    }

    pub fn resolve_name(&self, name: &str) -> Option<Uuid> {
        self.by_name.get(&name.to_lowercase()).copied()
    }

    pub fn name_of(&self, id: Uuid) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Everything the matcher needs, materialized by the caller before the
/// engine runs. Immutable for the duration of one invocation.
#[derive(Debug, Clone)]
pub struct TriageSnapshot {
    pub hospitals: Vec<HospitalSnapshot>,
    pub doctors: Vec<DoctorSnapshot>,
    pub departments: DepartmentCatalog,
}

/// Classifier output. The department may be a fallback value with no
/// catalog entry; the matcher treats an unresolved department as an
/// empty specialty set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub department: String,
    pub confidence: f64,
}

/// One ranked hospital, with the display fields passed through from the
/// snapshot unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalCandidate {
    pub hospital_id: Uuid,
    pub name: String,
    pub address: String,
    pub telephone: String,
    pub pincode: String,
    pub distance_km: Option<f64>,
    pub emergency_available: i32,
    pub specialty_match: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmergencyDispatchRequest {
    pub symptoms: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub pincode: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmergencyDispatchResponse {
    pub classification: Classification,
    pub candidates: Vec<HospitalCandidate>,
}

#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("Invalid trigger pattern in rule table: {0}")]
    RuleCompile(#[from] regex::Error),

    #[error("Failed to load triage snapshot: {0}")]
    SnapshotLoad(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_resolves_names_case_insensitively() {
        let id = Uuid::new_v4();
        let catalog = DepartmentCatalog::from_records(vec![DepartmentRecord {
            id,
            name: "Cardiology".to_string(),
        }]);

        assert_eq!(catalog.resolve_name("cardiology"), Some(id));
        assert_eq!(catalog.resolve_name("CARDIOLOGY"), Some(id));
        assert_eq!(catalog.name_of(id), Some("Cardiology"));
        assert_eq!(catalog.resolve_name("Oncology"), None);
        assert_eq!(catalog.len(), 1);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn coordinate_requires_both_components() {
        let mut hospital = HospitalSnapshot {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            address: "1 Test Street".to_string(),
            telephone: "+353-1-555-0100".to_string(),
            pincode: "D01".to_string(),
            lat: Some(53.35),
            lon: None,
            emergency_capacity: 5,
            emergency_available: 2,
            department_ids: Vec::new(),
            on_duty_doctor_ids: Vec::new(),
        };

        assert_eq!(hospital.coordinate(), None);

        hospital.lon = Some(-6.26);
        assert_eq!(hospital.coordinate(), Some((53.35, -6.26)));
        assert!(hospital.has_free_beds());
    }
}
