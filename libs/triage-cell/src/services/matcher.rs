use std::collections::{HashMap, HashSet};

use tracing::debug;
use uuid::Uuid;

use crate::models::{Classification, HospitalCandidate, HospitalSnapshot, TriageSnapshot};
use crate::services::geo::haversine_km;

/// Classifications at or below this confidence take the low-confidence
/// path: nearest open beds regardless of specialty.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.55;

/// Upper bound on the returned candidate list.
pub const MAX_CANDIDATES: usize = 3;

#[derive(Debug, Clone)]
pub struct MatchRequest<'a> {
    pub classification: &'a Classification,
    pub coordinate: Option<(f64, f64)>,
    pub pincode: &'a str,
}

/// Rank candidate hospitals for an emergency. Returns at most
/// `MAX_CANDIDATES` entries, best first. Pure over the snapshot: no
/// mutation, no I/O, deterministic for a given input.
///
/// The result is advisory. Availability is a point-in-time read and may
/// be stale by the time a booking is attempted; confirmation is the
/// booking path's job.
pub fn rank_hospitals(request: &MatchRequest<'_>, snapshot: &TriageSnapshot) -> Vec<HospitalCandidate> {
    if snapshot.hospitals.is_empty() {
        return Vec::new();
    }

    if request.classification.confidence <= LOW_CONFIDENCE_THRESHOLD {
        rank_low_confidence(request, snapshot)
    } else {
        rank_confident(request, snapshot)
    }
}

/// Low-confidence branch: the classification is not trustworthy enough
/// to filter by specialty, so fall back to raw proximity (or pincode
/// locality when the patient's position is unknown).
fn rank_low_confidence(
    request: &MatchRequest<'_>,
    snapshot: &TriageSnapshot,
) -> Vec<HospitalCandidate> {
    match request.coordinate {
        Some(origin) => {
            let nearest = by_distance_with_beds(&snapshot.hospitals, origin, None);
            debug!(
                "Low-confidence dispatch: {} hospitals with open beds in range",
                nearest.len()
            );
            nearest
                .into_iter()
                .take(MAX_CANDIDATES)
                .map(|(hospital, distance)| candidate(hospital, Some(distance), false))
                .collect()
        }
        None => snapshot
            .hospitals
            .iter()
            .filter(|h| pincode_eq(&h.pincode, request.pincode))
            .take(MAX_CANDIDATES)
            .map(|hospital| candidate(hospital, None, false))
            .collect(),
    }
}

/// Confident branch: prefer hospitals staffing the classified
/// department, then backfill with the general pool so the patient is
/// never left without an option merely because no specialist is on
/// duty.
fn rank_confident(request: &MatchRequest<'_>, snapshot: &TriageSnapshot) -> Vec<HospitalCandidate> {
    let staffed = staffed_hospital_ids(snapshot, &request.classification.department);
    debug!(
        "{} hospitals staff {} right now",
        staffed.len(),
        request.classification.department
    );

    let ordered: Vec<(&HospitalSnapshot, Option<f64>)> = match request.coordinate {
        Some(origin) => {
            let specialty = by_distance_with_beds(&snapshot.hospitals, origin, Some(&staffed));
            let backfill = by_distance_with_beds(&snapshot.hospitals, origin, None);
            specialty
                .into_iter()
                .chain(backfill)
                .map(|(h, d)| (h, Some(d)))
                .collect()
        }
        None => {
            let local: Vec<&HospitalSnapshot> = snapshot
                .hospitals
                .iter()
                .filter(|h| pincode_eq(&h.pincode, request.pincode))
                .collect();
            let specialty = local.iter().copied().filter(|h| staffed.contains(&h.id));
            specialty
                .chain(local.iter().copied())
                .map(|h| (h, None))
                .collect()
        }
    };

    // The specialty list and the backfill overlap; keep each hospital's
    // first (highest-priority) occurrence only.
    let mut seen = HashSet::new();
    ordered
        .into_iter()
        .filter(|(h, _)| seen.insert(h.id))
        .take(MAX_CANDIDATES)
        .map(|(h, distance)| candidate(h, distance, staffed.contains(&h.id)))
        .collect()
}

/// Hospitals with at least one on-duty doctor in the named department.
/// An unresolvable department name yields the empty set, which degrades
/// the confident branch to pure backfill.
fn staffed_hospital_ids(snapshot: &TriageSnapshot, department: &str) -> HashSet<Uuid> {
    let Some(department_id) = snapshot.departments.resolve_name(department) else {
        debug!("Department {} not in catalog; specialty set is empty", department);
        return HashSet::new();
    };

    let doctor_departments: HashMap<Uuid, Uuid> = snapshot
        .doctors
        .iter()
        .map(|d| (d.id, d.department_id))
        .collect();

    snapshot
        .hospitals
        .iter()
        .filter(|hospital| {
            hospital.on_duty_doctor_ids.iter().any(|doctor_id| {
                doctor_departments.get(doctor_id) == Some(&department_id)
            })
        })
        .map(|hospital| hospital.id)
        .collect()
}

/// Hospitals sorted by ascending distance from `origin`, restricted to
/// open emergency beds, optionally restricted to a specialty set.
/// Hospitals without coordinates cannot be ranked and are skipped.
fn by_distance_with_beds<'a>(
    hospitals: &'a [HospitalSnapshot],
    origin: (f64, f64),
    restrict_to: Option<&HashSet<Uuid>>,
) -> Vec<(&'a HospitalSnapshot, f64)> {
    let mut ranked: Vec<(&HospitalSnapshot, f64)> = hospitals
        .iter()
        .filter(|h| restrict_to.map_or(true, |ids| ids.contains(&h.id)))
        .filter(|h| h.has_free_beds())
        .filter_map(|h| {
            h.coordinate()
                .map(|(lat, lon)| (h, haversine_km(origin.0, origin.1, lat, lon)))
        })
        .collect();

    ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

fn pincode_eq(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}

fn candidate(
    hospital: &HospitalSnapshot,
    distance_km: Option<f64>,
    specialty_match: bool,
) -> HospitalCandidate {
    HospitalCandidate {
        hospital_id: hospital.id,
        name: hospital.name.clone(),
        address: hospital.address.clone(),
        telephone: hospital.telephone.clone(),
        pincode: hospital.pincode.clone(),
        distance_km,
        emergency_available: hospital.emergency_available,
        specialty_match,
    }
}
