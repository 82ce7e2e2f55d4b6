// libs/hospital-cell/tests/hospital_test.rs
//
// Registration and capacity-reporting tests against a mocked PostgREST
// backend.

use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::{Mock, MockServer, ResponseTemplate, matchers::{method, path, query_param}};

use hospital_cell::models::{
    HospitalError, RegisterHospitalRequest, ReportCapacityRequest,
};
use hospital_cell::services::HospitalService;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

fn hospital_row(id: Uuid, capacity: i32, available: i32) -> serde_json::Value {
    json!({
        "id": id,
        "email": "frontdesk@stjames.example",
        "name": "St James",
        "address": "James Street",
        "telephone": "+353-1-555-0100",
        "pincode": "D08",
        "lat": 53.3393,
        "lon": -6.2957,
        "emergency_capacity": capacity,
        "emergency_available": available,
        "department_ids": [],
        "on_duty_doctor_ids": [],
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
}

fn register_request() -> RegisterHospitalRequest {
    RegisterHospitalRequest {
        email: "frontdesk@stjames.example".to_string(),
        name: "St James".to_string(),
        address: "James Street".to_string(),
        telephone: "+353-1-555-0100".to_string(),
        pincode: "D08".to_string(),
        lat: Some(53.3393),
        lon: Some(-6.2957),
        emergency_capacity: 12,
        department_ids: vec![],
    }
}

async fn service_against(mock_server: &MockServer) -> HospitalService {
    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    HospitalService::new(&config)
}

#[tokio::test]
async fn registration_rejects_duplicate_email() {
    let mock_server = MockServer::start().await;
    let service = service_against(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/hospitals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![
            MockSupabaseResponses::hospital_response(
                &Uuid::new_v4().to_string(), "D08", Some(53.34), Some(-6.3), 12, 12,
            ),
        ]))
        .mount(&mock_server)
        .await;

    let result = service.register_hospital(register_request(), "token").await;

    assert_matches!(result, Err(HospitalError::EmailAlreadyExists { .. }));
}

#[tokio::test]
async fn registration_starts_with_all_beds_open() {
    let mock_server = MockServer::start().await;
    let service = service_against(&mock_server).await;

    let new_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/hospitals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<serde_json::Value>::new()))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/hospitals"))
        .respond_with(ResponseTemplate::new(201).set_body_json(vec![
            hospital_row(new_id, 12, 12),
        ]))
        .mount(&mock_server)
        .await;

    let hospital = service.register_hospital(register_request(), "token").await.unwrap();

    assert_eq!(hospital.id, new_id);
    assert_eq!(hospital.emergency_available, hospital.emergency_capacity);
}

#[tokio::test]
async fn registration_rejects_negative_capacity() {
    let mock_server = MockServer::start().await;
    let service = service_against(&mock_server).await;

    let mut request = register_request();
    request.emergency_capacity = -1;

    let result = service.register_hospital(request, "token").await;

    assert_matches!(result, Err(HospitalError::ValidationError(_)));
}

#[tokio::test]
async fn capacity_report_above_total_is_rejected() {
    let mock_server = MockServer::start().await;
    let service = service_against(&mock_server).await;

    let id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/rest/v1/hospitals"))
        .and(query_param("id", format!("eq.{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![
            hospital_row(id, 10, 4),
        ]))
        .mount(&mock_server)
        .await;

    let result = service
        .report_capacity(&id.to_string(), ReportCapacityRequest { emergency_available: 11 }, "token")
        .await;

    assert_matches!(
        result,
        Err(HospitalError::InvalidCapacity { available: 11, capacity: 10 })
    );
}

#[tokio::test]
async fn capacity_report_below_zero_is_rejected() {
    let mock_server = MockServer::start().await;
    let service = service_against(&mock_server).await;

    let id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/rest/v1/hospitals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![
            hospital_row(id, 10, 4),
        ]))
        .mount(&mock_server)
        .await;

    let result = service
        .report_capacity(&id.to_string(), ReportCapacityRequest { emergency_available: -2 }, "token")
        .await;

    assert_matches!(result, Err(HospitalError::InvalidCapacity { .. }));
}

#[tokio::test]
async fn capacity_report_within_bounds_patches_the_record() {
    let mock_server = MockServer::start().await;
    let service = service_against(&mock_server).await;

    let id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/rest/v1/hospitals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![
            hospital_row(id, 10, 4),
        ]))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/hospitals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![
            hospital_row(id, 10, 7),
        ]))
        .mount(&mock_server)
        .await;

    let hospital = service
        .report_capacity(&id.to_string(), ReportCapacityRequest { emergency_available: 7 }, "token")
        .await
        .unwrap();

    assert_eq!(hospital.emergency_available, 7);
}

#[tokio::test]
async fn missing_hospital_is_not_found() {
    let mock_server = MockServer::start().await;
    let service = service_against(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/hospitals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<serde_json::Value>::new()))
        .mount(&mock_server)
        .await;

    let result = service.get_hospital(&Uuid::new_v4().to_string()).await;

    assert_matches!(result, Err(HospitalError::NotFound));
}
