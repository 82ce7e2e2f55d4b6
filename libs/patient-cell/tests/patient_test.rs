// libs/patient-cell/tests/patient_test.rs

use assert_matches::assert_matches;
use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;
use wiremock::{Mock, MockServer, ResponseTemplate, matchers::{method, path}};

use patient_cell::models::{CreatePatientRequest, PatientError};
use patient_cell::services::PatientService;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

fn patient_row(id: Uuid, email: &str) -> serde_json::Value {
    json!({
        "id": id,
        "first_name": "Aoife",
        "last_name": "Byrne",
        "email": email,
        "phone_number": "+353-1-555-0199",
        "date_of_birth": "1990-04-12",
        "pincode": "D01",
        "lat": 53.35,
        "lon": -6.26,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
}

fn create_request(email: &str) -> CreatePatientRequest {
    CreatePatientRequest {
        first_name: "Aoife".to_string(),
        last_name: "Byrne".to_string(),
        email: email.to_string(),
        phone_number: Some("+353-1-555-0199".to_string()),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
        pincode: "D01".to_string(),
        lat: Some(53.35),
        lon: Some(-6.26),
    }
}

#[tokio::test]
async fn registration_creates_a_profile() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    let service = PatientService::new(&config);

    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<serde_json::Value>::new()))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(201).set_body_json(vec![
            patient_row(id, "aoife@example.com"),
        ]))
        .mount(&mock_server)
        .await;

    let patient = service
        .create_patient(create_request("aoife@example.com"), "token")
        .await
        .unwrap();

    assert_eq!(patient.id, id);
    assert_eq!(patient.full_name(), "Aoife Byrne");
    assert_eq!(patient.coordinate(), Some((53.35, -6.26)));
}

#[tokio::test]
async fn registration_rejects_duplicate_email() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    let service = PatientService::new(&config);

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![
            MockSupabaseResponses::patient_response(&Uuid::new_v4().to_string(), "D01"),
        ]))
        .mount(&mock_server)
        .await;

    let result = service
        .create_patient(create_request("test@example.com"), "token")
        .await;

    assert_matches!(result, Err(PatientError::EmailAlreadyExists { .. }));
}

#[tokio::test]
async fn registration_rejects_blank_pincode() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    let service = PatientService::new(&config);

    let mut request = create_request("aoife@example.com");
    request.pincode = "  ".to_string();

    let result = service.create_patient(request, "token").await;

    assert_matches!(result, Err(PatientError::ValidationError(_)));
}

#[tokio::test]
async fn unknown_patient_is_not_found() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    let service = PatientService::new(&config);

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<serde_json::Value>::new()))
        .mount(&mock_server)
        .await;

    let result = service.get_patient(&Uuid::new_v4().to_string(), "token").await;

    assert_matches!(result, Err(PatientError::NotFound));
}
