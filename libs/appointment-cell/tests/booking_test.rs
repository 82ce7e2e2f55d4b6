// libs/appointment-cell/tests/booking_test.rs
//
// Booking-path tests against a mocked PostgREST backend: slot
// validation, conflict detection, successful insert.

use assert_matches::assert_matches;
use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;
use wiremock::{Mock, MockServer, ResponseTemplate, matchers::{method, path}};

use appointment_cell::models::{AppointmentError, BookAppointmentRequest};
use appointment_cell::services::AppointmentBookingService;
use shared_utils::test_utils::TestConfig;

struct TestSetup {
    service: AppointmentBookingService,
    mock_server: MockServer,
    doctor_id: Uuid,
    hospital_id: Uuid,
}

impl TestSetup {
    async fn new() -> Self {
        let mock_server = MockServer::start().await;
        let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
        let service = AppointmentBookingService::new(&config);

        Self {
            service,
            mock_server,
            doctor_id: Uuid::new_v4(),
            hospital_id: Uuid::new_v4(),
        }
    }

    async fn mount_doctor(&self, slots: &[&str]) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/doctors"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![json!({
                "id": self.doctor_id,
                "name": "Dr. Nic Aodha",
                "department_id": Uuid::new_v4(),
                "hospital_id": self.hospital_id,
                "slots": slots,
                "created_at": "2024-01-01T00:00:00Z"
            })]))
            .mount(&self.mock_server)
            .await;
    }

    async fn mount_existing_appointments(&self, rows: Vec<serde_json::Value>) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/appointments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .mount(&self.mock_server)
            .await;
    }

    fn request(&self, slot: &str) -> BookAppointmentRequest {
        BookAppointmentRequest {
            patient_id: Uuid::new_v4(),
            doctor_id: self.doctor_id,
            appointment_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            appointment_slot: slot.to_string(),
        }
    }
}

#[tokio::test]
async fn booking_a_free_slot_succeeds() {
    let setup = TestSetup::new().await;
    setup.mount_doctor(&["09:00-09:30", "09:30-10:00"]).await;
    setup.mount_existing_appointments(vec![]).await;

    let request = setup.request("09:00-09:30");
    let appointment_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(vec![json!({
            "id": appointment_id,
            "patient_id": request.patient_id,
            "doctor_id": setup.doctor_id,
            "hospital_id": setup.hospital_id,
            "appointment_date": "2025-09-01",
            "appointment_slot": "09:00-09:30",
            "created_at": "2025-08-01T00:00:00Z"
        })]))
        .mount(&setup.mock_server)
        .await;

    let appointment = setup.service.book_appointment(request, "token").await.unwrap();

    assert_eq!(appointment.id, appointment_id);
    assert_eq!(appointment.hospital_id, setup.hospital_id);
    assert_eq!(appointment.appointment_slot, "09:00-09:30");
}

#[tokio::test]
async fn booking_an_unoffered_slot_is_rejected() {
    let setup = TestSetup::new().await;
    setup.mount_doctor(&["09:00-09:30"]).await;

    let result = setup.service.book_appointment(setup.request("14:00-14:30"), "token").await;

    assert_matches!(result, Err(AppointmentError::SlotNotOffered { .. }));
}

#[tokio::test]
async fn double_booking_a_slot_is_a_conflict() {
    let setup = TestSetup::new().await;
    setup.mount_doctor(&["09:00-09:30"]).await;
    setup
        .mount_existing_appointments(vec![json!({
            "id": Uuid::new_v4(),
            "patient_id": Uuid::new_v4(),
            "doctor_id": setup.doctor_id,
            "hospital_id": setup.hospital_id,
            "appointment_date": "2025-09-01",
            "appointment_slot": "09:00-09:30",
            "created_at": "2025-08-01T00:00:00Z"
        })])
        .await;

    let result = setup.service.book_appointment(setup.request("09:00-09:30"), "token").await;

    assert_matches!(result, Err(AppointmentError::SlotTaken { .. }));
}

#[tokio::test]
async fn booking_with_an_unknown_doctor_fails() {
    let setup = TestSetup::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<serde_json::Value>::new()))
        .mount(&setup.mock_server)
        .await;

    let result = setup.service.book_appointment(setup.request("09:00-09:30"), "token").await;

    assert_matches!(result, Err(AppointmentError::DoctorNotFound));
}
