use assert_matches::assert_matches;

use queue_cell::{QueueError, QueueService};
use scheduling_cell::{BookAppointmentRequest, BookingService};
use shared_models::domain::{AppointmentStatus, QueueItemStatus};
use shared_utils::test_support::{t, ClinicFixture, TestUser};

async fn book_today(fixture: &ClinicFixture, patient_id: uuid::Uuid, time: chrono::NaiveTime) -> shared_models::domain::Appointment {
    BookingService::new(fixture.state.clone())
        .book(
            patient_id,
            BookAppointmentRequest {
                doctor_id: fixture.doctor_id,
                hospital_id: fixture.hospital_id,
                appointment_type_id: fixture.consult_type_id,
                date: fixture.today(),
                time,
                patient_id: None,
            },
        )
        .await
        .expect("same-day booking should succeed")
}

#[tokio::test]
async fn check_in_converts_a_same_day_appointment() {
    let fixture = ClinicFixture::new().await;
    fixture.seed_full_week(fixture.doctor_id, fixture.hospital_id).await;
    let queue = QueueService::new(fixture.state.clone());

    let patient = TestUser::patient();
    let appointment = book_today(&fixture, patient.id, t(9, 0)).await;

    let item = queue
        .check_in(appointment.id, None)
        .await
        .expect("check-in should succeed");

    assert_eq!(item.status, QueueItemStatus::Waiting);
    assert_eq!(item.source_appointment_id, Some(appointment.id));
    assert_eq!(item.requester.patient_id(), Some(patient.id));
    assert_eq!(item.queue_number, 1);

    let err = queue
        .check_in(appointment.id, None)
        .await
        .expect_err("an appointment checks in once");
    assert_matches!(err, QueueError::AlreadyQueued(_));
}

#[tokio::test]
async fn only_todays_upcoming_appointments_check_in() {
    let fixture = ClinicFixture::new().await;
    fixture.seed_full_week(fixture.doctor_id, fixture.hospital_id).await;
    let queue = QueueService::new(fixture.state.clone());
    let booking = BookingService::new(fixture.state.clone());

    // Tomorrow's appointment is not eligible.
    let patient = TestUser::patient();
    let future = booking
        .book(
            patient.id,
            BookAppointmentRequest {
                doctor_id: fixture.doctor_id,
                hospital_id: fixture.hospital_id,
                appointment_type_id: fixture.consult_type_id,
                date: fixture.today() + chrono::Duration::days(1),
                time: t(9, 0),
                patient_id: None,
            },
        )
        .await
        .expect("future booking");

    let err = queue.check_in(future.id, None).await.expect_err("not today");
    assert_matches!(err, QueueError::Validation(_));

    // A cancelled same-day appointment is not eligible either.
    let other = TestUser::patient();
    let cancelled = book_today(&fixture, other.id, t(10, 0)).await;
    booking
        .update_status(cancelled.id, AppointmentStatus::Cancelled)
        .await
        .expect("cancellation");

    let err = queue
        .check_in(cancelled.id, None)
        .await
        .expect_err("cancelled appointments stay out");
    assert_matches!(err, QueueError::Validation(_));
}

#[tokio::test]
async fn completing_the_visit_completes_the_source_appointment() {
    let fixture = ClinicFixture::new().await;
    fixture.seed_full_week(fixture.doctor_id, fixture.hospital_id).await;
    let queue = QueueService::new(fixture.state.clone());

    let patient = TestUser::patient();
    let appointment = book_today(&fixture, patient.id, t(9, 0)).await;
    queue.check_in(appointment.id, None).await.expect("check-in");

    queue
        .add_walk_in(fixture.doctor_id, fixture.hospital_id, "Ade".to_string())
        .await
        .expect("walk-in");

    queue.call_next(fixture.doctor_id).await.expect("patient goes in");
    queue.call_next(fixture.doctor_id).await.expect("visit finishes, walk-in goes in");

    let tables = fixture.state.store.read().await;
    let finished = tables.appointment(appointment.id).expect("appointment exists");
    assert_eq!(finished.status, AppointmentStatus::Completed);
}

#[tokio::test]
async fn a_cancelled_appointment_does_not_evict_a_checked_in_patient() {
    let fixture = ClinicFixture::new().await;
    fixture.seed_full_week(fixture.doctor_id, fixture.hospital_id).await;
    let queue = QueueService::new(fixture.state.clone());

    let patient = TestUser::patient();
    let appointment = book_today(&fixture, patient.id, t(9, 0)).await;
    let item = queue.check_in(appointment.id, None).await.expect("check-in");

    BookingService::new(fixture.state.clone())
        .update_status(appointment.id, AppointmentStatus::Cancelled)
        .await
        .expect("cancellation after check-in");

    // The queue item references the appointment weakly and keeps its place.
    let tables = fixture.state.store.read().await;
    let current = tables.queue_item(item.id).expect("item exists");
    assert_eq!(current.status, QueueItemStatus::Waiting);
}

#[tokio::test]
async fn geofenced_hospitals_verify_proximity() {
    let fixture = ClinicFixture::new().await;
    // Lagos island clinic with verification enabled.
    let fenced_hospital = fixture
        .seed_hospital("Lagoon Clinic", Some((6.5244, 3.3792)))
        .await;
    fixture.seed_full_week(fixture.doctor_id, fenced_hospital).await;
    let fenced_type = {
        // The consult type is hospital-scoped; mint one for the fenced site.
        use shared_models::domain::AppointmentType;
        let id = uuid::Uuid::new_v4();
        let mut tables = fixture.state.store.write().await;
        tables.insert_appointment_type(AppointmentType {
            id,
            hospital_id: fenced_hospital,
            specialty_id: fixture.specialty_id,
            name: "General Consultation".to_string(),
            duration_minutes: 20,
            cost: 50.0,
        });
        id
    };

    let queue = QueueService::new(fixture.state.clone());
    let booking = BookingService::new(fixture.state.clone());

    let patient = TestUser::patient();
    let appointment = booking
        .book(
            patient.id,
            BookAppointmentRequest {
                doctor_id: fixture.doctor_id,
                hospital_id: fenced_hospital,
                appointment_type_id: fenced_type,
                date: fixture.today(),
                time: t(9, 0),
                patient_id: None,
            },
        )
        .await
        .expect("booking at the fenced hospital");

    let err = queue
        .check_in(appointment.id, None)
        .await
        .expect_err("coordinates are required here");
    assert_matches!(err, QueueError::Validation(_));

    let err = queue
        .check_in(appointment.id, Some((51.5074, -0.1278)))
        .await
        .expect_err("London is rather far from Lagos");
    assert_matches!(err, QueueError::OutsideServiceArea { distance_km } if distance_km > 4000.0);

    let item = queue
        .check_in(appointment.id, Some((6.5250, 3.3800)))
        .await
        .expect("a nearby patient checks in");
    assert_eq!(item.status, QueueItemStatus::Waiting);
}
