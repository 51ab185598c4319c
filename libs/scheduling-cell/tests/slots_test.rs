use assert_matches::assert_matches;
use uuid::Uuid;

use scheduling_cell::{BookAppointmentRequest, BookingService, SchedulingError, SlotService};
use shared_utils::test_support::{t, ClinicFixture, TestUser};

#[tokio::test]
async fn fills_a_one_hour_window_in_twenty_minute_steps() {
    let fixture = ClinicFixture::new().await;
    let monday = fixture.upcoming(1);
    fixture
        .seed_window(fixture.doctor_id, fixture.hospital_id, 1, t(9, 0), t(10, 0))
        .await;

    let slots = SlotService::new(fixture.state.clone());
    let booking = BookingService::new(fixture.state.clone());

    let mut observed = Vec::new();
    for expected_position in 1..=3 {
        let offer = slots
            .next_available_slot(
                fixture.doctor_id,
                fixture.hospital_id,
                monday,
                fixture.consult_type_id,
            )
            .await
            .expect("a slot should be free");

        assert_eq!(offer.queue_position, expected_position);
        observed.push(offer.time);

        let patient = TestUser::patient();
        booking
            .book(
                patient.id,
                BookAppointmentRequest {
                    doctor_id: fixture.doctor_id,
                    hospital_id: fixture.hospital_id,
                    appointment_type_id: fixture.consult_type_id,
                    date: monday,
                    time: offer.time,
                    patient_id: None,
                },
            )
            .await
            .expect("booking the offered slot should succeed");
    }

    assert_eq!(observed, vec![t(9, 0), t(9, 20), t(9, 40)]);

    // The window is now full.
    let err = slots
        .next_available_slot(
            fixture.doctor_id,
            fixture.hospital_id,
            monday,
            fixture.consult_type_id,
        )
        .await
        .expect_err("a fourth slot should not exist");
    assert_matches!(err, SchedulingError::NotAvailable(msg) if msg.contains("fully booked"));
}

#[tokio::test]
async fn offered_slots_never_overlap_existing_bookings() {
    let fixture = ClinicFixture::new().await;
    let monday = fixture.upcoming(1);
    fixture
        .seed_window(fixture.doctor_id, fixture.hospital_id, 1, t(9, 0), t(12, 0))
        .await;

    let slots = SlotService::new(fixture.state.clone());
    let booking = BookingService::new(fixture.state.clone());

    // Book the 09:20 increment directly, leaving 09:00 free.
    booking
        .book(
            TestUser::patient().id,
            BookAppointmentRequest {
                doctor_id: fixture.doctor_id,
                hospital_id: fixture.hospital_id,
                appointment_type_id: fixture.consult_type_id,
                date: monday,
                time: t(9, 20),
                patient_id: None,
            },
        )
        .await
        .expect("booking 09:20 should succeed");

    let offer = slots
        .next_available_slot(
            fixture.doctor_id,
            fixture.hospital_id,
            monday,
            fixture.consult_type_id,
        )
        .await
        .expect("09:00 should still be free");
    assert_eq!(offer.time, t(9, 0));
    assert_eq!(offer.queue_position, 1);

    booking
        .book(
            TestUser::patient().id,
            BookAppointmentRequest {
                doctor_id: fixture.doctor_id,
                hospital_id: fixture.hospital_id,
                appointment_type_id: fixture.consult_type_id,
                date: monday,
                time: offer.time,
                patient_id: None,
            },
        )
        .await
        .expect("booking 09:00 should succeed");

    // Next offer must skip both booked increments.
    let offer = slots
        .next_available_slot(
            fixture.doctor_id,
            fixture.hospital_id,
            monday,
            fixture.consult_type_id,
        )
        .await
        .expect("09:40 should be free");
    assert_eq!(offer.time, t(9, 40));
    assert_eq!(offer.queue_position, 3);
}

#[tokio::test]
async fn reports_unavailable_days_and_unknown_doctors() {
    let fixture = ClinicFixture::new().await;
    // Window on Monday only.
    fixture
        .seed_window(fixture.doctor_id, fixture.hospital_id, 1, t(9, 0), t(10, 0))
        .await;
    let tuesday = fixture.upcoming(2);

    let slots = SlotService::new(fixture.state.clone());

    let err = slots
        .next_available_slot(
            fixture.doctor_id,
            fixture.hospital_id,
            tuesday,
            fixture.consult_type_id,
        )
        .await
        .expect_err("no window on Tuesday");
    assert_matches!(err, SchedulingError::NotAvailable(_));

    let err = slots
        .next_available_slot(
            Uuid::new_v4(),
            fixture.hospital_id,
            tuesday,
            fixture.consult_type_id,
        )
        .await
        .expect_err("unknown doctor");
    assert_matches!(err, SchedulingError::NotFound(_));
}

#[tokio::test]
async fn a_cancelled_appointment_releases_its_slot() {
    let fixture = ClinicFixture::new().await;
    let monday = fixture.upcoming(1);
    fixture
        .seed_window(fixture.doctor_id, fixture.hospital_id, 1, t(9, 0), t(10, 0))
        .await;

    let slots = SlotService::new(fixture.state.clone());
    let booking = BookingService::new(fixture.state.clone());

    let appointment = booking
        .book(
            TestUser::patient().id,
            BookAppointmentRequest {
                doctor_id: fixture.doctor_id,
                hospital_id: fixture.hospital_id,
                appointment_type_id: fixture.consult_type_id,
                date: monday,
                time: t(9, 0),
                patient_id: None,
            },
        )
        .await
        .expect("booking should succeed");

    let offer = slots
        .next_available_slot(
            fixture.doctor_id,
            fixture.hospital_id,
            monday,
            fixture.consult_type_id,
        )
        .await
        .expect("next slot after 09:00");
    assert_eq!(offer.time, t(9, 20));

    booking
        .update_status(
            appointment.id,
            shared_models::domain::AppointmentStatus::Cancelled,
        )
        .await
        .expect("cancellation should succeed");

    let offer = slots
        .next_available_slot(
            fixture.doctor_id,
            fixture.hospital_id,
            monday,
            fixture.consult_type_id,
        )
        .await
        .expect("cancelled slot is free again");
    assert_eq!(offer.time, t(9, 0));
    assert_eq!(offer.queue_position, 1);
}
