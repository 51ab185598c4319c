use assert_matches::assert_matches;
use chrono::NaiveDateTime;

use scheduling_cell::{
    compute_trigger_time, BookAppointmentRequest, BookingService, ReminderOption, ReminderService,
    SchedulingError,
};
use shared_utils::test_support::{t, ClinicFixture, TestUser};

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").expect("valid datetime literal")
}

#[test]
fn subtracts_the_selected_offset() {
    let appointment = at("2025-03-10T14:00");

    let trigger = compute_trigger_time(appointment, ReminderOption::OneHourBefore, at("2025-03-10T08:00"))
        .expect("one hour before");
    assert_eq!(trigger, at("2025-03-10T13:00"));

    let trigger = compute_trigger_time(appointment, ReminderOption::OneDayBefore, at("2025-03-08T08:00"))
        .expect("one day before");
    assert_eq!(trigger, at("2025-03-09T14:00"));

    let trigger = compute_trigger_time(appointment, ReminderOption::TwoDaysBefore, at("2025-03-07T08:00"))
        .expect("two days before");
    assert_eq!(trigger, at("2025-03-08T14:00"));
}

#[test]
fn rejects_triggers_that_already_elapsed() {
    let appointment = at("2025-03-10T14:00");

    let err = compute_trigger_time(appointment, ReminderOption::OneHourBefore, at("2025-03-10T13:30"))
        .expect_err("13:00 has passed at 13:30");
    assert_matches!(err, SchedulingError::Validation(_));

    // Exactly at the trigger instant is too late as well.
    let err = compute_trigger_time(appointment, ReminderOption::OneHourBefore, at("2025-03-10T13:00"))
        .expect_err("no zero-lead reminders");
    assert_matches!(err, SchedulingError::Validation(_));
}

#[tokio::test]
async fn stores_the_reminder_on_the_patients_own_appointment() {
    let fixture = ClinicFixture::new().await;
    let monday = fixture.upcoming(1);
    fixture
        .seed_window(fixture.doctor_id, fixture.hospital_id, 1, t(9, 0), t(10, 0))
        .await;

    let booking = BookingService::new(fixture.state.clone());
    let reminders = ReminderService::new(fixture.state.clone());
    let patient = TestUser::patient();

    let appointment = booking
        .book(
            patient.id,
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
    assert!(appointment.reminder_at.is_none());

    let updated = reminders
        .set_reminder(patient.id, appointment.id, ReminderOption::OneHourBefore)
        .await
        .expect("reminder should be accepted");

    let expected = monday.and_time(t(8, 0));
    assert_eq!(updated.reminder_at, Some(expected));
}

#[tokio::test]
async fn only_the_owning_patient_may_set_a_reminder() {
    let fixture = ClinicFixture::new().await;
    let monday = fixture.upcoming(1);
    fixture
        .seed_window(fixture.doctor_id, fixture.hospital_id, 1, t(9, 0), t(10, 0))
        .await;

    let booking = BookingService::new(fixture.state.clone());
    let reminders = ReminderService::new(fixture.state.clone());
    let owner = TestUser::patient();

    let appointment = booking
        .book(
            owner.id,
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

    let err = reminders
        .set_reminder(
            TestUser::patient().id,
            appointment.id,
            ReminderOption::OneHourBefore,
        )
        .await
        .expect_err("a stranger cannot set the reminder");
    assert_matches!(err, SchedulingError::PermissionDenied(_));
}
