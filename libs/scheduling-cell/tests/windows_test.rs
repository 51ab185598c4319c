use assert_matches::assert_matches;
use chrono::{Datelike, Duration, Weekday};

use scheduling_cell::{CreateWindowRequest, SchedulingError, WindowService};
use shared_store::StoreError;
use shared_utils::test_support::{t, ClinicFixture};

#[tokio::test]
async fn enumerates_consultation_days_over_the_horizon() {
    let fixture = ClinicFixture::new().await;
    fixture
        .seed_window(fixture.doctor_id, fixture.hospital_id, 1, t(9, 0), t(12, 0))
        .await;
    fixture
        .seed_window(fixture.doctor_id, fixture.hospital_id, 3, t(14, 0), t(17, 0))
        .await;

    let windows = WindowService::new(fixture.state.clone());
    let from = fixture.today();

    let days = windows
        .candidate_days(fixture.doctor_id, fixture.hospital_id, from, 14)
        .await
        .expect("candidate days should resolve");

    let expected = (0..14)
        .map(|offset| from + Duration::days(offset))
        .filter(|d| matches!(d.weekday(), Weekday::Mon | Weekday::Wed))
        .count();
    assert_eq!(days.len(), expected);

    for day in &days {
        match day.date.weekday() {
            Weekday::Mon => {
                assert_eq!(day.day_name, "Monday");
                assert_eq!(day.start_time, t(9, 0));
                assert_eq!(day.end_time, t(12, 0));
            }
            Weekday::Wed => {
                assert_eq!(day.day_name, "Wednesday");
                assert_eq!(day.start_time, t(14, 0));
                assert_eq!(day.end_time, t(17, 0));
            }
            other => panic!("unexpected weekday in candidate days: {}", other),
        }
        assert!(day.date >= from && day.date < from + Duration::days(14));
    }

    // The sequence is ordered and restartable: a second call yields the same days.
    let again = windows
        .candidate_days(fixture.doctor_id, fixture.hospital_id, from, 14)
        .await
        .expect("second enumeration");
    assert_eq!(
        days.iter().map(|d| d.date).collect::<Vec<_>>(),
        again.iter().map(|d| d.date).collect::<Vec<_>>()
    );
    assert!(days.windows(2).all(|pair| pair[0].date < pair[1].date));
}

#[tokio::test]
async fn rejects_bad_horizons_and_missing_availability() {
    let fixture = ClinicFixture::new().await;
    let windows = WindowService::new(fixture.state.clone());
    let from = fixture.today();

    let err = windows
        .candidate_days(fixture.doctor_id, fixture.hospital_id, from, 0)
        .await
        .expect_err("zero horizon");
    assert_matches!(err, SchedulingError::Validation(_));

    let err = windows
        .candidate_days(fixture.doctor_id, fixture.hospital_id, from, 14)
        .await
        .expect_err("no windows seeded");
    assert_matches!(err, SchedulingError::NotAvailable(_));
}

#[tokio::test]
async fn a_second_window_on_the_same_weekday_is_rejected() {
    let fixture = ClinicFixture::new().await;
    let windows = WindowService::new(fixture.state.clone());

    windows
        .create_window(
            fixture.doctor_id,
            CreateWindowRequest {
                hospital_id: fixture.hospital_id,
                day_of_week: 1,
                start_time: t(9, 0),
                end_time: t(12, 0),
                is_available: None,
                announcement: None,
            },
        )
        .await
        .expect("first Monday window");

    let err = windows
        .create_window(
            fixture.doctor_id,
            CreateWindowRequest {
                hospital_id: fixture.hospital_id,
                day_of_week: 1,
                start_time: t(13, 0),
                end_time: t(15, 0),
                is_available: None,
                announcement: None,
            },
        )
        .await
        .expect_err("second Monday window at the same hospital");
    assert_matches!(err, SchedulingError::Store(StoreError::WindowConflict(_)));
}

#[tokio::test]
async fn window_time_ranges_are_validated() {
    let fixture = ClinicFixture::new().await;
    let windows = WindowService::new(fixture.state.clone());

    let err = windows
        .create_window(
            fixture.doctor_id,
            CreateWindowRequest {
                hospital_id: fixture.hospital_id,
                day_of_week: 1,
                start_time: t(12, 0),
                end_time: t(9, 0),
                is_available: None,
                announcement: None,
            },
        )
        .await
        .expect_err("inverted range");
    assert_matches!(err, SchedulingError::Store(StoreError::InvalidWindow(_)));

    let err = windows
        .create_window(
            fixture.doctor_id,
            CreateWindowRequest {
                hospital_id: fixture.hospital_id,
                day_of_week: 7,
                start_time: t(9, 0),
                end_time: t(12, 0),
                is_available: None,
                announcement: None,
            },
        )
        .await
        .expect_err("day of week out of range");
    assert_matches!(err, SchedulingError::Store(StoreError::InvalidWindow(_)));
}

#[tokio::test]
async fn listing_windows_is_scoped_by_hospital() {
    let fixture = ClinicFixture::new().await;
    let other_hospital = fixture.seed_hospital("Annex Clinic", None).await;
    fixture
        .seed_window(fixture.doctor_id, fixture.hospital_id, 1, t(9, 0), t(12, 0))
        .await;
    fixture
        .seed_window(fixture.doctor_id, other_hospital, 1, t(14, 0), t(17, 0))
        .await;

    let windows = WindowService::new(fixture.state.clone());

    let scoped = windows
        .list_windows(fixture.doctor_id, Some(fixture.hospital_id))
        .await
        .expect("scoped listing");
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].hospital_id, fixture.hospital_id);

    let all = windows
        .list_windows(fixture.doctor_id, None)
        .await
        .expect("unscoped listing");
    assert_eq!(all.len(), 2);
}
