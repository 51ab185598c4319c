//! Fixture builders shared by the cell test suites.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::domain::{
    AppointmentType, AvailabilityWindow, Doctor, Hospital, Specialty, weekday_index,
};
use shared_store::AppState;

use crate::jwt::sign_token;

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-validation-must-be-long-enough";

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    }
}

pub struct TestUser {
    pub id: Uuid,
    pub role: String,
}

impl TestUser {
    pub fn patient() -> Self {
        Self {
            id: Uuid::new_v4(),
            role: "patient".to_string(),
        }
    }

    pub fn staff() -> Self {
        Self {
            id: Uuid::new_v4(),
            role: "staff".to_string(),
        }
    }

    pub fn token(&self) -> String {
        sign_token(
            &self.id.to_string(),
            Some("test@example.com"),
            &self.role,
            TEST_JWT_SECRET,
            3600,
        )
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.to_string(),
            email: Some("test@example.com".to_string()),
            role: Some(self.role.clone()),
            created_at: Some(Utc::now()),
        }
    }
}

pub fn t(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

/// The next calendar date (from `from`, exclusive) falling on the given
/// weekday index (0 = Sunday).
pub fn next_weekday(from: NaiveDate, day_of_week: i32) -> NaiveDate {
    let mut date = from + Duration::days(1);
    while weekday_index(date) != day_of_week {
        date += Duration::days(1);
    }
    date
}

/// A seeded clinic: one hospital (no geofence coordinates), one specialty,
/// one doctor, one 20-minute appointment type. Tests add windows and extra
/// doctors as needed.
pub struct ClinicFixture {
    pub state: Arc<AppState>,
    pub hospital_id: Uuid,
    pub specialty_id: Uuid,
    pub doctor_id: Uuid,
    pub consult_type_id: Uuid,
}

impl ClinicFixture {
    pub async fn new() -> Self {
        let state = Arc::new(AppState::new(test_config()));

        let hospital_id = Uuid::new_v4();
        let specialty_id = Uuid::new_v4();
        let doctor_id = Uuid::new_v4();
        let consult_type_id = Uuid::new_v4();

        {
            let mut tables = state.store.write().await;
            tables.insert_hospital(Hospital {
                id: hospital_id,
                name: "Central Clinic".to_string(),
                latitude: None,
                longitude: None,
            });
            tables.insert_specialty(Specialty {
                id: specialty_id,
                name: "General Practice".to_string(),
            });
            tables.insert_doctor(Doctor {
                id: doctor_id,
                first_name: "Grace".to_string(),
                last_name: "Okafor".to_string(),
                specialty_id,
                avg_service_minutes: Some(10),
                created_at: Utc::now(),
            });
            tables.insert_appointment_type(AppointmentType {
                id: consult_type_id,
                hospital_id,
                specialty_id,
                name: "General Consultation".to_string(),
                duration_minutes: 20,
                cost: 50.0,
            });
        }

        Self {
            state,
            hospital_id,
            specialty_id,
            doctor_id,
            consult_type_id,
        }
    }

    pub async fn seed_hospital(&self, name: &str, coords: Option<(f64, f64)>) -> Uuid {
        let id = Uuid::new_v4();
        let mut tables = self.state.store.write().await;
        tables.insert_hospital(Hospital {
            id,
            name: name.to_string(),
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
        });
        id
    }

    pub async fn seed_doctor(&self, first_name: &str, specialty_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        let mut tables = self.state.store.write().await;
        tables.insert_doctor(Doctor {
            id,
            first_name: first_name.to_string(),
            last_name: "Ngata".to_string(),
            specialty_id,
            avg_service_minutes: None,
            created_at: Utc::now(),
        });
        id
    }

    pub async fn seed_window(
        &self,
        doctor_id: Uuid,
        hospital_id: Uuid,
        day_of_week: i32,
        start: NaiveTime,
        end: NaiveTime,
    ) {
        let mut tables = self.state.store.write().await;
        tables
            .insert_window(AvailabilityWindow {
                id: Uuid::new_v4(),
                doctor_id,
                hospital_id,
                day_of_week,
                is_available: true,
                start_time: start,
                end_time: end,
                announcement: None,
            })
            .expect("fixture window should not conflict");
    }

    /// Windows on every weekday spanning the whole day, so queue operations
    /// that require a window covering "now" always find one.
    pub async fn seed_full_week(&self, doctor_id: Uuid, hospital_id: Uuid) {
        for day_of_week in 0..7 {
            self.seed_window(
                doctor_id,
                hospital_id,
                day_of_week,
                NaiveTime::from_hms_opt(0, 0, 0).expect("valid time"),
                NaiveTime::from_hms_opt(23, 59, 59).expect("valid time"),
            )
            .await;
        }
    }

    pub async fn seed_appointment_type(&self, duration_minutes: i32) -> Uuid {
        let id = Uuid::new_v4();
        let mut tables = self.state.store.write().await;
        tables.insert_appointment_type(AppointmentType {
            id,
            hospital_id: self.hospital_id,
            specialty_id: self.specialty_id,
            name: format!("{}-minute visit", duration_minutes),
            duration_minutes,
            cost: 50.0,
        });
        id
    }

    /// The next date (strictly after today) on which the given weekday falls.
    pub fn upcoming(&self, day_of_week: i32) -> NaiveDate {
        next_weekday(chrono::Local::now().date_naive(), day_of_week)
    }

    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    pub fn today_weekday(&self) -> i32 {
        weekday_index(self.today())
    }
}
