use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// SLOT SEARCH MODELS
// ==============================================================================

/// A calendar day on which the doctor holds consultations at the hospital.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateDay {
    pub date: NaiveDate,
    pub day_name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// The earliest free slot for a booking request, with the 1-based position
/// the booking would take in that day's running order. The position is an
/// estimate of service order, not a live queue position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotOffer {
    pub time: NaiveTime,
    pub queue_position: i32,
}

/// Structured detail for a same-requester booking collision, rich enough for
/// the caller to render an explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictDetails {
    pub is_duplicate: bool,
    pub doctor_name: String,
    pub appointment_type: String,
    pub time: NaiveTime,
    pub date: NaiveDate,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub hospital_id: Uuid,
    pub appointment_type_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    // Staff may book on behalf of a patient; patients book for themselves.
    pub patient_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWindowRequest {
    pub hospital_id: Uuid,
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: Option<bool>,
    pub announcement: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WindowsQuery {
    pub hospital_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateDaysQuery {
    pub hospital_id: Uuid,
    pub appointment_type_id: Uuid,
    pub horizon_days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    pub appointment_type_id: Uuid,
    pub hospital_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAppointmentStatusRequest {
    pub status: shared_models::domain::AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetReminderRequest {
    pub reminder_option: ReminderOption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderOption {
    #[serde(rename = "1-hour-before")]
    OneHourBefore,
    #[serde(rename = "1-day-before")]
    OneDayBefore,
    #[serde(rename = "2-days-before")]
    TwoDaysBefore,
}

impl ReminderOption {
    pub fn offset(&self) -> Duration {
        match self {
            ReminderOption::OneHourBefore => Duration::hours(1),
            ReminderOption::OneDayBefore => Duration::days(1),
            ReminderOption::TwoDaysBefore => Duration::days(2),
        }
    }
}
