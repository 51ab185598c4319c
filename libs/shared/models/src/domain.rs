use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Weekday index as stored on availability windows: 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> i32 {
    match date.weekday() {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}

pub fn day_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hospital {
    pub id: Uuid,
    pub name: String,
    // Opt-in geofencing; hospitals without coordinates skip the proximity gate.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specialty {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub specialty_id: Uuid,
    pub avg_service_minutes: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub hospital_id: Uuid,
    pub day_of_week: i32, // 0 = Sunday, 1 = Monday, etc.
    pub is_available: bool,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub announcement: Option<String>,
}

impl AvailabilityWindow {
    pub fn covers(&self, time: NaiveTime) -> bool {
        self.is_available && self.start_time <= time && time < self.end_time
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentType {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub specialty_id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Upcoming,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Cancelled slots are released; every other status keeps its slot booked.
    pub fn occupies_slot(&self) -> bool {
        *self != AppointmentStatus::Cancelled
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, AppointmentStatus::Upcoming)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Upcoming => write!(f, "upcoming"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub hospital_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_type_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    // Snapshot of the appointment type's duration at booking time, so later
    // edits to the type never alter slot computations for existing rows.
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    pub reminder_at: Option<chrono::NaiveDateTime>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn end_time(&self) -> NaiveTime {
        self.time + Duration::minutes(self.duration_minutes as i64)
    }

    pub fn overlaps(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.time < end && start < self.end_time()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requester {
    Registered { patient_id: Uuid },
    WalkIn { name: String },
}

impl Requester {
    pub fn patient_id(&self) -> Option<Uuid> {
        match self {
            Requester::Registered { patient_id } => Some(*patient_id),
            Requester::WalkIn { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueueItemStatus {
    Waiting,
    Serving,
    Held,
    Done,
    Left,
    RemovedByAdmin,
}

impl QueueItemStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            QueueItemStatus::Done | QueueItemStatus::Left | QueueItemStatus::RemovedByAdmin
        )
    }

    /// Waiting, Serving and Held all count as active queue membership.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    pub fn can_transition_to(&self, target: &QueueItemStatus) -> bool {
        use QueueItemStatus::*;
        match (self, target) {
            (Waiting, Serving) => true,
            (Waiting, Left) => true,
            (Waiting, RemovedByAdmin) => true,
            (Serving, Done) => true,
            (Serving, Held) => true,
            (Held, Waiting) => true,
            (Held, RemovedByAdmin) => true,
            _ => false,
        }
    }
}

impl fmt::Display for QueueItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueItemStatus::Waiting => write!(f, "waiting"),
            QueueItemStatus::Serving => write!(f, "serving"),
            QueueItemStatus::Held => write!(f, "held"),
            QueueItemStatus::Done => write!(f, "done"),
            QueueItemStatus::Left => write!(f, "left"),
            QueueItemStatus::RemovedByAdmin => write!(f, "removed_by_admin"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub hospital_id: Uuid,
    pub requester: Requester,
    // Sequential per doctor per service day; never reused, survives requeues.
    pub queue_number: i32,
    pub status: QueueItemStatus,
    pub check_in_time: DateTime<Utc>,
    // Ordering key for the waiting line. Equals check_in_time on admission;
    // a requeue stamps it with the requeue instant so the item re-enters at
    // the tail without losing its check-in audit time.
    pub queued_at: DateTime<Utc>,
    pub service_day: NaiveDate,
    // Weak reference: the appointment may be cancelled after check-in
    // without touching this item.
    pub source_appointment_id: Option<Uuid>,
}
