use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::debug;
use uuid::Uuid;

use shared_models::domain::{Appointment, AppointmentStatus};
use shared_store::AppState;

use crate::error::SchedulingError;
use crate::models::ReminderOption;

/// Trigger instant for a reminder: the appointment time minus the offset.
/// Rejects offsets that have already elapsed relative to `now`.
pub fn compute_trigger_time(
    appointment_at: NaiveDateTime,
    option: ReminderOption,
    now: NaiveDateTime,
) -> Result<NaiveDateTime, SchedulingError> {
    let trigger = appointment_at - option.offset();
    if trigger <= now {
        return Err(SchedulingError::Validation(
            "The reminder time has already passed".to_string(),
        ));
    }
    Ok(trigger)
}

pub struct ReminderService {
    state: Arc<AppState>,
}

impl ReminderService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Store a reminder trigger on the patient's own upcoming appointment.
    pub async fn set_reminder(
        &self,
        patient_id: Uuid,
        appointment_id: Uuid,
        option: ReminderOption,
    ) -> Result<Appointment, SchedulingError> {
        let now = Local::now().naive_local();
        let mut tables = self.state.store.write().await;

        let appointment = tables
            .appointment_mut(appointment_id)
            .ok_or_else(|| SchedulingError::NotFound("Appointment not found".to_string()))?;

        if appointment.patient_id != patient_id {
            return Err(SchedulingError::PermissionDenied(
                "Only the appointment's patient may set a reminder".to_string(),
            ));
        }
        if appointment.status != AppointmentStatus::Upcoming {
            return Err(SchedulingError::Validation(format!(
                "Cannot set a reminder on a {} appointment",
                appointment.status
            )));
        }

        let appointment_at = appointment.date.and_time(appointment.time);
        let trigger = compute_trigger_time(appointment_at, option, now)?;

        appointment.reminder_at = Some(trigger);
        appointment.updated_at = chrono::Utc::now();
        let updated = appointment.clone();

        debug!(
            "Reminder for appointment {} scheduled at {}",
            appointment_id, trigger
        );
        Ok(updated)
    }
}
