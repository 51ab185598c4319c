use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};
use tracing::debug;
use uuid::Uuid;

use shared_models::domain::weekday_index;
use shared_store::AppState;

use crate::error::SchedulingError;
use crate::models::SlotOffer;

pub struct SlotService {
    state: Arc<AppState>,
}

impl SlotService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Earliest free slot for (doctor, hospital, date, appointment type).
    ///
    /// Walks the availability window from its start in duration-sized
    /// increments, skipping any increment that overlaps a booked
    /// `[time, time + duration)` interval, until one fits entirely inside
    /// the window. The returned queue position counts earlier bookings in
    /// the day's running order plus one.
    pub async fn next_available_slot(
        &self,
        doctor_id: Uuid,
        hospital_id: Uuid,
        date: NaiveDate,
        appointment_type_id: Uuid,
    ) -> Result<SlotOffer, SchedulingError> {
        let tables = self.state.store.read().await;

        if tables.doctor(doctor_id).is_none() {
            return Err(SchedulingError::NotFound("Doctor not found".to_string()));
        }
        let appointment_type = tables
            .appointment_type(appointment_type_id)
            .ok_or_else(|| SchedulingError::NotFound("Appointment type not found".to_string()))?;
        if appointment_type.hospital_id != hospital_id {
            return Err(SchedulingError::Validation(
                "Appointment type is not offered at this hospital".to_string(),
            ));
        }

        let window = tables
            .window_for(doctor_id, hospital_id, weekday_index(date))
            .ok_or_else(|| {
                SchedulingError::NotAvailable("Doctor is not available on this day".to_string())
            })?;

        let booked = tables.booked_appointments_on(doctor_id, date);
        let duration = Duration::minutes(appointment_type.duration_minutes as i64);

        let slot = Self::first_free_increment(
            window.start_time,
            window.end_time,
            duration,
            &booked
                .iter()
                .map(|a| (a.time, a.end_time()))
                .collect::<Vec<_>>(),
        )
        .ok_or_else(|| {
            SchedulingError::NotAvailable("Doctor is fully booked on this day".to_string())
        })?;

        let queue_position = booked.iter().filter(|a| a.time <= slot).count() as i32 + 1;

        debug!(
            "Next available slot for doctor {} on {}: {} (position {})",
            doctor_id, date, slot, queue_position
        );

        Ok(SlotOffer {
            time: slot,
            queue_position,
        })
    }

    fn first_free_increment(
        start: NaiveTime,
        end: NaiveTime,
        duration: Duration,
        booked: &[(NaiveTime, NaiveTime)],
    ) -> Option<NaiveTime> {
        let mut slot = start;
        loop {
            let slot_end = slot + duration;
            // NaiveTime arithmetic wraps at midnight; a wrapped end means the
            // increment ran off the day and nothing further can fit.
            if slot_end <= slot || slot_end > end {
                return None;
            }

            let occupied = booked
                .iter()
                .any(|(apt_start, apt_end)| slot < *apt_end && *apt_start < slot_end);
            if !occupied {
                return Some(slot);
            }

            slot = slot + duration;
        }
    }
}
