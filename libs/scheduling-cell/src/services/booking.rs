use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_models::domain::{weekday_index, Appointment, AppointmentStatus};
use shared_store::AppState;

use crate::error::SchedulingError;
use crate::models::{BookAppointmentRequest, ConflictDetails};

pub struct BookingService {
    state: Arc<AppState>,
}

impl BookingService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Commit a booking. The whole re-check + insert runs under one store
    /// write guard, so two racing requests for the same slot cannot both
    /// pass the checks.
    pub async fn book(
        &self,
        patient_id: Uuid,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        let mut tables = self.state.store.write().await;

        let doctor = tables
            .doctor(request.doctor_id)
            .ok_or_else(|| SchedulingError::NotFound("Doctor not found".to_string()))?;
        let doctor_name = doctor.full_name();

        if tables.hospital(request.hospital_id).is_none() {
            return Err(SchedulingError::NotFound("Hospital not found".to_string()));
        }
        let appointment_type = tables
            .appointment_type(request.appointment_type_id)
            .ok_or_else(|| SchedulingError::NotFound("Appointment type not found".to_string()))?;
        if appointment_type.hospital_id != request.hospital_id {
            return Err(SchedulingError::Validation(
                "Appointment type is not offered at this hospital".to_string(),
            ));
        }
        let type_name = appointment_type.name.clone();
        let duration_minutes = appointment_type.duration_minutes;

        let window = tables
            .window_for(
                request.doctor_id,
                request.hospital_id,
                weekday_index(request.date),
            )
            .ok_or_else(|| {
                SchedulingError::NotAvailable("Doctor is not available on this day".to_string())
            })?;

        let duration = Duration::minutes(duration_minutes as i64);
        let slot_end = request.time + duration;
        if request.time < window.start_time || slot_end > window.end_time || slot_end <= request.time
        {
            return Err(SchedulingError::Validation(
                "Requested time falls outside the doctor's availability window".to_string(),
            ));
        }
        let offset = request.time - window.start_time;
        if offset.num_minutes() % duration_minutes as i64 != 0 {
            return Err(SchedulingError::Validation(
                "Requested time does not align with the booking grid".to_string(),
            ));
        }

        // Same-requester pre-check: identical start is a duplicate booking,
        // a non-identical overlap is a schedule conflict. Both carry enough
        // detail for the caller to explain the collision.
        for existing in tables.patient_appointments_on(patient_id, request.doctor_id, request.date)
        {
            if existing.time == request.time {
                warn!(
                    "Duplicate booking attempt: patient {} already holds {} at {}",
                    patient_id, existing.id, existing.time
                );
                return Err(SchedulingError::Conflict(ConflictDetails {
                    is_duplicate: true,
                    doctor_name: doctor_name.clone(),
                    appointment_type: type_name.clone(),
                    time: existing.time,
                    date: existing.date,
                }));
            }
            if existing.overlaps(request.time, slot_end) {
                let existing_type = tables
                    .appointment_type(existing.appointment_type_id)
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| "consultation".to_string());
                return Err(SchedulingError::Conflict(ConflictDetails {
                    is_duplicate: false,
                    doctor_name: doctor_name.clone(),
                    appointment_type: existing_type,
                    time: existing.time,
                    date: existing.date,
                }));
            }
        }

        // Slot uniqueness across all requesters, the application-level
        // equivalent of a unique (doctor, date, time, status != cancelled)
        // constraint.
        let taken = tables
            .booked_appointments_on(request.doctor_id, request.date)
            .iter()
            .any(|a| a.overlaps(request.time, slot_end));
        if taken {
            return Err(SchedulingError::NotAvailable(
                "The requested slot is no longer available".to_string(),
            ));
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            doctor_id: request.doctor_id,
            hospital_id: request.hospital_id,
            patient_id,
            appointment_type_id: request.appointment_type_id,
            date: request.date,
            time: request.time,
            duration_minutes,
            status: AppointmentStatus::Upcoming,
            reminder_at: None,
            created_at: now,
            updated_at: now,
        };

        tables.insert_appointment(appointment.clone());
        debug!(
            "Appointment {} booked for patient {} with doctor {} on {} at {}",
            appointment.id, patient_id, request.doctor_id, request.date, request.time
        );

        Ok(appointment)
    }

    /// Staff status transition. Appointments are never deleted; the status
    /// column is the audit trail.
    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
    ) -> Result<Appointment, SchedulingError> {
        if new_status == AppointmentStatus::Upcoming {
            return Err(SchedulingError::Validation(
                "An appointment cannot be moved back to upcoming".to_string(),
            ));
        }

        let mut tables = self.state.store.write().await;

        let appointment = tables
            .appointment_mut(appointment_id)
            .ok_or_else(|| SchedulingError::NotFound("Appointment not found".to_string()))?;

        if appointment.status.is_terminal() {
            return Err(SchedulingError::Validation(format!(
                "Appointment is already {}",
                appointment.status
            )));
        }

        appointment.status = new_status;
        appointment.updated_at = Utc::now();
        let updated = appointment.clone();

        debug!(
            "Appointment {} status updated to {}",
            appointment_id, updated.status
        );
        Ok(updated)
    }
}
