use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::debug;
use uuid::Uuid;

use shared_models::domain::{day_name, weekday_index, AvailabilityWindow};
use shared_store::AppState;

use crate::error::SchedulingError;
use crate::models::{CandidateDay, CreateWindowRequest};

pub struct WindowService {
    state: Arc<AppState>,
}

impl WindowService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Enumerate the calendar days in `[from, from + horizon_days)` on which
    /// the doctor holds consultations at the hospital. `from` must be the
    /// caller's local calendar date; using UTC here shifts the whole horizon
    /// by a day for callers west of Greenwich.
    pub async fn candidate_days(
        &self,
        doctor_id: Uuid,
        hospital_id: Uuid,
        from: NaiveDate,
        horizon_days: i64,
    ) -> Result<Vec<CandidateDay>, SchedulingError> {
        if horizon_days <= 0 {
            return Err(SchedulingError::Validation(
                "Planning horizon must be at least one day".to_string(),
            ));
        }

        let tables = self.state.store.read().await;

        if tables.doctor(doctor_id).is_none() {
            return Err(SchedulingError::NotFound("Doctor not found".to_string()));
        }

        let has_availability = tables
            .windows_for(doctor_id, hospital_id)
            .iter()
            .any(|w| w.is_available);
        if !has_availability {
            return Err(SchedulingError::NotAvailable(
                "Doctor has no availability at this hospital".to_string(),
            ));
        }

        let mut days = Vec::new();
        for offset in 0..horizon_days {
            let date = from + Duration::days(offset);
            if let Some(window) = tables.window_for(doctor_id, hospital_id, weekday_index(date)) {
                days.push(CandidateDay {
                    date,
                    day_name: day_name(date),
                    start_time: window.start_time,
                    end_time: window.end_time,
                });
            }
        }

        debug!(
            "Found {} candidate days for doctor {} over {} days",
            days.len(),
            doctor_id,
            horizon_days
        );
        Ok(days)
    }

    pub async fn list_windows(
        &self,
        doctor_id: Uuid,
        hospital_id: Option<Uuid>,
    ) -> Result<Vec<AvailabilityWindow>, SchedulingError> {
        let tables = self.state.store.read().await;

        if tables.doctor(doctor_id).is_none() {
            return Err(SchedulingError::NotFound("Doctor not found".to_string()));
        }

        let windows = match hospital_id {
            Some(hospital_id) => tables
                .windows_for(doctor_id, hospital_id)
                .into_iter()
                .cloned()
                .collect(),
            None => tables
                .windows_for_doctor(doctor_id)
                .into_iter()
                .cloned()
                .collect(),
        };

        Ok(windows)
    }

    /// Create a weekly availability window. Overlap and range invariants are
    /// enforced by the store insert, keeping dirty weekday data
    /// unrepresentable.
    pub async fn create_window(
        &self,
        doctor_id: Uuid,
        request: CreateWindowRequest,
    ) -> Result<AvailabilityWindow, SchedulingError> {
        let mut tables = self.state.store.write().await;

        if tables.doctor(doctor_id).is_none() {
            return Err(SchedulingError::NotFound("Doctor not found".to_string()));
        }
        if tables.hospital(request.hospital_id).is_none() {
            return Err(SchedulingError::NotFound("Hospital not found".to_string()));
        }

        let window = AvailabilityWindow {
            id: Uuid::new_v4(),
            doctor_id,
            hospital_id: request.hospital_id,
            day_of_week: request.day_of_week,
            is_available: request.is_available.unwrap_or(true),
            start_time: request.start_time,
            end_time: request.end_time,
            announcement: request.announcement,
        };

        tables.insert_window(window.clone())?;
        debug!("Availability window created with ID: {}", window.id);

        Ok(window)
    }
}
