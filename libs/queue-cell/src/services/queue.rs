use std::sync::Arc;

use chrono::{Local, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_models::domain::{
    weekday_index, AppointmentStatus, QueueItem, QueueItemStatus, Requester,
};
use shared_store::{AppState, ClinicTables};

use crate::error::QueueError;
use crate::models::{QueuePositionView, QueueState};
use crate::services::geofence::GeofenceService;

pub struct QueueService {
    state: Arc<AppState>,
}

impl QueueService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Derived queue view for a doctor's current service day. Always
    /// recomputed from rows; staleness is bounded by the caller's poll
    /// interval, not by any cache.
    pub async fn queue_state(&self, doctor_id: Uuid) -> Result<QueueState, QueueError> {
        let tables = self.state.store.read().await;

        if tables.doctor(doctor_id).is_none() {
            return Err(QueueError::NotFound("Doctor not found".to_string()));
        }

        let today = Local::now().date_naive();
        let items = tables.queue_items_for_day(doctor_id, today);

        let now_serving = items
            .iter()
            .find(|q| q.status == QueueItemStatus::Serving)
            .map(|q| (*q).clone());
        let waiting = items
            .iter()
            .filter(|q| q.status == QueueItemStatus::Waiting)
            .map(|q| (*q).clone())
            .collect();
        let held = items
            .iter()
            .filter(|q| q.status == QueueItemStatus::Held)
            .map(|q| (*q).clone())
            .collect();

        Ok(QueueState {
            now_serving,
            waiting,
            held,
        })
    }

    /// Patient self check-in to a doctor's live queue. One active membership
    /// per patient system-wide; the doctor must have a window covering the
    /// current local time at the hospital.
    pub async fn join(
        &self,
        patient_id: Uuid,
        doctor_id: Uuid,
        hospital_id: Uuid,
    ) -> Result<QueueItem, QueueError> {
        let now = Local::now();
        let mut tables = self.state.store.write().await;

        if tables.doctor(doctor_id).is_none() {
            return Err(QueueError::NotFound("Doctor not found".to_string()));
        }
        if tables.hospital(hospital_id).is_none() {
            return Err(QueueError::NotFound("Hospital not found".to_string()));
        }

        if let Some(existing) = tables.active_queue_item_for_patient(patient_id) {
            return Err(QueueError::AlreadyQueued(format!(
                "You are already in a queue (number {})",
                existing.queue_number
            )));
        }

        let today = now.date_naive();
        if tables
            .window_covering(
                doctor_id,
                Some(hospital_id),
                weekday_index(today),
                now.time(),
            )
            .is_none()
        {
            return Err(QueueError::DoctorUnavailable(
                "The doctor is not consulting at this hospital right now".to_string(),
            ));
        }

        let item = Self::admit(
            &mut tables,
            doctor_id,
            hospital_id,
            Requester::Registered { patient_id },
            None,
        );
        Ok(item)
    }

    /// Staff conversion of a same-day upcoming appointment into a waiting
    /// queue item. The geofence gate applies only when the hospital has
    /// coordinates configured; verification is opt-in per location.
    pub async fn check_in(
        &self,
        appointment_id: Uuid,
        user_coords: Option<(f64, f64)>,
    ) -> Result<QueueItem, QueueError> {
        let today = Local::now().date_naive();
        let mut tables = self.state.store.write().await;

        let appointment = tables
            .appointment(appointment_id)
            .ok_or_else(|| QueueError::NotFound("Appointment not found".to_string()))?;

        if appointment.date != today {
            return Err(QueueError::Validation(
                "Only same-day appointments can be checked in".to_string(),
            ));
        }
        if appointment.status != AppointmentStatus::Upcoming {
            return Err(QueueError::Validation(format!(
                "Cannot check in a {} appointment",
                appointment.status
            )));
        }

        let doctor_id = appointment.doctor_id;
        let hospital_id = appointment.hospital_id;
        let patient_id = appointment.patient_id;

        if tables
            .active_queue_item_for_appointment(appointment_id)
            .is_some()
        {
            return Err(QueueError::AlreadyQueued(
                "This appointment is already checked in".to_string(),
            ));
        }
        if let Some(existing) = tables.active_queue_item_for_patient(patient_id) {
            return Err(QueueError::AlreadyQueued(format!(
                "The patient is already in a queue (number {})",
                existing.queue_number
            )));
        }

        let hospital = tables
            .hospital(hospital_id)
            .ok_or_else(|| QueueError::NotFound("Hospital not found".to_string()))?;
        if let (Some(target_lat), Some(target_lng)) = (hospital.latitude, hospital.longitude) {
            let (user_lat, user_lng) = user_coords.ok_or_else(|| {
                QueueError::Validation(
                    "This hospital requires location verification for check-in".to_string(),
                )
            })?;
            let gate = GeofenceService::new(self.state.config.service_area_radius_km)
                .is_within_service_area(user_lat, user_lng, target_lat, target_lng);
            if !gate.within_range {
                return Err(QueueError::OutsideServiceArea {
                    distance_km: gate.distance_km,
                });
            }
        }

        let item = Self::admit(
            &mut tables,
            doctor_id,
            hospital_id,
            Requester::Registered { patient_id },
            Some(appointment_id),
        );
        Ok(item)
    }

    /// Staff walk-in admission without a registered patient identity.
    pub async fn add_walk_in(
        &self,
        doctor_id: Uuid,
        hospital_id: Uuid,
        name: String,
    ) -> Result<QueueItem, QueueError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(QueueError::Validation(
                "Walk-in name must not be empty".to_string(),
            ));
        }

        let mut tables = self.state.store.write().await;

        if tables.doctor(doctor_id).is_none() {
            return Err(QueueError::NotFound("Doctor not found".to_string()));
        }
        if tables.hospital(hospital_id).is_none() {
            return Err(QueueError::NotFound("Hospital not found".to_string()));
        }

        let item = Self::admit(
            &mut tables,
            doctor_id,
            hospital_id,
            Requester::WalkIn { name },
            None,
        );
        Ok(item)
    }

    /// Specialty walk-in: admit only when the specialty resolves to exactly
    /// one doctor currently consulting. Ambiguity is reported to the caller,
    /// never guessed away.
    pub async fn add_walk_in_by_specialty(
        &self,
        specialty_id: Uuid,
        name: String,
    ) -> Result<QueueItem, QueueError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(QueueError::Validation(
                "Walk-in name must not be empty".to_string(),
            ));
        }

        let now = Local::now();
        let mut tables = self.state.store.write().await;

        let specialty = tables
            .specialty(specialty_id)
            .ok_or_else(|| QueueError::NotFound("Specialty not found".to_string()))?;
        let specialty_name = specialty.name.clone();

        let day_of_week = weekday_index(now.date_naive());
        let candidates: Vec<(Uuid, Uuid)> = tables
            .doctors_by_specialty(specialty_id)
            .iter()
            .filter_map(|doctor| {
                tables
                    .window_covering(doctor.id, None, day_of_week, now.time())
                    .map(|w| (doctor.id, w.hospital_id))
            })
            .collect();

        let (doctor_id, hospital_id) = match candidates.as_slice() {
            [] => {
                return Err(QueueError::DoctorUnavailable(format!(
                    "No {} doctor is consulting right now",
                    specialty_name
                )))
            }
            [single] => *single,
            many => {
                return Err(QueueError::AmbiguousSpecialty(format!(
                    "{} {} doctors are consulting right now; pick one explicitly",
                    many.len(),
                    specialty_name
                )))
            }
        };

        let item = Self::admit(
            &mut tables,
            doctor_id,
            hospital_id,
            Requester::WalkIn { name },
            None,
        );
        Ok(item)
    }

    /// Complete the patient being seen (if any) and promote the head of the
    /// waiting line. Fails with QueueEmpty before touching the current
    /// patient when nobody is waiting.
    pub async fn call_next(&self, doctor_id: Uuid) -> Result<QueueItem, QueueError> {
        let today = Local::now().date_naive();
        let mut tables = self.state.store.write().await;

        if tables.doctor(doctor_id).is_none() {
            return Err(QueueError::NotFound("Doctor not found".to_string()));
        }

        let serving = tables.serving_items(doctor_id);
        if serving.len() > 1 {
            return Err(QueueError::InvariantViolation(format!(
                "Doctor {} has {} items marked serving",
                doctor_id,
                serving.len()
            )));
        }
        let serving_id = serving.first().map(|q| q.id);

        let head_id = tables
            .queue_items_for_day(doctor_id, today)
            .iter()
            .find(|q| q.status == QueueItemStatus::Waiting)
            .map(|q| q.id)
            .ok_or(QueueError::QueueEmpty)?;

        // The "finish" action: the current consultation completes before the
        // next patient is promoted.
        if let Some(serving_id) = serving_id {
            let source_appointment_id = {
                let item = tables
                    .queue_item_mut(serving_id)
                    .ok_or_else(|| QueueError::NotFound("Queue item not found".to_string()))?;
                Self::transition(item, QueueItemStatus::Done)?;
                item.source_appointment_id
            };
            if let Some(appointment_id) = source_appointment_id {
                if let Some(appointment) = tables.appointment_mut(appointment_id) {
                    if appointment.status == AppointmentStatus::Upcoming {
                        appointment.status = AppointmentStatus::Completed;
                        appointment.updated_at = Utc::now();
                    }
                }
            }
        }

        let promoted = {
            let item = tables
                .queue_item_mut(head_id)
                .ok_or_else(|| QueueError::NotFound("Queue item not found".to_string()))?;
            Self::transition(item, QueueItemStatus::Serving)?;
            item.clone()
        };

        if tables.serving_items(doctor_id).len() > 1 {
            return Err(QueueError::InvariantViolation(format!(
                "Doctor {} ended call-next with multiple serving items",
                doctor_id
            )));
        }

        Ok(promoted)
    }

    /// Park the patient being seen without completing the visit.
    pub async fn hold(&self, queue_item_id: Uuid) -> Result<QueueItem, QueueError> {
        let mut tables = self.state.store.write().await;

        let item = tables
            .queue_item_mut(queue_item_id)
            .ok_or_else(|| QueueError::NotFound("Queue item not found".to_string()))?;

        Self::transition(item, QueueItemStatus::Held)?;
        Ok(item.clone())
    }

    /// Return a held patient to the waiting line, at the tail. The ordering
    /// key is stamped with the requeue instant so nobody already waiting is
    /// overtaken; the original queue number is kept.
    pub async fn requeue(&self, queue_item_id: Uuid) -> Result<QueueItem, QueueError> {
        let mut tables = self.state.store.write().await;

        let item = tables
            .queue_item_mut(queue_item_id)
            .ok_or_else(|| QueueError::NotFound("Queue item not found".to_string()))?;

        Self::transition(item, QueueItemStatus::Waiting)?;
        item.queued_at = Utc::now();
        Ok(item.clone())
    }

    /// Staff hard removal from Waiting or Held. Irreversible.
    pub async fn remove(&self, queue_item_id: Uuid) -> Result<QueueItem, QueueError> {
        let mut tables = self.state.store.write().await;

        let item = tables
            .queue_item_mut(queue_item_id)
            .ok_or_else(|| QueueError::NotFound("Queue item not found".to_string()))?;

        Self::transition(item, QueueItemStatus::RemovedByAdmin)?;
        warn!("Queue item {} removed by staff", queue_item_id);
        Ok(item.clone())
    }

    /// Patient self-service exit, allowed from Waiting only. A repeat call
    /// finds no active membership and fails; it never re-transitions.
    pub async fn leave(&self, patient_id: Uuid) -> Result<QueueItem, QueueError> {
        let mut tables = self.state.store.write().await;

        let item_id = tables
            .active_queue_item_for_patient(patient_id)
            .map(|q| q.id)
            .ok_or_else(|| QueueError::NotFound("You are not in a queue".to_string()))?;

        let item = tables
            .queue_item_mut(item_id)
            .ok_or_else(|| QueueError::NotFound("Queue item not found".to_string()))?;

        Self::transition(item, QueueItemStatus::Left)?;
        Ok(item.clone())
    }

    /// 1-based rank of the patient's item among the doctor's current waiting
    /// line, or the distinguished Held/Serving markers.
    pub async fn position(
        &self,
        patient_id: Uuid,
        doctor_id: Uuid,
    ) -> Result<QueuePositionView, QueueError> {
        let tables = self.state.store.read().await;

        let item = tables
            .active_queue_item_for_patient(patient_id)
            .filter(|q| q.doctor_id == doctor_id)
            .ok_or_else(|| QueueError::NotFound("You are not in this queue".to_string()))?;

        match item.status {
            QueueItemStatus::Serving => Ok(QueuePositionView::Serving),
            QueueItemStatus::Held => Ok(QueuePositionView::Held),
            QueueItemStatus::Waiting => {
                let position = tables
                    .queue_items_for_day(doctor_id, item.service_day)
                    .iter()
                    .filter(|q| q.status == QueueItemStatus::Waiting)
                    .position(|q| q.id == item.id)
                    .map(|idx| idx + 1)
                    .ok_or_else(|| {
                        QueueError::InvariantViolation(
                            "Waiting item missing from its own queue".to_string(),
                        )
                    })?;

                let avg_service_minutes = tables
                    .doctor(doctor_id)
                    .and_then(|d| d.avg_service_minutes)
                    .unwrap_or(self.state.config.avg_service_minutes);

                Ok(QueuePositionView::Waiting {
                    position,
                    estimated_wait_minutes: Self::estimated_wait_minutes(
                        position,
                        avg_service_minutes,
                    ),
                })
            }
            status => Err(QueueError::InvalidTransition {
                from: status,
                to: QueueItemStatus::Waiting,
            }),
        }
    }

    /// The patient's active queue item, wherever it is.
    pub async fn active_item(&self, patient_id: Uuid) -> Result<QueueItem, QueueError> {
        let tables = self.state.store.read().await;
        tables
            .active_queue_item_for_patient(patient_id)
            .cloned()
            .ok_or_else(|| QueueError::NotFound("You are not in a queue".to_string()))
    }

    /// Linear projection, explicitly an estimate and not a promise.
    pub fn estimated_wait_minutes(position: usize, avg_service_minutes: i32) -> i64 {
        position as i64 * avg_service_minutes as i64
    }

    fn admit(
        tables: &mut ClinicTables,
        doctor_id: Uuid,
        hospital_id: Uuid,
        requester: Requester,
        source_appointment_id: Option<Uuid>,
    ) -> QueueItem {
        let now = Utc::now();
        let service_day = Local::now().date_naive();
        let queue_number = tables.next_queue_number(doctor_id, service_day);

        let item = QueueItem {
            id: Uuid::new_v4(),
            doctor_id,
            hospital_id,
            requester,
            queue_number,
            status: QueueItemStatus::Waiting,
            check_in_time: now,
            queued_at: now,
            service_day,
            source_appointment_id,
        };

        tables.insert_queue_item(item.clone());
        debug!(
            "Queue item {} admitted for doctor {} with number {}",
            item.id, doctor_id, queue_number
        );
        item
    }

    fn transition(item: &mut QueueItem, to: QueueItemStatus) -> Result<(), QueueError> {
        if !item.status.can_transition_to(&to) {
            return Err(QueueError::InvalidTransition {
                from: item.status,
                to,
            });
        }
        debug!("Queue item {} moved from {} to {}", item.id, item.status, to);
        item.status = to;
        Ok(())
    }
}
