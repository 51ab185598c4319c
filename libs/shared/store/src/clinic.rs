use std::collections::HashMap;

use chrono::NaiveDate;
use thiserror::Error;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;
use uuid::Uuid;

use shared_models::domain::{
    Appointment, AppointmentType, AvailabilityWindow, Doctor, Hospital, QueueItem,
    QueueItemStatus, Specialty,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid availability window: {0}")]
    InvalidWindow(String),

    #[error("Availability window conflicts with existing schedule: {0}")]
    WindowConflict(String),
}

/// Row tables for the clinic. Reads recompute everything from rows; nothing
/// here is a cache.
#[derive(Debug, Default)]
pub struct ClinicTables {
    hospitals: HashMap<Uuid, Hospital>,
    specialties: HashMap<Uuid, Specialty>,
    doctors: HashMap<Uuid, Doctor>,
    windows: Vec<AvailabilityWindow>,
    appointment_types: HashMap<Uuid, AppointmentType>,
    appointments: HashMap<Uuid, Appointment>,
    queue_items: HashMap<Uuid, QueueItem>,
    queue_counters: HashMap<(Uuid, NaiveDate), i32>,
}

impl ClinicTables {
    // Lookups

    pub fn hospital(&self, id: Uuid) -> Option<&Hospital> {
        self.hospitals.get(&id)
    }

    pub fn specialty(&self, id: Uuid) -> Option<&Specialty> {
        self.specialties.get(&id)
    }

    pub fn doctor(&self, id: Uuid) -> Option<&Doctor> {
        self.doctors.get(&id)
    }

    pub fn doctors_by_specialty(&self, specialty_id: Uuid) -> Vec<&Doctor> {
        let mut doctors: Vec<&Doctor> = self
            .doctors
            .values()
            .filter(|d| d.specialty_id == specialty_id)
            .collect();
        doctors.sort_by_key(|d| d.id);
        doctors
    }

    pub fn appointment_type(&self, id: Uuid) -> Option<&AppointmentType> {
        self.appointment_types.get(&id)
    }

    pub fn appointment(&self, id: Uuid) -> Option<&Appointment> {
        self.appointments.get(&id)
    }

    pub fn queue_item(&self, id: Uuid) -> Option<&QueueItem> {
        self.queue_items.get(&id)
    }

    // Availability windows

    pub fn windows_for_doctor(&self, doctor_id: Uuid) -> Vec<&AvailabilityWindow> {
        let mut windows: Vec<&AvailabilityWindow> = self
            .windows
            .iter()
            .filter(|w| w.doctor_id == doctor_id)
            .collect();
        windows.sort_by_key(|w| (w.hospital_id, w.day_of_week, w.start_time));
        windows
    }

    pub fn windows_for(&self, doctor_id: Uuid, hospital_id: Uuid) -> Vec<&AvailabilityWindow> {
        let mut windows: Vec<&AvailabilityWindow> = self
            .windows
            .iter()
            .filter(|w| w.doctor_id == doctor_id && w.hospital_id == hospital_id)
            .collect();
        windows.sort_by_key(|w| (w.day_of_week, w.start_time));
        windows
    }

    /// The available window for a doctor on a given weekday at a hospital.
    /// At most one exists per (doctor, weekday, hospital) by insert invariant.
    pub fn window_for(
        &self,
        doctor_id: Uuid,
        hospital_id: Uuid,
        day_of_week: i32,
    ) -> Option<&AvailabilityWindow> {
        self.windows.iter().find(|w| {
            w.doctor_id == doctor_id
                && w.hospital_id == hospital_id
                && w.day_of_week == day_of_week
                && w.is_available
        })
    }

    /// Any available window for this doctor covering the given local instant,
    /// at the given hospital (or at any hospital when `hospital_id` is None).
    pub fn window_covering(
        &self,
        doctor_id: Uuid,
        hospital_id: Option<Uuid>,
        day_of_week: i32,
        time: chrono::NaiveTime,
    ) -> Option<&AvailabilityWindow> {
        self.windows.iter().find(|w| {
            w.doctor_id == doctor_id
                && hospital_id.map_or(true, |h| w.hospital_id == h)
                && w.day_of_week == day_of_week
                && w.covers(time)
        })
    }

    // Appointments

    /// Non-cancelled appointments for a doctor on a date, ordered by time.
    pub fn booked_appointments_on(&self, doctor_id: Uuid, date: NaiveDate) -> Vec<&Appointment> {
        let mut appointments: Vec<&Appointment> = self
            .appointments
            .values()
            .filter(|a| a.doctor_id == doctor_id && a.date == date && a.status.occupies_slot())
            .collect();
        appointments.sort_by_key(|a| a.time);
        appointments
    }

    /// A requester's Upcoming appointments with a doctor on a date, for the
    /// duplicate/overlap pre-check at booking commit.
    pub fn patient_appointments_on(
        &self,
        patient_id: Uuid,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Vec<&Appointment> {
        let mut appointments: Vec<&Appointment> = self
            .appointments
            .values()
            .filter(|a| {
                a.patient_id == patient_id
                    && a.doctor_id == doctor_id
                    && a.date == date
                    && a.status == shared_models::domain::AppointmentStatus::Upcoming
            })
            .collect();
        appointments.sort_by_key(|a| a.time);
        appointments
    }

    // Queue items

    pub fn queue_items_for_day(&self, doctor_id: Uuid, day: NaiveDate) -> Vec<&QueueItem> {
        let mut items: Vec<&QueueItem> = self
            .queue_items
            .values()
            .filter(|q| q.doctor_id == doctor_id && q.service_day == day)
            .collect();
        items.sort_by_key(|q| (q.queued_at, q.queue_number));
        items
    }

    /// Active (Waiting/Serving/Held) membership for a patient, system-wide:
    /// one patient, one queue.
    pub fn active_queue_item_for_patient(&self, patient_id: Uuid) -> Option<&QueueItem> {
        self.queue_items.values().find(|q| {
            q.status.is_active() && q.requester.patient_id() == Some(patient_id)
        })
    }

    pub fn active_queue_item_for_appointment(&self, appointment_id: Uuid) -> Option<&QueueItem> {
        self.queue_items
            .values()
            .find(|q| q.status.is_active() && q.source_appointment_id == Some(appointment_id))
    }

    pub fn serving_items(&self, doctor_id: Uuid) -> Vec<&QueueItem> {
        self.queue_items
            .values()
            .filter(|q| q.doctor_id == doctor_id && q.status == QueueItemStatus::Serving)
            .collect()
    }

    // Mutations. Reachable only through the write guard, whose lifetime spans
    // an operation's whole check-then-write sequence.

    pub fn insert_hospital(&mut self, hospital: Hospital) {
        self.hospitals.insert(hospital.id, hospital);
    }

    pub fn insert_specialty(&mut self, specialty: Specialty) {
        self.specialties.insert(specialty.id, specialty);
    }

    pub fn insert_doctor(&mut self, doctor: Doctor) {
        self.doctors.insert(doctor.id, doctor);
    }

    pub fn insert_appointment_type(&mut self, appointment_type: AppointmentType) {
        self.appointment_types
            .insert(appointment_type.id, appointment_type);
    }

    /// Insert a weekly window, holding the one-window-per-(doctor, weekday,
    /// hospital) invariant so downstream slot math never sees overlaps.
    pub fn insert_window(&mut self, window: AvailabilityWindow) -> Result<(), StoreError> {
        if window.day_of_week < 0 || window.day_of_week > 6 {
            return Err(StoreError::InvalidWindow(
                "Day of week must be between 0 (Sunday) and 6 (Saturday)".to_string(),
            ));
        }
        if window.is_available && window.start_time >= window.end_time {
            return Err(StoreError::InvalidWindow(
                "Start time must be before end time".to_string(),
            ));
        }

        for existing in &self.windows {
            if existing.doctor_id == window.doctor_id
                && existing.hospital_id == window.hospital_id
                && existing.day_of_week == window.day_of_week
            {
                return Err(StoreError::WindowConflict(format!(
                    "{} - {}",
                    existing.start_time, existing.end_time
                )));
            }
        }

        debug!(
            "Window created for doctor {} on weekday {}",
            window.doctor_id, window.day_of_week
        );
        self.windows.push(window);
        Ok(())
    }

    pub fn insert_appointment(&mut self, appointment: Appointment) {
        self.appointments.insert(appointment.id, appointment);
    }

    pub fn appointment_mut(&mut self, id: Uuid) -> Option<&mut Appointment> {
        self.appointments.get_mut(&id)
    }

    /// Next sequential queue number for (doctor, service day). Monotonic,
    /// never reused within the day.
    pub fn next_queue_number(&mut self, doctor_id: Uuid, day: NaiveDate) -> i32 {
        let counter = self.queue_counters.entry((doctor_id, day)).or_insert(0);
        *counter += 1;
        *counter
    }

    pub fn insert_queue_item(&mut self, item: QueueItem) {
        self.queue_items.insert(item.id, item);
    }

    pub fn queue_item_mut(&mut self, id: Uuid) -> Option<&mut QueueItem> {
        self.queue_items.get_mut(&id)
    }
}

/// Shared store handle. All queue- and booking-mutating operations run under
/// the write guard, which is the single-writer partition that serializes
/// check-then-write sequences per the concurrency contract.
#[derive(Debug, Default)]
pub struct ClinicStore {
    inner: RwLock<ClinicTables>,
}

impl ClinicStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, ClinicTables> {
        self.inner.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, ClinicTables> {
        self.inner.write().await
    }
}
