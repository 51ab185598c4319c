use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::Local;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_store::AppState;
use shared_utils::jwt::validate_token;

use crate::error::SchedulingError;
use crate::models::{
    AvailabilityQuery, BookAppointmentRequest, CandidateDaysQuery, CreateWindowRequest,
    SetReminderRequest, UpdateAppointmentStatusRequest, WindowsQuery,
};
use crate::services::{
    booking::BookingService, reminder::ReminderService, slots::SlotService, windows::WindowService,
};

// ==============================================================================
// PUBLIC HANDLERS (NO AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn get_doctor_availability(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<WindowsQuery>,
) -> Result<Json<Value>, AppError> {
    let window_service = WindowService::new(state);

    let windows = window_service
        .list_windows(doctor_id, query.hospital_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "availability": windows,
        "total": windows.len()
    })))
}

#[axum::debug_handler]
pub async fn get_candidate_days(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<CandidateDaysQuery>,
) -> Result<Json<Value>, AppError> {
    let horizon = query
        .horizon_days
        .unwrap_or(state.config.planning_horizon_days);
    let window_service = WindowService::new(state);

    // The caller's local calendar date, not UTC; a UTC date here can be
    // yesterday or tomorrow depending on the timezone.
    let from = Local::now().date_naive();

    let days = window_service
        .candidate_days(doctor_id, query.hospital_id, from, horizon)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "candidate_days": days,
        "total": days.len()
    })))
}

#[axum::debug_handler]
pub async fn get_next_available_slot(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let slot_service = SlotService::new(state);

    match slot_service
        .next_available_slot(doctor_id, query.hospital_id, query.date, query.appointment_type_id)
        .await
    {
        Ok(offer) => Ok(Json(json!({
            "doctor_id": doctor_id,
            "date": query.date,
            "next_available_time": offer.time,
            "queue_position": offer.queue_position
        }))),
        // The availability query reports "no slot" as a renderable message,
        // not an error; only the booking commit treats it as a failure.
        Err(SchedulingError::NotAvailable(message)) => Ok(Json(json!({ "message": message }))),
        Err(e) => Err(AppError::from(e)),
    }
}

// ==============================================================================
// PROTECTED HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_window(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<CreateWindowRequest>,
) -> Result<Json<Value>, AppError> {
    let user = validate_token(auth.token(), &state.config.jwt_secret).map_err(AppError::Auth)?;
    if !user.is_staff() {
        return Err(AppError::PermissionDenied(
            "Only staff may manage availability windows".to_string(),
        ));
    }

    let window_service = WindowService::new(state);

    let window = window_service
        .create_window(doctor_id, request)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(window)))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let caller_id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::BadRequest("Invalid patient ID".to_string()))?;

    // Staff book on behalf of a named patient; patients book for themselves.
    let patient_id = if user.is_staff() {
        request.patient_id.ok_or_else(|| {
            AppError::BadRequest("patient_id is required for staff bookings".to_string())
        })?
    } else {
        if let Some(requested) = request.patient_id {
            if requested != caller_id {
                return Err(AppError::PermissionDenied(
                    "Patients may only book appointments for themselves".to_string(),
                ));
            }
        }
        caller_id
    };

    let booking_service = BookingService::new(state);

    let appointment = booking_service
        .book(patient_id, request)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateAppointmentStatusRequest>,
) -> Result<Json<Value>, AppError> {
    if !user.is_staff() {
        return Err(AppError::PermissionDenied(
            "Only staff may update appointment status".to_string(),
        ));
    }

    let booking_service = BookingService::new(state);

    let appointment = booking_service
        .update_status(appointment_id, request.status)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn set_reminder(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<SetReminderRequest>,
) -> Result<Json<Value>, AppError> {
    let patient_id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::BadRequest("Invalid patient ID".to_string()))?;

    let reminder_service = ReminderService::new(state);

    let appointment = reminder_service
        .set_reminder(patient_id, appointment_id, request.reminder_option)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(appointment)))
}
