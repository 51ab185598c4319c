use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_store::AppState;

use crate::models::{
    CallNextRequest, CheckInRequest, JoinQueueRequest, QueueItemActionRequest,
    SpecialtyWalkInRequest, WalkInRequest,
};
use crate::services::queue::QueueService;

fn require_staff(user: &User) -> Result<(), AppError> {
    if !user.is_staff() {
        return Err(AppError::PermissionDenied(
            "Only staff may perform this queue operation".to_string(),
        ));
    }
    Ok(())
}

fn patient_uuid(user: &User) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id).map_err(|_| AppError::BadRequest("Invalid patient ID".to_string()))
}

// ==============================================================================
// PATIENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_my_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let patient_id = patient_uuid(&user)?;
    let queue_service = QueueService::new(state);

    let item = queue_service.active_item(patient_id).await.map_err(AppError::from)?;
    let position = queue_service
        .position(patient_id, item.doctor_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "doctor_id": item.doctor_id,
        "queue_number": item.queue_number,
        "position": position
    })))
}

#[axum::debug_handler]
pub async fn join_queue(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<JoinQueueRequest>,
) -> Result<Json<Value>, AppError> {
    let patient_id = patient_uuid(&user)?;
    let queue_service = QueueService::new(state);

    let item = queue_service
        .join(patient_id, request.doctor_id, request.hospital_id)
        .await
        .map_err(AppError::from)?;
    let position = queue_service
        .position(patient_id, request.doctor_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "item": item,
        "position": position
    })))
}

#[axum::debug_handler]
pub async fn leave_queue(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let patient_id = patient_uuid(&user)?;
    let queue_service = QueueService::new(state);

    let item = queue_service.leave(patient_id).await.map_err(AppError::from)?;

    Ok(Json(json!(item)))
}

// ==============================================================================
// STAFF HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_doctor_queue(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_staff(&user)?;
    let queue_service = QueueService::new(state);

    let queue = queue_service.queue_state(doctor_id).await.map_err(AppError::from)?;

    Ok(Json(json!(queue)))
}

#[axum::debug_handler]
pub async fn call_next(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<CallNextRequest>,
) -> Result<Json<Value>, AppError> {
    require_staff(&user)?;
    let queue_service = QueueService::new(state);

    let item = queue_service
        .call_next(request.doctor_id)
        .await
        .map_err(AppError::from)?;
    let queue = queue_service
        .queue_state(request.doctor_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "now_serving": item,
        "queue": queue
    })))
}

#[axum::debug_handler]
pub async fn hold_item(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<QueueItemActionRequest>,
) -> Result<Json<Value>, AppError> {
    require_staff(&user)?;
    let queue_service = QueueService::new(state);

    let item = queue_service
        .hold(request.queue_item_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(item)))
}

#[axum::debug_handler]
pub async fn requeue_item(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<QueueItemActionRequest>,
) -> Result<Json<Value>, AppError> {
    require_staff(&user)?;
    let queue_service = QueueService::new(state);

    let item = queue_service
        .requeue(request.queue_item_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(item)))
}

#[axum::debug_handler]
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<QueueItemActionRequest>,
) -> Result<Json<Value>, AppError> {
    require_staff(&user)?;
    let queue_service = QueueService::new(state);

    let item = queue_service
        .remove(request.queue_item_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(item)))
}

#[axum::debug_handler]
pub async fn add_walk_in(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<WalkInRequest>,
) -> Result<Json<Value>, AppError> {
    require_staff(&user)?;
    let queue_service = QueueService::new(state);

    let item = queue_service
        .add_walk_in(request.doctor_id, request.hospital_id, request.name)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(item)))
}

#[axum::debug_handler]
pub async fn add_walk_in_by_specialty(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<SpecialtyWalkInRequest>,
) -> Result<Json<Value>, AppError> {
    require_staff(&user)?;
    let queue_service = QueueService::new(state);

    let item = queue_service
        .add_walk_in_by_specialty(request.specialty_id, request.name)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(item)))
}

#[axum::debug_handler]
pub async fn check_in(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<CheckInRequest>,
) -> Result<Json<Value>, AppError> {
    require_staff(&user)?;
    let queue_service = QueueService::new(state);

    let coords = match (request.latitude, request.longitude) {
        (Some(lat), Some(lng)) => Some((lat, lng)),
        (None, None) => None,
        _ => {
            return Err(AppError::BadRequest(
                "latitude and longitude must be provided together".to_string(),
            ))
        }
    };

    let item = queue_service
        .check_in(appointment_id, coords)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(item)))
}
