use thiserror::Error;

use shared_models::domain::QueueItemStatus;
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("No patients are waiting")]
    QueueEmpty,

    #[error("Already queued: {0}")]
    AlreadyQueued(String),

    #[error("Doctor unavailable: {0}")]
    DoctorUnavailable(String),

    #[error("Ambiguous specialty: {0}")]
    AmbiguousSpecialty(String),

    #[error("Outside the service area ({distance_km:.1} km away)")]
    OutsideServiceArea { distance_km: f64 },

    #[error("Invalid queue transition from {from} to {to}")]
    InvalidTransition {
        from: QueueItemStatus,
        to: QueueItemStatus,
    },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl From<QueueError> for AppError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Validation(msg) => AppError::ValidationError(msg),
            QueueError::NotFound(msg) => AppError::NotFound(msg),
            QueueError::PermissionDenied(msg) => AppError::PermissionDenied(msg),
            QueueError::QueueEmpty => AppError::QueueEmpty,
            QueueError::AlreadyQueued(msg) => AppError::Conflict {
                message: msg,
                details: None,
            },
            QueueError::DoctorUnavailable(msg) => AppError::NotAvailable(msg),
            QueueError::AmbiguousSpecialty(msg) => AppError::Conflict {
                message: msg,
                details: None,
            },
            QueueError::OutsideServiceArea { distance_km } => AppError::PermissionDenied(format!(
                "Check-in requires being at the hospital; you are {:.1} km away",
                distance_km
            )),
            QueueError::InvalidTransition { from, to } => AppError::ValidationError(format!(
                "Invalid queue transition from {} to {}",
                from, to
            )),
            QueueError::InvariantViolation(msg) => AppError::InvariantViolation(msg),
        }
    }
}
