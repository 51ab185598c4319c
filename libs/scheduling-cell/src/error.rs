use thiserror::Error;

use shared_models::error::AppError;
use shared_store::StoreError;

use crate::models::ConflictDetails;

#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Not available: {0}")]
    NotAvailable(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Booking conflict with an existing appointment")]
    Conflict(ConflictDetails),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::Validation(msg) => AppError::ValidationError(msg),
            SchedulingError::NotFound(msg) => AppError::NotFound(msg),
            SchedulingError::NotAvailable(msg) => AppError::NotAvailable(msg),
            SchedulingError::PermissionDenied(msg) => AppError::PermissionDenied(msg),
            SchedulingError::Conflict(details) => {
                let message = if details.is_duplicate {
                    "This appointment is already booked".to_string()
                } else {
                    format!(
                        "This time overlaps your {} appointment with {} at {} on {}",
                        details.appointment_type, details.doctor_name, details.time, details.date
                    )
                };
                AppError::Conflict {
                    message,
                    details: serde_json::to_value(&details).ok(),
                }
            }
            SchedulingError::Store(StoreError::InvalidWindow(msg)) => {
                AppError::ValidationError(msg)
            }
            SchedulingError::Store(StoreError::WindowConflict(msg)) => AppError::Conflict {
                message: format!("Availability window conflicts with existing schedule: {}", msg),
                details: None,
            },
        }
    }
}
