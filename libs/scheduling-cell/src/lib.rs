pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::SchedulingError;
pub use models::*;
pub use services::booking::BookingService;
pub use services::reminder::{compute_trigger_time, ReminderService};
pub use services::slots::SlotService;
pub use services::windows::WindowService;
