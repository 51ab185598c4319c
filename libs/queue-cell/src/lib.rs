pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::QueueError;
pub use models::*;
pub use services::geofence::{haversine_distance_km, GeofenceService};
pub use services::queue::QueueService;
