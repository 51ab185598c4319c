pub mod geofence;
pub mod queue;
