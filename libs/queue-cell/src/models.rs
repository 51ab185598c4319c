use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::domain::QueueItem;

/// Live view of a doctor's queue, recomputed from rows on every query and
/// never cached across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueState {
    pub now_serving: Option<QueueItem>,
    pub waiting: Vec<QueueItem>,
    pub held: Vec<QueueItem>,
}

/// A patient's place in the line. `Held` and `Serving` are distinguished
/// markers rather than numbers; only `Waiting` carries a 1-based position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueuePositionView {
    Waiting {
        position: usize,
        estimated_wait_minutes: i64,
    },
    Serving,
    Held,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinQueueRequest {
    pub doctor_id: Uuid,
    pub hospital_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkInRequest {
    pub doctor_id: Uuid,
    pub hospital_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialtyWalkInRequest {
    pub specialty_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallNextRequest {
    pub doctor_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItemActionRequest {
    pub queue_item_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeofenceCheck {
    pub within_range: bool,
    pub distance_km: f64,
}
