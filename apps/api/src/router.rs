use std::sync::Arc;

use axum::{routing::get, Router};

use queue_cell::router::queue_routes;
use scheduling_cell::router::{appointment_routes, doctor_routes};
use shared_store::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic Flow API is running!" }))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/queue", queue_routes(state))
}
