use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_store::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Routes mounted under `/doctors`. Reads are public; window management
/// validates its own bearer token (staff only).
pub fn doctor_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/{doctor_id}/availability",
            get(handlers::get_doctor_availability).post(handlers::create_window),
        )
        .route("/{doctor_id}/candidate-days", get(handlers::get_candidate_days))
        .with_state(state)
}

/// Routes mounted under `/appointments`.
pub fn appointment_routes(state: Arc<AppState>) -> Router {
    let public_routes = Router::new().route(
        "/availability/doctor/{doctor_id}",
        get(handlers::get_next_available_slot),
    );

    let protected_routes = Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/{appointment_id}/status", patch(handlers::update_appointment_status))
        .route("/{appointment_id}/set-reminder", post(handlers::set_reminder))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
