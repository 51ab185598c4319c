use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_store::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Routes mounted under `/queue`. Everything is role-gated, so the whole
/// router sits behind the auth middleware.
pub fn queue_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(handlers::get_my_status))
        .route("/doctor/{doctor_id}", get(handlers::get_doctor_queue))
        .route("/join", post(handlers::join_queue))
        .route("/leave", post(handlers::leave_queue))
        .route("/call-next", post(handlers::call_next))
        .route("/hold", post(handlers::hold_item))
        .route("/requeue", post(handlers::requeue_item))
        .route("/remove", post(handlers::remove_item))
        .route("/walk-in", post(handlers::add_walk_in))
        .route("/walk-in/specialty", post(handlers::add_walk_in_by_specialty))
        .route("/check-in/{appointment_id}", post(handlers::check_in))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
