use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn availability_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route(
            "/doctors/{doctor_id}/check",
            get(handlers::check_doctor_availability),
        )
        .route(
            "/doctors/{doctor_id}/slots",
            get(handlers::get_available_slots),
        )
        .route("/doctors/slots", post(handlers::get_multi_doctor_slots))
        .with_state(state)
}
