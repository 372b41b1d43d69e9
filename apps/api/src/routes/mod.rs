pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Screening API
        .route("/api/v1/skills", get(handlers::handle_list_skills))
        .route(
            "/api/v1/screenings",
            post(handlers::handle_screening).layer(upload_limit),
        )
        .with_state(state)
}
