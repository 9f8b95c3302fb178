pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::dialogue::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Messaging transport
        .route("/api/v1/messages", post(handlers::handle_message))
        .route(
            "/api/v1/messages/document",
            post(handlers::handle_document_upload),
        )
        .route("/api/v1/selections", post(handlers::handle_selection))
        // Inspection
        .route(
            "/api/v1/sessions/:user_id",
            get(handlers::handle_get_session),
        )
        .with_state(state)
}
