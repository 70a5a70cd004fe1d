//! API module - HTTP handlers and routes

pub mod handlers;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/api/health", get(handlers::health_check))
        // Devices and entities
        .route("/api/devices", get(handlers::list_devices))
        .route("/api/devices/:id", get(handlers::get_device))
        .route("/api/devices/:id/entities", get(handlers::get_entities))
        .route("/api/devices/:id/tasks", get(handlers::list_tasks))
        .route(
            "/api/devices/:id/buttons/:key/press",
            post(handlers::press_button),
        )
        .route("/api/devices/:id/text/:key", put(handlers::set_text))
        .route("/api/devices/:id/select/:key", put(handlers::select_option))
        .route("/api/refresh", post(handlers::request_refresh))
        // Actions
        .route("/api/services/send_text", post(handlers::send_text))
        .route("/api/services/send_image", post(handlers::send_image))
        // Setup
        .route("/api/setup/validate", post(handlers::validate_key))
}
