//! HTTP handlers module

mod devices;
mod services;
mod setup;

pub use self::devices::*;
pub use self::services::*;
pub use self::setup::*;

use axum::{response::IntoResponse, Json};
use serde::Serialize;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Health check handler
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "dot-quote-bridge".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Generic success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

impl SuccessResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
