//! Setup flow handler

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;

use crate::dot::DotClient;
use crate::error::AppError;
use crate::setup;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ValidateKeyRequest {
    pub api_key: String,
}

/// POST /api/setup/validate - Check an API key against the cloud
pub async fn validate_key(
    State(state): State<AppState>,
    Json(req): Json<ValidateKeyRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.api_key.trim().is_empty() {
        return Err(AppError::BadRequest("api_key is required".to_string()));
    }

    let client = DotClient::with_api_key(&state.dot_config, &req.api_key)?;
    let entry = setup::validate_new(&client, &req.api_key, &state.dot_config.api_key).await?;

    tracing::info!("[Setup] Key validated: {}", entry.title);
    Ok(Json(serde_json::json!({ "ok": true, "entry": entry })))
}
