//! Action handlers (send text / send image)

use axum::{extract::State, response::IntoResponse, Json};

use crate::error::AppError;
use crate::services::{self, SendImageCall, SendTextCall};
use crate::state::AppState;

/// POST /api/services/send_text
pub async fn send_text(
    State(state): State<AppState>,
    Json(call): Json<SendTextCall>,
) -> Result<impl IntoResponse, AppError> {
    let result = services::send_text(&state.syncer, call).await?;
    state.syncer.request_refresh();
    Ok(Json(serde_json::json!({ "ok": true, "result": result })))
}

/// POST /api/services/send_image
pub async fn send_image(
    State(state): State<AppState>,
    Json(call): Json<SendImageCall>,
) -> Result<impl IntoResponse, AppError> {
    let result = services::send_image(&state.syncer, call).await?;
    state.syncer.request_refresh();
    Ok(Json(serde_json::json!({ "ok": true, "result": result })))
}
