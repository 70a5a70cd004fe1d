//! Device and entity handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::dot::DEFAULT_TASK_TYPE;
use crate::entities;
use crate::error::AppError;
use crate::models::DeviceSnapshot;
use crate::services::{self, PressOutcome};
use crate::state::AppState;

use super::SuccessResponse;

#[derive(Serialize)]
pub struct DeviceView {
    #[serde(flatten)]
    pub snapshot: DeviceSnapshot,
    pub display_name: String,
    pub wifi_rssi: Option<i64>,
}

impl From<DeviceSnapshot> for DeviceView {
    fn from(snapshot: DeviceSnapshot) -> Self {
        Self {
            display_name: snapshot.display_name(),
            wifi_rssi: snapshot.wifi_rssi(),
            snapshot,
        }
    }
}

#[derive(Serialize)]
pub struct DeviceListResponse {
    pub last_update_success: bool,
    pub last_error: Option<String>,
    pub last_updated: Option<chrono::DateTime<chrono::Utc>>,
    pub devices: Vec<DeviceView>,
}

#[derive(Deserialize, Default)]
pub struct TaskQuery {
    pub task_type: Option<String>,
}

#[derive(Deserialize)]
pub struct SetTextRequest {
    pub value: String,
}

#[derive(Deserialize)]
pub struct SelectOptionRequest {
    pub option: String,
}

async fn require_device(state: &AppState, device_id: &str) -> Result<(), AppError> {
    if state.syncer.owns_device(device_id).await {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Device {} not found", device_id)))
    }
}

/// GET /api/devices - All snapshots with coordinator status
pub async fn list_devices(State(state): State<AppState>) -> impl IntoResponse {
    let coordinator = state.syncer.state().await;
    Json(DeviceListResponse {
        last_update_success: coordinator.last_update_success,
        last_error: coordinator.last_error,
        last_updated: coordinator.last_updated,
        devices: coordinator.snapshots.into_values().map(DeviceView::from).collect(),
    })
}

/// GET /api/devices/:id - One snapshot
pub async fn get_device(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = state
        .syncer
        .snapshot(&device_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Device {} not found", device_id)))?;

    Ok(Json(DeviceView::from(snapshot)))
}

/// GET /api/devices/:id/entities - Entity states for one device
pub async fn get_entities(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_device(&state, &device_id).await?;

    let coordinator = state.syncer.state().await;
    let out = entities::device_entities(&coordinator, &state.controls, &device_id).await;
    Ok(Json(out))
}

/// GET /api/devices/:id/tasks - Task list from the cloud
pub async fn list_tasks(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Query(query): Query<TaskQuery>,
) -> Result<impl IntoResponse, AppError> {
    require_device(&state, &device_id).await?;

    let task_type = query.task_type.as_deref().unwrap_or(DEFAULT_TASK_TYPE);
    let tasks = state
        .syncer
        .api()
        .list_device_tasks(&device_id, task_type)
        .await?;
    Ok(Json(tasks))
}

/// POST /api/devices/:id/buttons/:key/press
pub async fn press_button(
    State(state): State<AppState>,
    Path((device_id, key)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    require_device(&state, &device_id).await?;

    match services::press_button(&state.syncer, &state.controls, &device_id, &key).await? {
        PressOutcome::Sent(result) => Ok(Json(serde_json::json!({
            "ok": true,
            "sent": true,
            "result": result,
        }))),
        PressOutcome::Skipped(reason) => Ok(Json(serde_json::json!({
            "ok": true,
            "sent": false,
            "reason": reason,
        }))),
    }
}

/// PUT /api/devices/:id/text/:key
pub async fn set_text(
    State(state): State<AppState>,
    Path((device_id, key)): Path<(String, String)>,
    Json(req): Json<SetTextRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_device(&state, &device_id).await?;

    state.controls.set_text(&device_id, &key, &req.value).await?;
    tracing::debug!("Text {} set for {}", key, device_id);
    Ok(Json(SuccessResponse::new("Value updated")))
}

/// PUT /api/devices/:id/select/:key
pub async fn select_option(
    State(state): State<AppState>,
    Path((device_id, key)): Path<(String, String)>,
    Json(req): Json<SelectOptionRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_device(&state, &device_id).await?;

    state
        .controls
        .select_option(&device_id, &key, &req.option)
        .await?;
    Ok(Json(SuccessResponse::new("Option selected")))
}

/// POST /api/refresh - Request an immediate poll
pub async fn request_refresh(State(state): State<AppState>) -> impl IntoResponse {
    state.syncer.request_refresh();
    (
        StatusCode::ACCEPTED,
        Json(SuccessResponse::new("Refresh requested")),
    )
}
