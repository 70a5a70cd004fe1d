//! Actions that push content to a device, and the button behaviours built on them

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::dot::{DotError, DotSyncer};
use crate::entities::control::{
    self, ControlValues, IMAGE_DATA, NEXT_CONTENT, SEND_IMAGE, SEND_TEXT, TEXT_MESSAGE,
    TEXT_SIGNATURE, TEXT_TITLE,
};
use crate::models::{DitherKernel, DitherType, ImageContent, TextContent};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("No configured integration owns device {0}")]
    UnknownDevice(String),

    #[error("Device {0} is unavailable")]
    Unavailable(String),

    #[error("Unknown button: {0}")]
    UnknownButton(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Image file not found: {0}")]
    ImageNotFound(String),

    #[error(transparent)]
    Dot(#[from] DotError),
}

fn default_true() -> bool {
    true
}

/// `send_text` action call
#[derive(Debug, Clone, Deserialize)]
pub struct SendTextCall {
    pub device_id: String,
    pub title: Option<String>,
    pub message: Option<String>,
    pub signature: Option<String>,
    pub icon: Option<String>,
    pub link: Option<String>,
    #[serde(default = "default_true")]
    pub refresh_now: bool,
    pub task_key: Option<String>,
}

/// `send_image` action call
#[derive(Debug, Clone, Deserialize)]
pub struct SendImageCall {
    pub device_id: String,
    /// Base64 data, or a path starting with `/` or `./`
    pub image: String,
    pub link: Option<String>,
    #[serde(default)]
    pub border: u8,
    pub dither_type: Option<DitherType>,
    pub dither_kernel: Option<DitherKernel>,
    #[serde(default = "default_true")]
    pub refresh_now: bool,
    pub task_key: Option<String>,
}

/// Outcome of a button press
#[derive(Debug, Clone, PartialEq)]
pub enum PressOutcome {
    Sent(Value),
    Skipped(&'static str),
}

/// Return base64 image data, reading and encoding the file when given a path
pub async fn resolve_image(image_value: &str) -> Result<String, ServiceError> {
    if !(image_value.starts_with('/') || image_value.starts_with("./")) {
        return Ok(image_value.to_string());
    }

    let path = image_value.to_string();
    let bytes = tokio::task::spawn_blocking(move || {
        let p = Path::new(&path);
        if !p.is_file() {
            return Ok(None);
        }
        std::fs::read(p).map(Some)
    })
    .await
    .map_err(|e| ServiceError::InvalidInput(format!("image read task failed: {}", e)))?
    .map_err(|e| ServiceError::InvalidInput(format!("Failed to read {}: {}", image_value, e)))?
    .ok_or_else(|| ServiceError::ImageNotFound(image_value.to_string()))?;

    Ok(STANDARD.encode(bytes))
}

async fn ensure_owned(syncer: &DotSyncer, device_id: &str) -> Result<(), ServiceError> {
    if syncer.owns_device(device_id).await {
        Ok(())
    } else {
        Err(ServiceError::UnknownDevice(device_id.to_string()))
    }
}

pub async fn send_text(syncer: &DotSyncer, call: SendTextCall) -> Result<Value, ServiceError> {
    ensure_owned(syncer, &call.device_id).await?;

    let content = TextContent {
        refresh_now: Some(call.refresh_now),
        title: call.title,
        message: call.message,
        signature: call.signature,
        icon: call.icon,
        link: call.link,
        task_key: call.task_key,
    };

    let result = syncer.api().send_text(&call.device_id, &content).await?;
    tracing::info!("[Services] Text sent to {}", call.device_id);
    Ok(result)
}

pub async fn send_image(syncer: &DotSyncer, call: SendImageCall) -> Result<Value, ServiceError> {
    if call.border > 1 {
        return Err(ServiceError::InvalidInput(format!(
            "border must be 0 or 1, got {}",
            call.border
        )));
    }
    ensure_owned(syncer, &call.device_id).await?;

    let image = resolve_image(&call.image).await?;
    let content = ImageContent {
        refresh_now: Some(call.refresh_now),
        image,
        link: call.link,
        border: Some(call.border),
        dither_type: call.dither_type,
        dither_kernel: call.dither_kernel,
        task_key: call.task_key,
    };

    let result = syncer.api().send_image(&call.device_id, &content).await?;
    tracing::info!("[Services] Image sent to {}", call.device_id);
    Ok(result)
}

/// Press one of a device's buttons; a refresh is requested after any send
pub async fn press_button(
    syncer: &DotSyncer,
    controls: &ControlValues,
    device_id: &str,
    key: &str,
) -> Result<PressOutcome, ServiceError> {
    if control::button(key).is_none() {
        return Err(ServiceError::UnknownButton(key.to_string()));
    }

    let available = syncer.last_update_success().await
        && syncer
            .snapshot(device_id)
            .await
            .map(|s| s.online)
            .unwrap_or(false);
    if !available {
        return Err(ServiceError::Unavailable(device_id.to_string()));
    }

    let outcome = match key {
        NEXT_CONTENT => PressOutcome::Sent(syncer.api().switch_next_content(device_id).await?),
        SEND_TEXT => press_send_text(syncer, controls, device_id).await?,
        SEND_IMAGE => press_send_image(syncer, controls, device_id).await?,
        other => return Err(ServiceError::UnknownButton(other.to_string())),
    };

    if matches!(outcome, PressOutcome::Sent(_)) {
        syncer.request_refresh();
    }
    Ok(outcome)
}

async fn press_send_text(
    syncer: &DotSyncer,
    controls: &ControlValues,
    device_id: &str,
) -> Result<PressOutcome, ServiceError> {
    let title = controls.text_opt(device_id, TEXT_TITLE).await;
    let message = controls.text_opt(device_id, TEXT_MESSAGE).await;
    let signature = controls.text_opt(device_id, TEXT_SIGNATURE).await;

    if title.is_none() && message.is_none() {
        tracing::warn!("[Services] Send Text: both title and message are empty, skipping");
        return Ok(PressOutcome::Skipped("title and message are empty"));
    }

    let content = TextContent {
        refresh_now: Some(true),
        title,
        message,
        signature,
        ..Default::default()
    };
    Ok(PressOutcome::Sent(
        syncer.api().send_text(device_id, &content).await?,
    ))
}

async fn press_send_image(
    syncer: &DotSyncer,
    controls: &ControlValues,
    device_id: &str,
) -> Result<PressOutcome, ServiceError> {
    let Some(raw) = controls.text_opt(device_id, IMAGE_DATA).await else {
        tracing::warn!("[Services] Send Image: image data is empty, skipping");
        return Ok(PressOutcome::Skipped("image data is empty"));
    };

    let content = ImageContent {
        refresh_now: Some(true),
        image: resolve_image(&raw).await?,
        dither_type: Some(controls.dither_type(device_id).await),
        ..Default::default()
    };
    Ok(PressOutcome::Sent(
        syncer.api().send_image(device_id, &content).await?,
    ))
}
