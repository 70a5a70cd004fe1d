//! Credential setup flow
//!
//! Validates an API key by listing the account's devices, the same check the
//! service runs at startup before polling begins.

use serde::Serialize;
use thiserror::Error;

use crate::dot::{DeviceApi, DotError};
use crate::models::DeviceInfo;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("Invalid API key")]
    InvalidAuth,

    #[error("Failed to connect to the Dot. cloud")]
    CannotConnect,

    #[error("No devices found on this account")]
    NoDevices,

    #[error("This API key is already configured")]
    AlreadyConfigured,

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl SetupError {
    /// Stable error code for callers that localize the message
    pub fn code(&self) -> &'static str {
        match self {
            SetupError::InvalidAuth => "invalid_auth",
            SetupError::CannotConnect => "cannot_connect",
            SetupError::NoDevices => "no_devices",
            SetupError::AlreadyConfigured => "already_configured",
            SetupError::Unknown(_) => "unknown",
        }
    }
}

impl From<DotError> for SetupError {
    fn from(err: DotError) -> Self {
        match err {
            DotError::Auth(_) => SetupError::InvalidAuth,
            DotError::Connection(_) => SetupError::CannotConnect,
            other => {
                tracing::error!("[Setup] Unexpected error during setup: {}", other);
                SetupError::Unknown(other.to_string())
            }
        }
    }
}

/// Accepted credential
#[derive(Debug, Clone, Serialize)]
pub struct SetupEntry {
    pub title: String,
    pub unique_id: String,
    #[serde(skip)]
    pub devices: Vec<DeviceInfo>,
    pub device_count: usize,
}

/// Identity of a key: its first 16 characters
pub fn unique_id(api_key: &str) -> String {
    api_key.chars().take(16).collect()
}

pub fn entry_title(count: usize) -> String {
    format!("Dot. ({} device{})", count, if count > 1 { "s" } else { "" })
}

pub async fn validate(api: &dyn DeviceApi, api_key: &str) -> Result<SetupEntry, SetupError> {
    let devices = api.get_devices().await?;
    if devices.is_empty() {
        return Err(SetupError::NoDevices);
    }

    Ok(SetupEntry {
        title: entry_title(devices.len()),
        unique_id: unique_id(api_key),
        device_count: devices.len(),
        devices,
    })
}

/// Validate a key offered while another one is already running
pub async fn validate_new(
    api: &dyn DeviceApi,
    api_key: &str,
    configured_key: &str,
) -> Result<SetupEntry, SetupError> {
    if unique_id(api_key) == unique_id(configured_key) {
        return Err(SetupError::AlreadyConfigured);
    }
    validate(api, api_key).await
}
