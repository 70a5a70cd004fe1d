//! Entity layer
//!
//! Maps the coordinator's snapshots into the widget states a home-automation
//! host shows for each device (sensors, connectivity, buttons, text inputs,
//! dither select).

pub mod control;
pub mod sensor;

pub use control::{ControlError, ControlValues};

use serde::Serialize;
use serde_json::Value;

use crate::dot::CoordinatorState;
use crate::models::{fallback_display_name, DitherType};

pub const DOMAIN: &str = "dot_quote0";
pub const MANUFACTURER: &str = "MindReset";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Sensor,
    BinarySensor,
    Button,
    Text,
    Select,
}

/// Device registry entry shared by every entity of one device
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceRegistryInfo {
    pub identifiers: (String, String),
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub sw_version: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityState {
    pub unique_id: String,
    pub key: String,
    pub kind: EntityKind,
    pub name: String,
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,
    pub available: bool,
    pub state: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl EntityState {
    fn new(device_id: &str, key: &str, kind: EntityKind, name: &str, icon: &str) -> Self {
        Self {
            unique_id: format!("{}_{}", device_id, key),
            key: key.to_string(),
            kind,
            name: name.to_string(),
            icon: icon.to_string(),
            device_class: None,
            unit_of_measurement: None,
            available: false,
            state: Value::Null,
            options: None,
            max_length: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceEntities {
    pub device: DeviceRegistryInfo,
    pub entities: Vec<EntityState>,
}

pub fn device_registry_info(state: &CoordinatorState, device_id: &str) -> DeviceRegistryInfo {
    let snapshot = state.snapshots.get(device_id);
    DeviceRegistryInfo {
        identifiers: (DOMAIN.to_string(), device_id.to_string()),
        name: snapshot
            .map(|s| s.display_name())
            .unwrap_or_else(|| fallback_display_name(device_id)),
        manufacturer: MANUFACTURER.to_string(),
        model: snapshot
            .map(|s| s.model_name())
            .unwrap_or_else(|| "Quote/0".to_string()),
        sw_version: snapshot.map(|s| s.firmware_version.clone()),
    }
}

/// Build every entity state for one device
pub async fn device_entities(
    state: &CoordinatorState,
    controls: &ControlValues,
    device_id: &str,
) -> DeviceEntities {
    let snapshot = state.snapshots.get(device_id);
    let coordinator_ok = state.last_update_success;
    let device_available = coordinator_ok && snapshot.map(|s| s.online).unwrap_or(false);

    let mut entities = Vec::new();

    for desc in sensor::SENSOR_DESCRIPTIONS {
        let mut e = EntityState::new(device_id, desc.key, EntityKind::Sensor, desc.name, desc.icon);
        e.device_class = desc.device_class.map(str::to_string);
        e.unit_of_measurement = desc.unit.map(str::to_string);
        e.available = device_available;
        e.state = snapshot.map(desc.value_fn).unwrap_or(Value::Null);
        entities.push(e);
    }

    let mut online = EntityState::new(
        device_id,
        sensor::ONLINE_KEY,
        EntityKind::BinarySensor,
        sensor::ONLINE_NAME,
        "mdi:lan-connect",
    );
    online.device_class = Some(sensor::ONLINE_DEVICE_CLASS.to_string());
    online.available = coordinator_ok;
    online.state = sensor::online_value(snapshot);
    entities.push(online);

    for desc in control::BUTTON_DESCRIPTIONS {
        let mut e = EntityState::new(device_id, desc.key, EntityKind::Button, desc.name, desc.icon);
        e.available = device_available;
        entities.push(e);
    }

    for desc in control::TEXT_DESCRIPTIONS {
        let mut e = EntityState::new(device_id, desc.key, EntityKind::Text, desc.name, desc.icon);
        e.available = coordinator_ok;
        e.max_length = Some(desc.max_length);
        e.state = Value::String(controls.text(device_id, desc.key).await);
        entities.push(e);
    }

    let mut dither = EntityState::new(
        device_id,
        control::DITHER_TYPE,
        EntityKind::Select,
        control::DITHER_TYPE_NAME,
        control::DITHER_TYPE_ICON,
    );
    dither.available = coordinator_ok;
    dither.options = Some(DitherType::ALL.iter().map(|d| d.as_str().to_string()).collect());
    dither.state = Value::String(controls.dither_type(device_id).await.as_str().to_string());
    entities.push(dither);

    DeviceEntities {
        device: device_registry_info(state, device_id),
        entities,
    }
}
