//! Read-only entities derived from a device snapshot

use serde_json::Value;

use crate::models::DeviceSnapshot;

pub struct SensorDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub device_class: Option<&'static str>,
    pub unit: Option<&'static str>,
    pub value_fn: fn(&DeviceSnapshot) -> Value,
}

fn opt(value: &Option<String>) -> Value {
    value.clone().map(Value::String).unwrap_or(Value::Null)
}

pub const SENSOR_DESCRIPTIONS: &[SensorDescription] = &[
    SensorDescription {
        key: "power_state",
        name: "Power State",
        icon: "mdi:power",
        device_class: None,
        unit: None,
        value_fn: |d| Value::String(d.power_state.clone()),
    },
    SensorDescription {
        key: "battery_status",
        name: "Battery Status",
        icon: "mdi:battery",
        device_class: None,
        unit: None,
        value_fn: |d| Value::String(d.battery_status.clone()),
    },
    SensorDescription {
        key: "wifi_signal",
        name: "Wi-Fi Signal",
        icon: "mdi:wifi",
        device_class: Some("signal_strength"),
        unit: Some("dBm"),
        value_fn: |d| d.wifi_rssi().map(Value::from).unwrap_or(Value::Null),
    },
    SensorDescription {
        key: "firmware_version",
        name: "Firmware Version",
        icon: "mdi:chip",
        device_class: None,
        unit: None,
        value_fn: |d| Value::String(d.firmware_version.clone()),
    },
    SensorDescription {
        key: "last_render",
        name: "Last Render",
        icon: "mdi:clock-outline",
        device_class: None,
        unit: None,
        value_fn: |d| opt(&d.last_render),
    },
    SensorDescription {
        key: "next_render_battery",
        name: "Next Render (Battery)",
        icon: "mdi:clock-fast",
        device_class: None,
        unit: None,
        value_fn: |d| opt(&d.next_render_battery),
    },
    SensorDescription {
        key: "next_render_power",
        name: "Next Render (Power)",
        icon: "mdi:clock-fast",
        device_class: None,
        unit: None,
        value_fn: |d| opt(&d.next_render_power),
    },
];

/// Connectivity binary sensor
pub const ONLINE_KEY: &str = "online";
pub const ONLINE_NAME: &str = "Online";
pub const ONLINE_DEVICE_CLASS: &str = "connectivity";

pub fn online_value(snapshot: Option<&DeviceSnapshot>) -> Value {
    snapshot.map(|s| Value::Bool(s.online)).unwrap_or(Value::Null)
}
