//! Data models for dot-quote-bridge

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Device list / status (Dot. open API)
// ============================================================================

/// Entry of `GET /api/authV2/open/devices`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: String,
    #[serde(default = "default_series")]
    pub series: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_edition")]
    pub edition: i64,
}

fn default_series() -> String {
    "quote".to_string()
}

fn default_model() -> String {
    "quote_0".to_string()
}

fn default_edition() -> i64 {
    1
}

/// Body of `GET /api/authV2/open/device/{id}/status`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    pub alias: Option<String>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: PowerStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub render_info: RenderInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PowerStatus {
    pub version: Option<String>,
    pub current: Option<String>,
    pub description: Option<String>,
    pub battery: Option<String>,
    pub wifi: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderInfo {
    pub last: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current: CurrentRender,
    #[serde(default, deserialize_with = "null_as_default")]
    pub next: NextRender,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentRender {
    pub rotated: Option<bool>,
    pub border: Option<i64>,
    pub image: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NextRender {
    pub battery: Option<String>,
    pub power: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Device snapshot
// ============================================================================

/// Per-device record produced by one poll cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSnapshot {
    pub device_id: String,
    pub series: String,
    pub model: String,
    pub edition: i64,
    pub alias: Option<String>,
    pub location: Option<String>,

    pub firmware_version: String,
    pub power_state: String,
    pub power_description: String,
    pub battery_status: String,
    pub wifi_signal: String,

    pub last_render: Option<String>,
    pub screen_rotated: bool,
    pub screen_border: i64,
    pub current_images: Vec<String>,
    pub next_render_battery: Option<String>,
    pub next_render_power: Option<String>,

    pub online: bool,
    pub polled_at: DateTime<Utc>,
}

const UNKNOWN: &str = "unknown";

impl DeviceSnapshot {
    /// Build an online snapshot from a successful status fetch
    pub fn from_status(info: &DeviceInfo, status: DeviceStatus) -> Self {
        let st = status.status;
        let ri = status.render_info;

        Self {
            device_id: info.id.clone(),
            series: info.series.clone(),
            model: info.model.clone(),
            edition: info.edition,
            alias: status.alias,
            location: status.location,
            firmware_version: st.version.unwrap_or_else(|| UNKNOWN.to_string()),
            power_state: st.current.unwrap_or_else(|| UNKNOWN.to_string()),
            power_description: st.description.unwrap_or_default(),
            battery_status: st.battery.unwrap_or_else(|| UNKNOWN.to_string()),
            wifi_signal: st.wifi.unwrap_or_else(|| UNKNOWN.to_string()),
            last_render: ri.last,
            screen_rotated: ri.current.rotated.unwrap_or(false),
            screen_border: ri.current.border.unwrap_or(0),
            current_images: ri.current.image.unwrap_or_default(),
            next_render_battery: ri.next.battery,
            next_render_power: ri.next.power,
            online: true,
            polled_at: Utc::now(),
        }
    }

    /// Placeholder for a device whose status could not be fetched this cycle
    pub fn offline(info: &DeviceInfo) -> Self {
        Self {
            online: false,
            ..Self::from_status(info, DeviceStatus::default())
        }
    }

    pub fn display_name(&self) -> String {
        match self.alias.as_deref() {
            Some(alias) if !alias.is_empty() => alias.to_string(),
            _ => fallback_display_name(&self.device_id),
        }
    }

    pub fn model_name(&self) -> String {
        format!("Quote/0 (Edition {})", self.edition)
    }

    /// Wi-Fi signal such as `"-62 dBm"` as an integer
    pub fn wifi_rssi(&self) -> Option<i64> {
        self.wifi_signal.replace(" dBm", "").trim().parse().ok()
    }
}

/// `Quote/0 XXXX` using the last four characters of the device id
pub fn fallback_display_name(device_id: &str) -> String {
    let chars: Vec<char> = device_id.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("Quote/0 {}", tail)
}

// ============================================================================
// Content payloads
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DitherType {
    Diffusion,
    Ordered,
    None,
}

impl DitherType {
    pub const ALL: [DitherType; 3] = [DitherType::Diffusion, DitherType::Ordered, DitherType::None];

    pub fn as_str(&self) -> &'static str {
        match self {
            DitherType::Diffusion => "DIFFUSION",
            DitherType::Ordered => "ORDERED",
            DitherType::None => "NONE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DitherKernel {
    FloydSteinberg,
    Atkinson,
    Burkes,
    Sierra2,
    Stucki,
    JarvisJudiceNinke,
    DiffusionRow,
    DiffusionColumn,
    #[serde(rename = "DIFFUSION_2D")]
    Diffusion2d,
    Threshold,
}

/// Body of `POST /api/authV2/open/device/{id}/text`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_now: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_key: Option<String>,
}

/// Body of `POST /api/authV2/open/device/{id}/image`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_now: Option<bool>,
    /// Base64 encoded image
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dither_type: Option<DitherType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dither_kernel: Option<DitherKernel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info() -> DeviceInfo {
        serde_json::from_value(json!({ "id": "ABCD1234EF56", "edition": 2 })).unwrap()
    }

    #[test]
    fn test_device_info_defaults() {
        let info = info();
        assert_eq!(info.series, "quote");
        assert_eq!(info.model, "quote_0");
        assert_eq!(info.edition, 2);
    }

    #[test]
    fn test_snapshot_from_full_status() {
        let status: DeviceStatus = serde_json::from_value(json!({
            "deviceId": "ABCD1234EF56",
            "alias": "Kitchen",
            "location": "Home",
            "status": {
                "version": "1.4.2",
                "current": "battery",
                "description": "Running on battery",
                "battery": "85%",
                "wifi": "-62 dBm"
            },
            "renderInfo": {
                "last": "2026-10-18 09:30",
                "current": { "rotated": true, "border": 1, "image": ["https://cdn/1.png"] },
                "next": { "battery": "2026-10-18 10:30", "power": "2026-10-18 09:35" }
            }
        }))
        .unwrap();

        let snap = DeviceSnapshot::from_status(&info(), status);
        assert!(snap.online);
        assert_eq!(snap.display_name(), "Kitchen");
        assert_eq!(snap.firmware_version, "1.4.2");
        assert_eq!(snap.power_state, "battery");
        assert_eq!(snap.power_description, "Running on battery");
        assert_eq!(snap.battery_status, "85%");
        assert_eq!(snap.wifi_rssi(), Some(-62));
        assert_eq!(snap.last_render.as_deref(), Some("2026-10-18 09:30"));
        assert!(snap.screen_rotated);
        assert_eq!(snap.screen_border, 1);
        assert_eq!(snap.current_images, vec!["https://cdn/1.png".to_string()]);
        assert_eq!(snap.next_render_battery.as_deref(), Some("2026-10-18 10:30"));
        assert_eq!(snap.next_render_power.as_deref(), Some("2026-10-18 09:35"));
        assert_eq!(snap.model_name(), "Quote/0 (Edition 2)");
    }

    #[test]
    fn test_snapshot_defaults_for_sparse_status() {
        let status: DeviceStatus = serde_json::from_value(json!({
            "status": null,
            "renderInfo": { "current": { "image": null } }
        }))
        .unwrap();

        let snap = DeviceSnapshot::from_status(&info(), status);
        assert_eq!(snap.firmware_version, "unknown");
        assert_eq!(snap.power_state, "unknown");
        assert_eq!(snap.power_description, "");
        assert_eq!(snap.battery_status, "unknown");
        assert_eq!(snap.wifi_signal, "unknown");
        assert_eq!(snap.wifi_rssi(), None);
        assert!(!snap.screen_rotated);
        assert_eq!(snap.screen_border, 0);
        assert!(snap.current_images.is_empty());
        assert!(snap.last_render.is_none());
    }

    #[test]
    fn test_offline_snapshot() {
        let snap = DeviceSnapshot::offline(&info());
        assert!(!snap.online);
        assert_eq!(snap.device_id, "ABCD1234EF56");
        assert_eq!(snap.display_name(), "Quote/0 EF56");
    }

    #[test]
    fn test_display_name_ignores_empty_alias() {
        let mut snap = DeviceSnapshot::offline(&info());
        snap.alias = Some(String::new());
        assert_eq!(snap.display_name(), "Quote/0 EF56");
        assert_eq!(fallback_display_name("AB"), "Quote/0 AB");
    }

    #[test]
    fn test_text_content_omits_absent_fields() {
        let body = TextContent {
            refresh_now: Some(true),
            title: Some("Hello".to_string()),
            task_key: Some("k1".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "refreshNow": true, "title": "Hello", "taskKey": "k1" })
        );
    }

    #[test]
    fn test_image_content_wire_names() {
        let body = ImageContent {
            image: "aGVsbG8=".to_string(),
            border: Some(1),
            dither_type: Some(DitherType::Ordered),
            dither_kernel: Some(DitherKernel::Diffusion2d),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "image": "aGVsbG8=",
                "border": 1,
                "ditherType": "ORDERED",
                "ditherKernel": "DIFFUSION_2D"
            })
        );

        let kernel: DitherKernel = serde_json::from_value(json!("JARVIS_JUDICE_NINKE")).unwrap();
        assert_eq!(kernel, DitherKernel::JarvisJudiceNinke);
        assert_eq!(DitherType::parse("NONE"), Some(DitherType::None));
        assert_eq!(DitherType::parse("diffusion"), None);
    }
}
