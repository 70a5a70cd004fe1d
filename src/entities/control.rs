//! Control entities: buttons, text inputs and the dither select
//!
//! Text and select values live only in memory, per device. They start
//! empty (text) or at the default option (select).

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::DitherType;

pub struct ButtonDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
}

pub const NEXT_CONTENT: &str = "next_content";
pub const SEND_TEXT: &str = "send_text";
pub const SEND_IMAGE: &str = "send_image";

pub const BUTTON_DESCRIPTIONS: &[ButtonDescription] = &[
    ButtonDescription {
        key: NEXT_CONTENT,
        name: "Next Content",
        icon: "mdi:skip-next",
    },
    ButtonDescription {
        key: SEND_TEXT,
        name: "Send Text",
        icon: "mdi:send",
    },
    ButtonDescription {
        key: SEND_IMAGE,
        name: "Send Image",
        icon: "mdi:image-move",
    },
];

pub struct TextDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub max_length: usize,
}

pub const TEXT_TITLE: &str = "text_title";
pub const TEXT_MESSAGE: &str = "text_message";
pub const TEXT_SIGNATURE: &str = "text_signature";
pub const IMAGE_DATA: &str = "image_data";

pub const TEXT_DESCRIPTIONS: &[TextDescription] = &[
    TextDescription {
        key: TEXT_TITLE,
        name: "Text Title",
        icon: "mdi:format-title",
        max_length: 100,
    },
    TextDescription {
        key: TEXT_MESSAGE,
        name: "Text Message",
        icon: "mdi:message-text-outline",
        max_length: 500,
    },
    TextDescription {
        key: TEXT_SIGNATURE,
        name: "Text Signature",
        icon: "mdi:signature",
        max_length: 100,
    },
    TextDescription {
        key: IMAGE_DATA,
        name: "Image Data",
        icon: "mdi:image-outline",
        max_length: 100_000,
    },
];

pub const DITHER_TYPE: &str = "dither_type";
pub const DITHER_TYPE_NAME: &str = "Dither Type";
pub const DITHER_TYPE_ICON: &str = "mdi:blur";
pub const DEFAULT_DITHER_TYPE: DitherType = DitherType::Diffusion;

pub fn button(key: &str) -> Option<&'static ButtonDescription> {
    BUTTON_DESCRIPTIONS.iter().find(|b| b.key == key)
}

pub fn text(key: &str) -> Option<&'static TextDescription> {
    TEXT_DESCRIPTIONS.iter().find(|t| t.key == key)
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ControlError {
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Value for {key} exceeds {max} characters")]
    TooLong { key: String, max: usize },

    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

/// In-memory values of text and select controls, keyed by (device, entity)
#[derive(Default)]
pub struct ControlValues {
    texts: RwLock<HashMap<(String, String), String>>,
    selects: RwLock<HashMap<(String, String), DitherType>>,
}

impl ControlValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_text(&self, device_id: &str, key: &str, value: &str) -> Result<(), ControlError> {
        let desc = text(key).ok_or_else(|| ControlError::UnknownEntity(key.to_string()))?;
        if value.chars().count() > desc.max_length {
            return Err(ControlError::TooLong {
                key: key.to_string(),
                max: desc.max_length,
            });
        }

        self.texts
            .write()
            .await
            .insert((device_id.to_string(), key.to_string()), value.to_string());
        Ok(())
    }

    /// Current text; empty when never set
    pub async fn text(&self, device_id: &str, key: &str) -> String {
        self.texts
            .read()
            .await
            .get(&(device_id.to_string(), key.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Text value or `None` when empty
    pub async fn text_opt(&self, device_id: &str, key: &str) -> Option<String> {
        Some(self.text(device_id, key).await).filter(|v| !v.is_empty())
    }

    pub async fn select_option(
        &self,
        device_id: &str,
        key: &str,
        option: &str,
    ) -> Result<(), ControlError> {
        if key != DITHER_TYPE {
            return Err(ControlError::UnknownEntity(key.to_string()));
        }
        let dither = DitherType::parse(option)
            .ok_or_else(|| ControlError::InvalidOption(option.to_string()))?;

        self.selects
            .write()
            .await
            .insert((device_id.to_string(), key.to_string()), dither);
        Ok(())
    }

    pub async fn dither_type(&self, device_id: &str) -> DitherType {
        self.selects
            .read()
            .await
            .get(&(device_id.to_string(), DITHER_TYPE.to_string()))
            .copied()
            .unwrap_or(DEFAULT_DITHER_TYPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_text_defaults_and_updates() {
        let values = ControlValues::new();
        assert_eq!(values.text("DEV1", TEXT_TITLE).await, "");
        assert_eq!(values.text_opt("DEV1", TEXT_TITLE).await, None);

        values.set_text("DEV1", TEXT_TITLE, "Hello").await.unwrap();
        assert_eq!(values.text_opt("DEV1", TEXT_TITLE).await.as_deref(), Some("Hello"));
        // per device
        assert_eq!(values.text("DEV2", TEXT_TITLE).await, "");
    }

    #[tokio::test]
    async fn test_text_max_length_enforced() {
        let values = ControlValues::new();
        let long = "x".repeat(101);

        assert_eq!(
            values.set_text("DEV1", TEXT_TITLE, &long).await,
            Err(ControlError::TooLong { key: TEXT_TITLE.to_string(), max: 100 })
        );
        assert!(values.set_text("DEV1", TEXT_MESSAGE, &long).await.is_ok());
        assert!(matches!(
            values.set_text("DEV1", "nope", "x").await,
            Err(ControlError::UnknownEntity(_))
        ));
    }

    #[tokio::test]
    async fn test_dither_select() {
        let values = ControlValues::new();
        assert_eq!(values.dither_type("DEV1").await, DitherType::Diffusion);

        values.select_option("DEV1", DITHER_TYPE, "ORDERED").await.unwrap();
        assert_eq!(values.dither_type("DEV1").await, DitherType::Ordered);

        assert_eq!(
            values.select_option("DEV1", DITHER_TYPE, "BAYER").await,
            Err(ControlError::InvalidOption("BAYER".to_string()))
        );
        assert_eq!(values.dither_type("DEV1").await, DitherType::Ordered);
    }

    #[test]
    fn test_lookups() {
        assert_eq!(button(SEND_IMAGE).map(|b| b.name), Some("Send Image"));
        assert!(button("reboot").is_none());
        assert_eq!(text(IMAGE_DATA).map(|t| t.max_length), Some(100_000));
    }
}
