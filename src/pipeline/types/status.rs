use serde::{Deserialize, Deserializer, Serialize};

use super::device::{Device, Power};
use super::gesture::Gesture;

/// Authoritative state reported by the status endpoint, replaced wholesale per poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    #[serde(default)]
    pub esp_connected: bool,
    #[serde(default)]
    pub light: Power,
    #[serde(default)]
    pub fan: Power,
    #[serde(default)]
    pub gas_value: i64,
    #[serde(default)]
    pub motion: bool,
    #[serde(default, deserialize_with = "lenient_gesture")]
    pub last_gesture: Option<Gesture>,
}

impl StatusSnapshot {
    pub fn power_of(&self, device: Device) -> Power {
        match device {
            Device::Light => self.light,
            Device::Fan => self.fan,
        }
    }
}

// The server echoes whatever label it was last given; anything outside the
// known set is shown as no gesture.
fn lenient_gesture<'de, D>(deserializer: D) -> Result<Option<Gesture>, D::Error>
where
    D: Deserializer<'de>,
{
    let label: Option<String> = Option::deserialize(deserializer)?;
    Ok(label.as_deref().and_then(Gesture::from_label))
}

/// Reply to a direct `control(device, state)` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ControlReply {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Reply to `process_gesture(gesture)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GestureReply {
    pub fn ok(action: impl Into<String>) -> Self {
        Self {
            success: true,
            action: Some(action.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            action: None,
            error: Some(error.into()),
        }
    }
}
