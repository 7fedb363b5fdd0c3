use serde::{Deserialize, Serialize};
use std::fmt;

use super::device::{Device, DeviceCommand, Power};

/// The closed set of recognized hand poses. "No gesture" is `Option::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    FanOn,
    FanOff,
    LightOn,
    LightOff,
}

/// Per-frame classifier output.
pub type GestureLabel = Option<Gesture>;

impl Gesture {
    pub const ALL: [Gesture; 4] = [
        Gesture::FanOn,
        Gesture::FanOff,
        Gesture::LightOn,
        Gesture::LightOff,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Gesture::FanOn => "fan_on",
            Gesture::FanOff => "fan_off",
            Gesture::LightOn => "light_on",
            Gesture::LightOff => "light_off",
        }
    }

    /// The fixed device command each gesture stands for.
    pub fn command(self) -> DeviceCommand {
        match self {
            Gesture::FanOn => DeviceCommand::new(Device::Fan, Power::On),
            Gesture::FanOff => DeviceCommand::new(Device::Fan, Power::Off),
            Gesture::LightOn => DeviceCommand::new(Device::Light, Power::On),
            Gesture::LightOff => DeviceCommand::new(Device::Light, Power::Off),
        }
    }

    pub fn display_text(self) -> &'static str {
        match self {
            Gesture::FanOn => "👍 Fan ON",
            Gesture::FanOff => "🖐 Fan OFF",
            Gesture::LightOn => "✌ Light ON",
            Gesture::LightOff => "✊ Light OFF",
        }
    }

    /// Lenient parse used for remote payloads, unknown labels map to `None`.
    pub fn from_label(label: &str) -> Option<Gesture> {
        Gesture::ALL.into_iter().find(|g| g.as_str() == label)
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
