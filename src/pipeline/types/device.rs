use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Light,
    Fan,
}

impl Device {
    pub const ALL: [Device; 2] = [Device::Light, Device::Fan];

    /// Lowercase name used in request paths.
    pub fn as_str(self) -> &'static str {
        match self {
            Device::Light => "light",
            Device::Fan => "fan",
        }
    }

    /// Capitalized name used in human-readable messages.
    pub fn title(self) -> &'static str {
        match self {
            Device::Light => "Light",
            Device::Fan => "Fan",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Device::Light),
            "fan" => Ok(Device::Fan),
            other => Err(format!("unknown device '{other}'")),
        }
    }
}

/// Two-valued appliance state. Serialized as `ON`/`OFF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Power {
    On,
    #[default]
    Off,
}

impl Power {
    /// Lowercase form used in request paths.
    pub fn path_segment(self) -> &'static str {
        match self {
            Power::On => "on",
            Power::Off => "off",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Power::On => "ON",
            Power::Off => "OFF",
        }
    }

    pub fn is_on(self) -> bool {
        self == Power::On
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Power {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" => Ok(Power::On),
            "off" => Ok(Power::Off),
            other => Err(format!("unknown state '{other}'")),
        }
    }
}

/// A request to put one device into one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceCommand {
    pub device: Device,
    pub power: Power,
}

impl DeviceCommand {
    pub fn new(device: Device, power: Power) -> Self {
        Self { device, power }
    }

    /// e.g. "Light turned ON"
    pub fn describe(&self) -> String {
        format!("{} turned {}", self.device.title(), self.power)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_uses_uppercase_on_the_wire() {
        assert_eq!(serde_json::to_string(&Power::On).unwrap(), r#""ON""#);
        let power: Power = serde_json::from_str(r#""OFF""#).unwrap();
        assert_eq!(power, Power::Off);
    }

    #[test]
    fn describe_names_device_and_state() {
        let cmd = DeviceCommand::new(Device::Light, Power::On);
        assert_eq!(cmd.describe(), "Light turned ON");
    }

    #[test]
    fn parses_device_and_power_case_insensitively() {
        assert_eq!("FAN".parse::<Device>().unwrap(), Device::Fan);
        assert_eq!(" on ".parse::<Power>().unwrap(), Power::On);
        assert!("lamp".parse::<Device>().is_err());
    }
}
