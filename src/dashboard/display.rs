use crate::pipeline::types::{Gesture, Power};

pub const GREEN: &str = "#44ff44";
pub const AMBER: &str = "#ffaa00";
pub const RED: &str = "#ff4444";
pub const ACCENT: &str = "#667eea";
pub const MUTED: &str = "#999";

/// Full scale of the gas bar.
pub const GAS_SCALE_MAX: i64 = 1000;
const GAS_AMBER_FROM: i64 = 150;
const GAS_RED_ABOVE: i64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionIndicator {
    Connected,
    Disconnected,
    /// The status fetch itself failed; everything else is stale.
    Error,
}

impl ConnectionIndicator {
    pub fn text(self) -> &'static str {
        match self {
            ConnectionIndicator::Connected => "Connected",
            ConnectionIndicator::Disconnected => "Disconnected",
            ConnectionIndicator::Error => "Error",
        }
    }

    pub fn is_connected(self) -> bool {
        self == ConnectionIndicator::Connected
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasBand {
    Green,
    Amber,
    Red,
}

impl GasBand {
    pub fn for_value(value: i64) -> Self {
        if value > GAS_RED_ABOVE {
            GasBand::Red
        } else if value >= GAS_AMBER_FROM {
            GasBand::Amber
        } else {
            GasBand::Green
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            GasBand::Green => GREEN,
            GasBand::Amber => AMBER,
            GasBand::Red => RED,
        }
    }
}

/// Bar width in percent of the 0..1000 scale, clipped to 0..=100.
pub fn gas_bar_percent(value: i64) -> f64 {
    (value as f64 / GAS_SCALE_MAX as f64 * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasDisplay {
    pub value: i64,
    pub band: GasBand,
    pub bar_percent: f64,
}

impl GasDisplay {
    pub fn new(value: i64) -> Self {
        Self {
            value,
            band: GasBand::for_value(value),
            bar_percent: gas_bar_percent(value),
        }
    }
}

impl Default for GasDisplay {
    fn default() -> Self {
        Self::new(0)
    }
}

pub fn motion_text(motion: bool) -> (&'static str, &'static str) {
    if motion {
        ("Motion Detected", RED)
    } else {
        ("No Motion", GREEN)
    }
}

pub fn power_color(power: Power) -> &'static str {
    match power {
        Power::On => GREEN,
        Power::Off => RED,
    }
}

pub fn last_gesture_text(gesture: Option<Gesture>) -> (&'static str, &'static str) {
    match gesture {
        Some(gesture) => (gesture.display_text(), ACCENT),
        None => ("None", MUTED),
    }
}

/// Live, per-frame feedback from the camera path. Never causes a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Detection {
    #[default]
    Inactive,
    NoHand,
    NoGesture,
    Detected(Gesture),
    CameraStopped,
}

impl Detection {
    pub fn from_label(hand_present: bool, label: Option<Gesture>) -> Self {
        match (hand_present, label) {
            (false, _) => Detection::NoHand,
            (true, None) => Detection::NoGesture,
            (true, Some(gesture)) => Detection::Detected(gesture),
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Detection::Inactive => "Camera inactive",
            Detection::NoHand => "No hand detected",
            Detection::NoGesture => "No gesture detected",
            Detection::Detected(gesture) => gesture.display_text(),
            Detection::CameraStopped => "Camera stopped",
        }
    }
}
