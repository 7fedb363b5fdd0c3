use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use super::display::{
    last_gesture_text, motion_text, power_color, ConnectionIndicator, Detection, GasDisplay,
};
use super::event_log::EventLog;
use crate::pipeline::types::{Device, Gesture, LogEntry, Power, StatusSnapshot};

/// Undrained notices past this count drop the oldest.
pub const MAX_PENDING_NOTICES: usize = 20;

/// A user-visible failure that needs acknowledging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

/// Everything the dashboard displays.
///
/// Poll-derived fields are overwritten together by [`DashboardState::apply_snapshot`];
/// optimistic device updates only last until the next successful poll.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub connection: ConnectionIndicator,
    pub light: Power,
    pub fan: Power,
    pub gas: GasDisplay,
    pub motion: bool,
    pub last_gesture: Option<Gesture>,
    pub detection: Detection,
    pub log: EventLog,
    pub notices: VecDeque<Notice>,
    pub last_reconciled: Option<DateTime<Utc>>,
}

impl DashboardState {
    pub fn new(log_capacity: usize) -> Self {
        Self {
            connection: ConnectionIndicator::Disconnected,
            light: Power::Off,
            fan: Power::Off,
            gas: GasDisplay::default(),
            motion: false,
            last_gesture: None,
            detection: Detection::Inactive,
            log: EventLog::new(log_capacity),
            notices: VecDeque::new(),
            last_reconciled: None,
        }
    }

    pub fn apply_snapshot(&mut self, snapshot: &StatusSnapshot) {
        self.connection = if snapshot.esp_connected {
            ConnectionIndicator::Connected
        } else {
            ConnectionIndicator::Disconnected
        };
        self.light = snapshot.light;
        self.fan = snapshot.fan;
        self.gas = GasDisplay::new(snapshot.gas_value);
        self.motion = snapshot.motion;
        self.last_gesture = snapshot.last_gesture;
        self.last_reconciled = Some(Utc::now());
    }

    /// Status fetch failed: flag it, keep the stale values visible.
    pub fn mark_poll_failed(&mut self) {
        self.connection = ConnectionIndicator::Error;
    }

    pub fn power(&self, device: Device) -> Power {
        match device {
            Device::Light => self.light,
            Device::Fan => self.fan,
        }
    }

    pub fn set_power(&mut self, device: Device, power: Power) {
        match device {
            Device::Light => self.light = power,
            Device::Fan => self.fan = power,
        }
    }

    pub fn device_display(&self, device: Device) -> (&'static str, &'static str) {
        let power = self.power(device);
        (power.as_str(), power_color(power))
    }

    pub fn motion_display(&self) -> (&'static str, &'static str) {
        motion_text(self.motion)
    }

    pub fn last_gesture_display(&self) -> (&'static str, &'static str) {
        last_gesture_text(self.last_gesture)
    }

    pub fn replace_log(&mut self, entries: Vec<LogEntry>) {
        self.log.replace(entries);
    }

    pub fn record_local(&mut self, message: impl Into<String>) {
        self.log.record(message);
    }

    pub fn push_notice(&mut self, message: impl Into<String>) {
        if self.notices.len() == MAX_PENDING_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice {
            message: message.into(),
            raised_at: Utc::now(),
        });
    }

    /// Hands out pending notices, leaving none behind.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// One-line summary for the console.
    pub fn summary(&self) -> String {
        format!(
            "[{}] light={} fan={} gas={} ({:.0}%) motion={} gesture={} camera={}",
            self.connection.text(),
            self.light,
            self.fan,
            self.gas.value,
            self.gas.bar_percent,
            self.motion_display().0,
            self.last_gesture_display().0,
            self.detection.text(),
        )
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(super::event_log::DEFAULT_LOG_CAPACITY)
    }
}
