use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::api::ControllerApi;
use crate::dashboard::EventLog;
use crate::error::ControllerError;
use crate::pipeline::types::{
    ControlReply, Device, DeviceCommand, Gesture, GestureReply, LogEntry, Power, StatusSnapshot,
};

/// One parsed `Gas:123|Motion:Detected|Light:ON|Fan:OFF` status line.
/// Fields missing from the line are left untouched when applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EspReading {
    pub gas_value: Option<i64>,
    pub motion: Option<bool>,
    pub light: Option<Power>,
    pub fan: Option<Power>,
}

impl EspReading {
    pub fn apply(&self, snapshot: &mut StatusSnapshot) {
        if let Some(gas_value) = self.gas_value {
            snapshot.gas_value = gas_value;
        }
        if let Some(motion) = self.motion {
            snapshot.motion = motion;
        }
        if let Some(light) = self.light {
            snapshot.light = light;
        }
        if let Some(fan) = self.fan {
            snapshot.fan = fan;
        }
    }
}

/// Parses the controller's plain-text status. `Ok(None)` when the body carries no reading.
pub fn parse_status_line(text: &str) -> Result<Option<EspReading>, ControllerError> {
    if !text.contains("Gas:") {
        return Ok(None);
    }
    let mut reading = EspReading::default();
    for part in text.split('|').map(str::trim) {
        if let Some(value) = part.strip_prefix("Gas:") {
            let value = value.trim();
            reading.gas_value = Some(value.parse().map_err(|e| {
                ControllerError::Decode(format!("gas value '{}': {}", value, e))
            })?);
        } else if let Some(value) = part.strip_prefix("Motion:") {
            reading.motion = Some(value.contains("Detected"));
        } else if let Some(value) = part.strip_prefix("Light:") {
            reading.light = Some(value.parse().map_err(ControllerError::Decode)?);
        } else if let Some(value) = part.strip_prefix("Fan:") {
            reading.fan = Some(value.parse().map_err(ControllerError::Decode)?);
        }
    }
    Ok(Some(reading))
}

/// Talks to the remote controller directly instead of through the dashboard server.
///
/// Keeps the last known snapshot and its own event log, so it answers the same
/// contract: a dead link shows up as `esp_connected: false`, not as an error.
pub struct EspClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Option<Duration>,
    snapshot: Mutex<StatusSnapshot>,
    log: Mutex<EventLog>,
}

impl EspClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>, log_capacity: usize) -> Self {
        let client = Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            timeout,
            snapshot: Mutex::new(StatusSnapshot {
                esp_connected: false,
                light: Power::Off,
                fan: Power::Off,
                gas_value: 0,
                motion: false,
                last_gesture: None,
            }),
            log: Mutex::new(EventLog::new(log_capacity)),
        };
        client.record("Direct controller link started");
        client
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn record(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(message);
    }

    fn with_snapshot<R>(&self, f: impl FnOnce(&mut StatusSnapshot) -> R) -> R {
        let mut snapshot = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut snapshot)
    }

    fn set_connected(&self, connected: bool) -> bool {
        self.with_snapshot(|s| std::mem::replace(&mut s.esp_connected, connected))
    }

    fn set_power(&self, device: Device, power: Power) {
        self.with_snapshot(|s| match device {
            Device::Light => s.light = power,
            Device::Fan => s.fan = power,
        });
    }

    async fn get(&self, path: &str) -> Result<(reqwest::StatusCode, String), ControllerError> {
        let mut request = self.http.get(self.url(path));
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }

    fn command_path(command: DeviceCommand) -> String {
        format!("{}/{}", command.device.as_str(), command.power.path_segment())
    }
}

#[async_trait]
impl ControllerApi for EspClient {
    async fn status(&self) -> Result<StatusSnapshot, ControllerError> {
        match self.get("status").await {
            Ok((status, body)) if status.is_success() => match parse_status_line(&body) {
                Ok(reading) => {
                    if !self.set_connected(true) {
                        self.record("ESP32 connected successfully.");
                    }
                    if let Some(reading) = reading {
                        self.with_snapshot(|s| reading.apply(s));
                    }
                }
                Err(e) => {
                    self.record(format!("Unreadable ESP32 status: {}", e));
                    self.set_connected(false);
                }
            },
            Ok((status, _)) => {
                if self.set_connected(false) {
                    self.record(format!("ESP32 returned non-200 status: {}", status.as_u16()));
                }
            }
            Err(e) => {
                if self.set_connected(false) {
                    self.record(format!("ESP32 connection lost: {}", e));
                }
            }
        }
        Ok(self.with_snapshot(|s| s.clone()))
    }

    async fn logs(&self) -> Result<Vec<LogEntry>, ControllerError> {
        Ok(self
            .log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .to_vec())
    }

    async fn control(&self, command: DeviceCommand) -> Result<ControlReply, ControllerError> {
        if !self.with_snapshot(|s| s.esp_connected) {
            return Ok(ControlReply::failed("ESP32 is not connected"));
        }
        let device = command.device.as_str();
        match self.get(&Self::command_path(command)).await {
            Ok((status, _)) if status.is_success() => {
                self.set_power(command.device, command.power);
                self.record(command.describe());
                Ok(ControlReply::ok())
            }
            Ok((status, _)) => {
                self.record(format!(
                    "Failed to control {}: ESP32 returned status {}",
                    device,
                    status.as_u16()
                ));
                Ok(ControlReply::failed(format!(
                    "ESP32 request failed with status {}",
                    status.as_u16()
                )))
            }
            Err(e) => {
                self.record(format!("Failed to control {}: {}", device, e));
                Ok(ControlReply::failed(format!(
                    "Failed to communicate with ESP32: {}",
                    e
                )))
            }
        }
    }

    async fn process_gesture(&self, gesture: Gesture) -> Result<GestureReply, ControllerError> {
        self.with_snapshot(|s| s.last_gesture = Some(gesture));
        let command = gesture.command();
        match self.get(&Self::command_path(command)).await {
            Ok((status, _)) if status.is_success() => {
                self.set_power(command.device, command.power);
                self.record(format!("🖐 Gesture: {}", command.describe()));
                Ok(GestureReply::ok(format!(
                    "{} {}",
                    command.device.title(),
                    command.power
                )))
            }
            Ok((status, _)) => Ok(GestureReply::failed(format!(
                "ESP32 request failed with status {}",
                status.as_u16()
            ))),
            Err(e) => Ok(GestureReply::failed(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_status_line() {
        let reading = parse_status_line("Gas:123|Motion:Detected|Light:ON|Fan:OFF")
            .unwrap()
            .unwrap();
        assert_eq!(
            reading,
            EspReading {
                gas_value: Some(123),
                motion: Some(true),
                light: Some(Power::On),
                fan: Some(Power::Off),
            }
        );
    }

    #[test]
    fn partial_line_only_touches_present_fields() {
        let reading = parse_status_line("Gas:410|Motion:None").unwrap().unwrap();
        let mut snapshot = StatusSnapshot {
            esp_connected: true,
            light: Power::On,
            fan: Power::On,
            gas_value: 0,
            motion: true,
            last_gesture: None,
        };
        reading.apply(&mut snapshot);
        assert_eq!(snapshot.gas_value, 410);
        assert!(!snapshot.motion);
        assert_eq!(snapshot.light, Power::On);
    }

    #[test]
    fn body_without_reading_is_none_and_bad_gas_is_an_error() {
        assert_eq!(parse_status_line("OK").unwrap(), None);
        assert!(matches!(
            parse_status_line("Gas:abc|Light:ON"),
            Err(ControllerError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn control_is_refused_while_disconnected() {
        let client = EspClient::new("http://127.0.0.1:9", None, 50);
        let reply = client
            .control(DeviceCommand::new(Device::Light, Power::On))
            .await
            .unwrap();
        assert_eq!(reply, ControlReply::failed("ESP32 is not connected"));
        let logs = client.logs().await.unwrap();
        assert_eq!(logs.len(), 1);
    }

    #[tokio::test]
    async fn unreachable_controller_reports_disconnected_snapshot() {
        let client = EspClient::new("http://127.0.0.1:9", Some(Duration::from_millis(500)), 50);
        let snapshot = client.status().await.unwrap();
        assert!(!snapshot.esp_connected);
        assert_eq!(snapshot.gas_value, 0);
    }
}
