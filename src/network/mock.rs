use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

use super::api::ControllerApi;
use super::transport::ApiRequest;
use crate::error::ControllerError;
use crate::pipeline::types::{
    ControlReply, Device, DeviceCommand, Gesture, GestureReply, LogEntry, Power, StatusSnapshot,
};

/// In-memory controller that records calls and answers from scripted replies.
/// A `None` reply stands for a transport failure.
pub struct MockController {
    calls: Mutex<Vec<ApiRequest>>,
    status: Mutex<Option<StatusSnapshot>>,
    logs: Mutex<Option<Vec<LogEntry>>>,
    control: Mutex<Option<ControlReply>>,
    gesture: Mutex<Option<GestureReply>>,
    stalled_devices: Mutex<Vec<Device>>,
    stalled_gestures: Mutex<Vec<Gesture>>,
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockController {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            status: Mutex::new(Some(StatusSnapshot {
                esp_connected: true,
                light: Power::Off,
                fan: Power::Off,
                gas_value: 0,
                motion: false,
                last_gesture: None,
            })),
            logs: Mutex::new(Some(Vec::new())),
            control: Mutex::new(Some(ControlReply::ok())),
            gesture: Mutex::new(Some(GestureReply::ok("ok"))),
            stalled_devices: Mutex::new(Vec::new()),
            stalled_gestures: Mutex::new(Vec::new()),
        }
    }

    pub fn set_status(&self, status: Option<StatusSnapshot>) {
        *lock(&self.status) = status;
    }

    pub fn set_logs(&self, logs: Option<Vec<LogEntry>>) {
        *lock(&self.logs) = logs;
    }

    pub fn set_control(&self, reply: Option<ControlReply>) {
        *lock(&self.control) = reply;
    }

    pub fn set_gesture(&self, reply: Option<GestureReply>) {
        *lock(&self.gesture) = reply;
    }

    /// Control calls for this device are recorded and then never answered.
    pub fn stall_control(&self, device: Device) {
        lock(&self.stalled_devices).push(device);
    }

    /// Gesture calls for this label are recorded and then never answered.
    pub fn stall_gesture(&self, gesture: Gesture) {
        lock(&self.stalled_gestures).push(gesture);
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        lock(&self.calls).clone()
    }

    pub fn gesture_calls(&self) -> Vec<Gesture> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                ApiRequest::ProcessGesture(gesture) => Some(*gesture),
                _ => None,
            })
            .collect()
    }

    fn answer<T: Clone>(&self, request: ApiRequest, reply: &Mutex<Option<T>>) -> Result<T, ControllerError> {
        let name = request.name();
        lock(&self.calls).push(request);
        lock(reply)
            .clone()
            .ok_or_else(|| ControllerError::Unavailable(format!("{} unreachable", name)))
    }
}

#[async_trait]
impl ControllerApi for MockController {
    async fn status(&self) -> Result<StatusSnapshot, ControllerError> {
        self.answer(ApiRequest::Status, &self.status)
    }

    async fn logs(&self) -> Result<Vec<LogEntry>, ControllerError> {
        self.answer(ApiRequest::Logs, &self.logs)
    }

    async fn control(&self, command: DeviceCommand) -> Result<ControlReply, ControllerError> {
        let reply = self.answer(ApiRequest::Control(command), &self.control);
        let stalled = lock(&self.stalled_devices).contains(&command.device);
        if stalled {
            std::future::pending::<()>().await;
        }
        reply
    }

    async fn process_gesture(&self, gesture: Gesture) -> Result<GestureReply, ControllerError> {
        let reply = self.answer(ApiRequest::ProcessGesture(gesture), &self.gesture);
        let stalled = lock(&self.stalled_gestures).contains(&gesture);
        if stalled {
            std::future::pending::<()>().await;
        }
        reply
    }
}
