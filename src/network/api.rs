use async_trait::async_trait;

use crate::error::ControllerError;
use crate::pipeline::types::{
    ControlReply, DeviceCommand, Gesture, GestureReply, LogEntry, StatusSnapshot,
};

/// Request/response contract of the remote controller.
///
/// `Err` means the call itself failed (transport, status, decode). An
/// application-level refusal comes back as `Ok` with `success: false`.
#[async_trait]
pub trait ControllerApi: Send + Sync {
    async fn status(&self) -> Result<StatusSnapshot, ControllerError>;
    async fn logs(&self) -> Result<Vec<LogEntry>, ControllerError>;
    async fn control(&self, command: DeviceCommand) -> Result<ControlReply, ControllerError>;
    async fn process_gesture(&self, gesture: Gesture) -> Result<GestureReply, ControllerError>;
}
