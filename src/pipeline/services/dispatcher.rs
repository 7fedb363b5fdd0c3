use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::dashboard::Dashboard;
use crate::error::ControllerError;
use crate::network::ControllerApi;
use crate::pipeline::types::{DeviceCommand, Gesture, GestureReply};

/// Sends device commands to the remote controller and reflects the outcome on the dashboard.
///
/// Success updates the device state optimistically and adds a local log line;
/// the next status poll has the final say. Failure never touches device state.
/// Nothing is retried.
#[derive(Clone)]
pub struct CommandDispatcher {
    api: Arc<dyn ControllerApi>,
    dashboard: Dashboard,
}

impl CommandDispatcher {
    pub fn new(api: Arc<dyn ControllerApi>, dashboard: Dashboard) -> Self {
        Self { api, dashboard }
    }

    /// Direct user action. Failures raise a notice.
    pub async fn control(&self, command: DeviceCommand) -> Result<(), ControllerError> {
        match self.api.control(command).await {
            Ok(reply) if reply.success => {
                tracing::info!("{}", command.describe());
                self.dashboard.update(|state| {
                    state.set_power(command.device, command.power);
                    state.record_local(command.describe());
                });
                Ok(())
            }
            Ok(reply) => {
                let reason = reply.error.unwrap_or_else(|| "Unknown error".to_string());
                self.dashboard.update(|state| {
                    state.push_notice(format!("Failed to control device: {}", reason))
                });
                Err(ControllerError::Rejected(reason))
            }
            Err(e) => {
                self.dashboard.update(|state| {
                    state.push_notice("Failed to control device. Check connection.")
                });
                Err(e)
            }
        }
    }

    /// Confirmed gesture. The gesture display updates before the call goes out;
    /// failures are only traced.
    pub async fn confirm_gesture(&self, gesture: Gesture) -> Result<GestureReply, ControllerError> {
        self.dashboard
            .update(|state| state.last_gesture = Some(gesture));
        let reply = self.api.process_gesture(gesture).await?;
        if !reply.success {
            let reason = reply
                .error
                .clone()
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(ControllerError::Rejected(reason));
        }
        let command = gesture.command();
        self.dashboard.update(|state| {
            state.set_power(command.device, command.power);
            state.record_local(format!("🖐 Gesture: {}", command.describe()));
        });
        Ok(reply)
    }

    /// Sends each confirmed gesture as its own task, started in confirmation
    /// order, so a stalled call never holds up the next gesture.
    pub async fn run_gestures(self, mut confirmed_rx: Receiver<Gesture>, cancel_token: CancellationToken) {
        let mut in_flight = JoinSet::new();
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                Some(finished) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = finished {
                        tracing::warn!("Gesture task ended abnormally: {}", e);
                    }
                }
                gesture = confirmed_rx.recv() => match gesture {
                    Some(gesture) => {
                        let dispatcher = self.clone();
                        in_flight.spawn(async move { dispatcher.send_gesture(gesture).await });
                    }
                    None => break,
                },
            }
        }
        in_flight.shutdown().await;
        tracing::info!("Gesture dispatcher stopped");
    }

    async fn send_gesture(&self, gesture: Gesture) {
        match self.confirm_gesture(gesture).await {
            Ok(reply) => tracing::info!(
                "Gesture processed: {}",
                reply.action.as_deref().unwrap_or(gesture.as_str())
            ),
            Err(e) => tracing::error!("Gesture {} processing failed: {}", gesture, e),
        }
    }
}
