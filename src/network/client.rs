use async_trait::async_trait;
use std::time::Duration;
use tower::ServiceExt;

use super::api::ControllerApi;
use super::transport::{ApiRequest, ApiResponse, ApiService, TransportBuilder};
use crate::error::ControllerError;
use crate::pipeline::types::{
    ControlReply, DeviceCommand, Gesture, GestureReply, LogEntry, StatusSnapshot,
};

/// Client for the dashboard server, which fronts the remote controller.
#[derive(Clone)]
pub struct DashboardClient {
    service: ApiService,
}

impl DashboardClient {
    pub fn new(service: ApiService) -> Self {
        Self { service }
    }

    pub fn connect(base_url: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self::new(TransportBuilder::new(base_url).timeout(timeout).build())
    }

    async fn request(&self, request: ApiRequest) -> Result<ApiResponse, ControllerError> {
        self.service
            .clone()
            .oneshot(request)
            .await
            .map_err(ControllerError::from_boxed)
    }
}

#[async_trait]
impl ControllerApi for DashboardClient {
    async fn status(&self) -> Result<StatusSnapshot, ControllerError> {
        match self.request(ApiRequest::Status).await? {
            ApiResponse::Status(snapshot) => Ok(snapshot),
            _ => Err(ControllerError::UnexpectedResponse("status")),
        }
    }

    async fn logs(&self) -> Result<Vec<LogEntry>, ControllerError> {
        match self.request(ApiRequest::Logs).await? {
            ApiResponse::Logs(entries) => Ok(entries),
            _ => Err(ControllerError::UnexpectedResponse("logs")),
        }
    }

    async fn control(&self, command: DeviceCommand) -> Result<ControlReply, ControllerError> {
        match self.request(ApiRequest::Control(command)).await? {
            ApiResponse::Control(reply) => Ok(reply),
            _ => Err(ControllerError::UnexpectedResponse("control")),
        }
    }

    async fn process_gesture(&self, gesture: Gesture) -> Result<GestureReply, ControllerError> {
        match self.request(ApiRequest::ProcessGesture(gesture)).await? {
            ApiResponse::Gesture(reply) => Ok(reply),
            _ => Err(ControllerError::UnexpectedResponse("process_gesture")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{Device, Power};
    use tower::timeout::TimeoutLayer;
    use tower::util::BoxCloneSyncService;
    use tower::{service_fn, BoxError, ServiceBuilder};

    fn canned() -> ApiService {
        BoxCloneSyncService::new(service_fn(|request: ApiRequest| async move {
            let response = match request {
                ApiRequest::Status => ApiResponse::Status(StatusSnapshot {
                    esp_connected: true,
                    light: Power::On,
                    fan: Power::Off,
                    gas_value: 120,
                    motion: false,
                    last_gesture: None,
                }),
                ApiRequest::Logs => {
                    ApiResponse::Logs(vec![LogEntry::new("Fan turned OFF", "2024-01-01 00:00:00")])
                }
                ApiRequest::Control(command) if command.device == Device::Fan => {
                    ApiResponse::Control(ControlReply::failed("ESP32 is not connected"))
                }
                ApiRequest::Control(_) => ApiResponse::Control(ControlReply::ok()),
                // Deliberately mismatched to exercise the variant check.
                ApiRequest::ProcessGesture(_) => ApiResponse::Logs(Vec::new()),
            };
            Ok::<_, BoxError>(response)
        }))
    }

    fn shareable<T: Send + Sync + 'static>() {}

    #[test]
    fn client_can_be_shared_across_tasks() {
        shareable::<DashboardClient>();
        shareable::<ApiService>();
        let _api: std::sync::Arc<dyn ControllerApi> =
            std::sync::Arc::new(DashboardClient::new(canned()));
    }

    #[tokio::test]
    async fn maps_responses_to_typed_results() {
        let client = DashboardClient::new(canned());
        assert_eq!(client.status().await.unwrap().gas_value, 120);
        assert_eq!(client.logs().await.unwrap().len(), 1);
        assert!(client
            .control(DeviceCommand::new(Device::Light, Power::On))
            .await
            .unwrap()
            .success);
        let refused = client
            .control(DeviceCommand::new(Device::Fan, Power::On))
            .await
            .unwrap();
        assert_eq!(refused.error.as_deref(), Some("ESP32 is not connected"));
    }

    #[tokio::test]
    async fn mismatched_response_is_an_error() {
        let client = DashboardClient::new(canned());
        assert!(matches!(
            client.process_gesture(Gesture::FanOn).await,
            Err(ControllerError::UnexpectedResponse("process_gesture"))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_request_times_out_when_configured() {
        let stalled = ServiceBuilder::new()
            .layer(TimeoutLayer::new(Duration::from_millis(50)))
            .service(service_fn(|_request: ApiRequest| async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, BoxError>(ApiResponse::Logs(Vec::new()))
            }));
        let client = DashboardClient::new(BoxCloneSyncService::new(stalled));
        assert!(matches!(
            client.status().await,
            Err(ControllerError::Timeout)
        ));
    }
}
