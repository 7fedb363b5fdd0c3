use serde::de::DeserializeOwned;
use futures::future::BoxFuture;
use futures::task::{Context, Poll};
use std::time::{Duration, Instant};
use tower::timeout::TimeoutLayer;
use tower::util::BoxCloneSyncService;
use tower::{BoxError, Service, ServiceBuilder};
use tower_layer::Layer;

use crate::error::ControllerError;
use crate::pipeline::types::{
    ControlReply, DeviceCommand, Gesture, GestureReply, LogEntry, StatusSnapshot,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    Status,
    Logs,
    Control(DeviceCommand),
    ProcessGesture(Gesture),
}

impl ApiRequest {
    pub fn name(&self) -> &'static str {
        match self {
            ApiRequest::Status => "status",
            ApiRequest::Logs => "logs",
            ApiRequest::Control(_) => "control",
            ApiRequest::ProcessGesture(_) => "process_gesture",
        }
    }
}

#[derive(Debug, Clone)]
pub enum ApiResponse {
    Status(StatusSnapshot),
    Logs(Vec<LogEntry>),
    Control(ControlReply),
    Gesture(GestureReply),
}

pub type ApiService = BoxCloneSyncService<ApiRequest, ApiResponse, BoxError>;

/// Plain HTTP transport against the dashboard server's JSON API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ControllerError> {
        match request {
            ApiRequest::Status => {
                let response = self.http.get(self.url("api/status")).send().await?;
                Ok(ApiResponse::Status(decode_success(response).await?))
            }
            ApiRequest::Logs => {
                let response = self.http.get(self.url("api/logs")).send().await?;
                Ok(ApiResponse::Logs(decode_success(response).await?))
            }
            ApiRequest::Control(command) => {
                let path = format!(
                    "api/control/{}/{}",
                    command.device.as_str(),
                    command.power.path_segment()
                );
                let response = self.http.get(self.url(&path)).send().await?;
                Ok(ApiResponse::Control(decode_reply(response).await?))
            }
            ApiRequest::ProcessGesture(gesture) => {
                let response = self
                    .http
                    .post(self.url("api/process_gesture"))
                    .json(&serde_json::json!({ "gesture": gesture }))
                    .send()
                    .await?;
                Ok(ApiResponse::Gesture(decode_reply(response).await?))
            }
        }
    }
}

// Data endpoints must answer 2xx.
async fn decode_success<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ControllerError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ControllerError::Status(status.as_u16()));
    }
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ControllerError::Decode(e.to_string()))
}

// Command endpoints report refusals as JSON on 4xx/5xx, so the body wins over the status.
async fn decode_reply<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ControllerError> {
    let status = response.status();
    let body = response.bytes().await?;
    match serde_json::from_slice::<T>(&body) {
        Ok(reply) => Ok(reply),
        Err(_) if !status.is_success() => Err(ControllerError::Status(status.as_u16())),
        Err(e) => Err(ControllerError::Decode(e.to_string())),
    }
}

impl Service<ApiRequest> for HttpTransport {
    type Response = ApiResponse;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: ApiRequest) -> Self::Future {
        let transport = self.clone();
        Box::pin(async move { transport.execute(request).await.map_err(BoxError::from) })
    }
}

/// Traces every request with its latency.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogLayer;

impl<S> Layer<S> for RequestLogLayer {
    type Service = RequestLog<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLog { inner }
    }
}

#[derive(Debug, Clone)]
pub struct RequestLog<S> {
    inner: S,
}

impl<S> Service<ApiRequest> for RequestLog<S>
where
    S: Service<ApiRequest>,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    S::Error: std::fmt::Display + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: ApiRequest) -> Self::Future {
        let name = request.name();
        let started = Instant::now();
        let future = self.inner.call(request);
        Box::pin(async move {
            let result = future.await;
            let elapsed_ms = started.elapsed().as_millis();
            match &result {
                Ok(_) => tracing::debug!("{} request completed in {}ms", name, elapsed_ms),
                Err(e) => tracing::warn!("{} request failed after {}ms: {}", name, elapsed_ms, e),
            }
            result
        })
    }
}

pub struct TransportBuilder {
    base_url: String,
    timeout: Option<Duration>,
}

impl TransportBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    // No timeout unless one is set, the transport's own limits apply.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> ApiService {
        let service = ServiceBuilder::new()
            .layer(RequestLogLayer)
            .option_layer(self.timeout.map(TimeoutLayer::new))
            .service(HttpTransport::new(self.base_url));
        BoxCloneSyncService::new(service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{Device, Power};

    #[test]
    fn url_joins_without_double_slash() {
        let transport = HttpTransport::new("http://127.0.0.1:5000/");
        assert_eq!(
            transport.url("/api/status"),
            "http://127.0.0.1:5000/api/status"
        );
        assert_eq!(transport.url("api/logs"), "http://127.0.0.1:5000/api/logs");
    }

    #[test]
    fn request_names() {
        assert_eq!(ApiRequest::Status.name(), "status");
        assert_eq!(
            ApiRequest::Control(DeviceCommand::new(Device::Fan, Power::On)).name(),
            "control"
        );
        assert_eq!(
            ApiRequest::ProcessGesture(Gesture::FanOff).name(),
            "process_gesture"
        );
    }
}
