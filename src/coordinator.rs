use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::{
    common::Frame,
    config::{Backend, Configuration},
    dashboard::{Dashboard, Detection},
    error::{AppError, CameraError},
    intake::{JsonLinesSource, LandmarkSource},
    network::{ControllerApi, DashboardClient, EspClient},
    pipeline::{
        services::GasAlertMonitor, CommandDispatcher, DeviceCommand, GestureDebouncer,
        GesturePipeline, StatusPoller,
    },
};

const CAMERA_FAILURE_NOTICE: &str = "Could not access camera. Please check permissions.";

/// Actions a user can take from the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    Control(DeviceCommand),
    StartCamera,
    StopCamera,
}

/// Owns every background task: status polling, the gesture chain
/// (pipeline → debouncer → dispatcher) and the user command handler.
pub struct Coordinator {
    dashboard: Dashboard,
    command_tx: Sender<UserCommand>,
    frame_tx: Sender<Frame>,
    tasks: Vec<JoinHandle<()>>,
    cancel_token: CancellationToken,
}

impl Coordinator {
    fn new(configuration: Configuration, api: Arc<dyn ControllerApi>) -> Self {
        let cancel_token = CancellationToken::new();
        let dashboard = Dashboard::new(configuration.log_capacity);
        let (frame_tx, frame_rx) = mpsc::channel(configuration.frame_buffer_size);
        let (command_tx, command_rx) = mpsc::channel(configuration.command_buffer_size);

        let tasks = Self::start_tasks(
            &configuration,
            api,
            dashboard.clone(),
            frame_tx.clone(),
            frame_rx,
            command_rx,
            cancel_token.clone(),
        );

        Self {
            dashboard,
            command_tx,
            frame_tx,
            tasks,
            cancel_token,
        }
    }

    fn start_tasks(
        configuration: &Configuration,
        api: Arc<dyn ControllerApi>,
        dashboard: Dashboard,
        frame_tx: Sender<Frame>,
        frame_rx: Receiver<Frame>,
        command_rx: Receiver<UserCommand>,
        cancel_token: CancellationToken,
    ) -> Vec<JoinHandle<()>> {
        let (label_tx, label_rx) = mpsc::channel(configuration.frame_buffer_size);
        let (confirmed_tx, confirmed_rx) = mpsc::channel(configuration.command_buffer_size);
        let dispatcher = CommandDispatcher::new(api.clone(), dashboard.clone());

        let poller = StatusPoller::new(api, dashboard.clone(), configuration.poll_interval())
            .with_gas_alert(GasAlertMonitor::new(
                configuration.gas_alert_threshold,
                configuration.gas_alert_cooldown(),
            ));
        let debouncer = GestureDebouncer::new(configuration.debounce_delay());
        let pipeline = GesturePipeline::standard(dashboard.clone(), label_tx);
        let camera = CameraControl {
            program: configuration.landmark_command.clone(),
            args: configuration.landmark_args.clone(),
            frame_tx,
            dashboard,
            running: None,
        };

        let pipeline_token = cancel_token.clone();
        vec![
            tokio::spawn(poller.run(cancel_token.clone())),
            tokio::spawn(debouncer.run(label_rx, confirmed_tx, cancel_token.clone())),
            tokio::spawn(dispatcher.clone().run_gestures(confirmed_rx, cancel_token.clone())),
            tokio::spawn(async move {
                if let Err(e) = pipeline.start_processing(frame_rx, pipeline_token).await {
                    tracing::error!("Pipeline error: {}", e);
                }
            }),
            tokio::spawn(Self::handle_commands(
                dispatcher,
                camera,
                command_rx,
                cancel_token,
            )),
        ]
    }

    /// Device commands run as their own tasks, started in arrival order, so a
    /// stalled request never blocks later commands or camera control.
    async fn handle_commands(
        dispatcher: CommandDispatcher,
        mut camera: CameraControl,
        mut command_rx: Receiver<UserCommand>,
        cancel_token: CancellationToken,
    ) {
        let mut in_flight = JoinSet::new();
        loop {
            let command = tokio::select! {
                _ = cancel_token.cancelled() => break,
                Some(finished) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = finished {
                        tracing::warn!("Control task ended abnormally: {}", e);
                    }
                    continue;
                }
                command = command_rx.recv() => match command {
                    Some(command) => command,
                    None => break,
                },
            };
            match command {
                UserCommand::Control(device_command) => {
                    let dispatcher = dispatcher.clone();
                    in_flight.spawn(async move {
                        if let Err(e) = dispatcher.control(device_command).await {
                            tracing::error!("Control of {} failed: {}", device_command.device, e);
                        }
                    });
                }
                UserCommand::StartCamera => camera.start(&cancel_token),
                UserCommand::StopCamera => camera.stop().await,
            }
        }
        in_flight.shutdown().await;
        camera.stop().await;
        tracing::info!("Command handler stopped");
    }

    pub fn dashboard(&self) -> Dashboard {
        self.dashboard.clone()
    }

    pub fn command_sender(&self) -> Sender<UserCommand> {
        self.command_tx.clone()
    }

    /// Feeds frames from a source other than the configured tracker.
    pub fn frame_sender(&self) -> Sender<Frame> {
        self.frame_tx.clone()
    }

    pub fn stop(&self) {
        self.cancel_token.cancel();
        for task in &self.tasks {
            task.abort();
        }
    }

    /// Cancels all tasks and waits for them to wind down.
    pub async fn shutdown(mut self) {
        self.cancel_token.cancel();
        for task in std::mem::take(&mut self.tasks) {
            if let Err(e) = task.await {
                tracing::warn!("Task ended abnormally: {}", e);
            }
        }
        tracing::info!("Coordinator shut down");
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

struct RunningCamera {
    cancel_token: CancellationToken,
    task: JoinHandle<()>,
}

/// Starts and stops the landmark tracker on user request.
struct CameraControl {
    program: Option<String>,
    args: Vec<String>,
    frame_tx: Sender<Frame>,
    dashboard: Dashboard,
    running: Option<RunningCamera>,
}

impl CameraControl {
    fn start(&mut self, parent: &CancellationToken) {
        if self.running.as_ref().is_some_and(|camera| !camera.task.is_finished()) {
            tracing::debug!("Camera already running");
            return;
        }
        let source = self
            .program
            .as_deref()
            .ok_or(CameraError::NotConfigured)
            .and_then(|program| JsonLinesSource::spawn(program, &self.args));
        match source {
            Ok(source) => {
                let cancel_token = parent.child_token();
                let task = spawn_camera(
                    source,
                    self.frame_tx.clone(),
                    self.dashboard.clone(),
                    cancel_token.clone(),
                );
                self.running = Some(RunningCamera { cancel_token, task });
                self.dashboard.update(|state| {
                    state.detection = Detection::NoHand;
                    state.record_local("Camera started for gesture control");
                });
                tracing::info!("Camera started");
            }
            Err(e) => {
                tracing::error!("Error accessing camera: {}", e);
                self.dashboard
                    .update(|state| state.push_notice(CAMERA_FAILURE_NOTICE));
            }
        }
    }

    async fn stop(&mut self) {
        let Some(camera) = self.running.take() else {
            return;
        };
        // A tracker that already exited has reported its own end.
        let was_live = !camera.task.is_finished();
        camera.cancel_token.cancel();
        if let Err(e) = camera.task.await {
            tracing::warn!("Camera task ended abnormally: {}", e);
        }
        if !was_live {
            return;
        }
        self.dashboard.update(|state| {
            state.detection = Detection::CameraStopped;
            state.record_local("Camera stopped");
        });
        tracing::info!("Camera stopped");
    }
}

/// Pumps frames into the pipeline. A full channel drops the frame rather than
/// stalling the tracker. A tracker that exits before producing anything is
/// treated as a camera that could not be opened.
fn spawn_camera<S>(
    mut source: S,
    frame_tx: Sender<Frame>,
    dashboard: Dashboard,
    cancel_token: CancellationToken,
) -> JoinHandle<()>
where
    S: LandmarkSource + 'static,
{
    tokio::spawn(async move {
        let mut frames_seen = 0u64;
        loop {
            let next = tokio::select! {
                _ = cancel_token.cancelled() => return,
                next = source.next_frame() => next,
            };
            match next {
                Ok(Some(frame)) => {
                    frames_seen += 1;
                    match frame_tx.try_send(frame) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => tracing::trace!("Frame dropped, pipeline busy"),
                        Err(TrySendError::Closed(_)) => return,
                    }
                }
                Ok(None) => {
                    tracing::warn!("Landmark tracker ended after {} frames", frames_seen);
                    break;
                }
                Err(e) => {
                    tracing::error!("Landmark tracker failed: {}", e);
                    break;
                }
            }
        }
        dashboard.update(|state| {
            state.detection = Detection::CameraStopped;
            if frames_seen == 0 {
                state.push_notice(CAMERA_FAILURE_NOTICE);
            } else {
                state.record_local("Camera stopped");
            }
        });
    })
}

pub struct CoordinatorBuilder {
    configuration: Configuration,
    controller: Option<Arc<dyn ControllerApi>>,
}

impl CoordinatorBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            controller: None,
        }
    }

    // Selects the controller backend, this will override the default configuration.
    pub fn backend(mut self, backend: Backend) -> Self {
        self.configuration.backend = backend;
        self
    }

    // Sets the dashboard server URL, this will override the default configuration.
    pub fn server_url(mut self, server_url: impl Into<String>) -> Self {
        self.configuration.server_url = server_url.into();
        self
    }

    // Adjusts the status poll interval, this will override the default configuration.
    pub fn poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.configuration.poll_interval_ms = poll_interval_ms;
        self
    }

    // Adjusts the gesture hold time, this will override the default configuration.
    pub fn debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.configuration.debounce_ms = debounce_ms;
        self
    }

    // Adjusts the frame buffer size, this will override the default configuration.
    pub fn frame_buffer_size(mut self, frame_buffer_size: usize) -> Self {
        self.configuration.frame_buffer_size = frame_buffer_size;
        self
    }

    // Sets the landmark tracker program, this will override the default configuration.
    pub fn landmark_command(mut self, program: impl Into<String>) -> Self {
        self.configuration.landmark_command = Some(program.into());
        self
    }

    /// Uses the given controller instead of building one from the backend setting.
    pub fn controller(mut self, controller: Arc<dyn ControllerApi>) -> Self {
        self.controller = Some(controller);
        self
    }

    /// Must be called from within a tokio runtime; tasks start immediately.
    pub fn build(self) -> Result<Coordinator, AppError> {
        self.configuration.validate()?;
        let configuration = self.configuration;
        let timeout = configuration.request_timeout();
        let controller: Arc<dyn ControllerApi> = match self.controller {
            Some(controller) => controller,
            None => match configuration.backend {
                Backend::Dashboard => {
                    tracing::info!("Using dashboard server at {}", configuration.server_url);
                    Arc::new(DashboardClient::connect(configuration.server_url.clone(), timeout))
                }
                Backend::Esp => {
                    tracing::info!("Using controller at {}", configuration.esp_url);
                    Arc::new(EspClient::new(
                        configuration.esp_url.clone(),
                        timeout,
                        configuration.log_capacity,
                    ))
                }
            },
        };
        Ok(Coordinator::new(configuration, controller))
    }
}
