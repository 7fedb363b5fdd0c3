use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Controller Error: {0}")]
    Controller(#[from] ControllerError),
    #[error("Camera Error: {0}")]
    Camera(#[from] CameraError),
    #[error("Pipeline Error: {0}")]
    Pipeline(String),
}

// Remote controller error type, covers both transport and application failures
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Remote returned HTTP status {0}")]
    Status(u16),
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("Unexpected response for {0} request")]
    UnexpectedResponse(&'static str),
    #[error("Controller unavailable: {0}")]
    Unavailable(String),
}

impl ControllerError {
    /// Recovers a typed error from a boxed tower service error.
    pub fn from_boxed(err: tower::BoxError) -> Self {
        if err.is::<tower::timeout::error::Elapsed>() {
            return ControllerError::Timeout;
        }
        match err.downcast::<ControllerError>() {
            Ok(err) => *err,
            Err(err) => match err.downcast::<reqwest::Error>() {
                Ok(err) => ControllerError::Transport(*err),
                Err(err) => ControllerError::Unavailable(err.to_string()),
            },
        }
    }
}

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("No landmark source configured")]
    NotConfigured,
    #[error("Failed to start landmark source: {0}")]
    Spawn(std::io::Error),
    #[error("Landmark source has no output stream")]
    MissingOutput,
    #[error("Failed to read landmarks: {0}")]
    Read(std::io::Error),
    #[error("Malformed landmark payload: {0}")]
    Decode(String),
}
