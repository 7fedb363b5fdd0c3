pub mod common;
pub mod config;
pub mod console;
pub mod coordinator;
pub mod dashboard;
pub mod error;
pub mod intake;
pub mod network;
pub mod pipeline;

pub use error::{AppError, CameraError, ControllerError};

pub use config::{Backend, Configuration};
pub use coordinator::{Coordinator, CoordinatorBuilder, UserCommand};
pub use dashboard::{Dashboard, DashboardState};
pub use network::{ControllerApi, DashboardClient, EspClient};
