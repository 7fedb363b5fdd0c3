pub mod orchestration;
pub mod services;
pub mod types;

pub use orchestration::GesturePipeline;
pub use services::{CommandDispatcher, GestureDebouncer, LandmarkClassifier, StatusPoller};
pub use types::{Device, DeviceCommand, Gesture, GestureLabel, LogEntry, Power, StatusSnapshot};
