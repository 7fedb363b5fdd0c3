mod device;
mod gesture;
mod log_entry;
mod status;

pub use device::{Device, DeviceCommand, Power};
pub use gesture::{Gesture, GestureLabel};
pub use log_entry::{LogEntry, LOG_TIME_FORMAT};
pub use status::{ControlReply, GestureReply, StatusSnapshot};
