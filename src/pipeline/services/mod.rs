pub mod classifier;
pub mod debouncer;
pub mod dispatcher;
pub mod gas_alert;
pub mod poller;

pub use classifier::{FingerStates, LandmarkClassifier};
pub use debouncer::{GestureDebouncer, Observation};
pub use dispatcher::CommandDispatcher;
pub use gas_alert::GasAlertMonitor;
pub use poller::{PollOutcome, StatusPoller};
