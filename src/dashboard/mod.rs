pub mod display;
pub mod event_log;
pub mod state;

pub use display::{ConnectionIndicator, Detection, GasBand, GasDisplay};
pub use event_log::EventLog;
pub use state::{DashboardState, Notice};

use std::sync::{Arc, Mutex, PoisonError};

/// Shared handle on the displayed state.
///
/// Writers replace fields, they never read-modify-write across an await, so
/// one short lock per update is all the coordination needed.
#[derive(Debug, Clone)]
pub struct Dashboard {
    state: Arc<Mutex<DashboardState>>,
}

impl Dashboard {
    pub fn new(log_capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(DashboardState::new(log_capacity))),
        }
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut DashboardState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    pub fn snapshot(&self) -> DashboardState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(event_log::DEFAULT_LOG_CAPACITY)
    }
}
