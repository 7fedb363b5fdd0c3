use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::gas_alert::GasAlertMonitor;
use crate::dashboard::Dashboard;
use crate::network::ControllerApi;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Result of one reconciliation round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    pub status_ok: bool,
    pub logs_ok: bool,
    pub gas_alert: bool,
}

/// Periodically pulls the authoritative snapshot and log list into the dashboard.
pub struct StatusPoller {
    api: Arc<dyn ControllerApi>,
    dashboard: Dashboard,
    interval: Duration,
    gas_alert: GasAlertMonitor,
}

impl StatusPoller {
    pub fn new(api: Arc<dyn ControllerApi>, dashboard: Dashboard, interval: Duration) -> Self {
        Self {
            api,
            dashboard,
            interval,
            gas_alert: GasAlertMonitor::default(),
        }
    }

    pub fn with_gas_alert(mut self, gas_alert: GasAlertMonitor) -> Self {
        self.gas_alert = gas_alert;
        self
    }

    pub async fn poll_once(&mut self) -> PollOutcome {
        let (status, logs) = tokio::join!(self.api.status(), self.api.logs());
        let mut outcome = PollOutcome {
            status_ok: status.is_ok(),
            logs_ok: logs.is_ok(),
            gas_alert: false,
        };

        match logs {
            Ok(entries) => self.dashboard.update(|state| state.replace_log(entries)),
            Err(e) => tracing::warn!("Error fetching logs: {}", e),
        }

        match status {
            Ok(snapshot) => {
                outcome.gas_alert = self.gas_alert.observe(snapshot.gas_value, Instant::now());
                self.dashboard.update(|state| {
                    state.apply_snapshot(&snapshot);
                    if outcome.gas_alert {
                        let message = format!("⚠ Gas leak detected (value {})", snapshot.gas_value);
                        state.record_local(message.clone());
                        state.push_notice(message);
                    }
                });
                if outcome.gas_alert {
                    tracing::warn!("Gas level {} above alert threshold", snapshot.gas_value);
                }
                tracing::debug!(
                    "Reconciled status: connected={} light={} fan={} gas={}",
                    snapshot.esp_connected,
                    snapshot.light,
                    snapshot.fan,
                    snapshot.gas_value
                );
            }
            Err(e) => {
                tracing::warn!("Error fetching status: {}", e);
                self.dashboard.update(|state| state.mark_poll_failed());
            }
        }
        outcome
    }

    pub async fn run(mut self, cancel_token: CancellationToken) {
        tracing::info!("Status poller started (every {}ms)", self.interval.as_millis());
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = cancel_token.cancelled() => break,
                        _ = self.poll_once() => {}
                    }
                }
            }
        }
        tracing::info!("Status poller stopped");
    }
}
