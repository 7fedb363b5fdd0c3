use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_GAS_ALERT_THRESHOLD: i64 = 300;
pub const DEFAULT_GAS_ALERT_COOLDOWN: Duration = Duration::from_secs(30);

/// Raises at most one gas alert per cooldown window while the reading stays high.
#[derive(Debug, Clone)]
pub struct GasAlertMonitor {
    threshold: i64,
    cooldown: Duration,
    last_alert: Option<Instant>,
}

impl GasAlertMonitor {
    pub fn new(threshold: i64, cooldown: Duration) -> Self {
        Self {
            threshold,
            cooldown,
            last_alert: None,
        }
    }

    /// True when this reading should raise an alert.
    pub fn observe(&mut self, gas_value: i64, now: Instant) -> bool {
        if gas_value <= self.threshold {
            return false;
        }
        if let Some(last) = self.last_alert {
            if now.duration_since(last) < self.cooldown {
                return false;
            }
        }
        self.last_alert = Some(now);
        true
    }
}

impl Default for GasAlertMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_GAS_ALERT_THRESHOLD, DEFAULT_GAS_ALERT_COOLDOWN)
    }
}
