use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Which remote-controller contract to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// The dashboard server's JSON API.
    Dashboard,
    /// The controller's own plain-text endpoints.
    Esp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub backend: Backend,
    pub server_url: String,
    pub esp_url: String,
    pub poll_interval_ms: u64,
    pub debounce_ms: u64,
    pub log_capacity: usize,
    pub frame_buffer_size: usize,
    pub command_buffer_size: usize,
    pub request_timeout_ms: Option<u64>,
    pub landmark_command: Option<String>,
    pub landmark_args: Vec<String>,
    pub gas_alert_threshold: i64,
    pub gas_alert_cooldown_secs: u64,
    pub log_level: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            backend: Backend::Dashboard,
            server_url: "http://127.0.0.1:5000".to_string(),
            esp_url: "http://192.168.29.226".to_string(),
            poll_interval_ms: 1000,
            debounce_ms: 1000,
            log_capacity: 50,
            frame_buffer_size: 60,
            command_buffer_size: 16,
            request_timeout_ms: None,
            landmark_command: None,
            landmark_args: Vec::new(),
            gas_alert_threshold: 300,
            gas_alert_cooldown_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl Configuration {
    /// Defaults, then `roommate.toml` if present, then `ROOMMATE_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("roommate")
    }

    pub fn load_from(file_stem: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(file_stem).required(false))
            .add_source(
                Environment::with_prefix("ROOMMATE")
                    .try_parsing(true)
                    .list_separator(" ")
                    .with_list_parse_key("landmark_args"),
            )
            .build()?
            .try_deserialize()
    }

    /// Rejects values the runtime can't work with: zero-length intervals and channels.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("poll_interval_ms", self.poll_interval_ms == 0),
            ("frame_buffer_size", self.frame_buffer_size == 0),
            ("command_buffer_size", self.command_buffer_size == 0),
            ("log_capacity", self.log_capacity == 0),
        ];
        match checks.iter().find(|(_, invalid)| *invalid) {
            Some((field, _)) => Err(ConfigError::Message(format!("{} must be positive", field))),
            None => Ok(()),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn gas_alert_cooldown(&self) -> Duration {
        Duration::from_secs(self.gas_alert_cooldown_secs)
    }
}
