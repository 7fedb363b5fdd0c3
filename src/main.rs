use std::time::Duration;

use config::ConfigError;
use roommate::config::Configuration;
use roommate::console;
use roommate::coordinator::{CoordinatorBuilder, UserCommand};
use roommate::dashboard::Dashboard;
use roommate::error::AppError;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::Level;

fn init_logging(level: &str) {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    // Fails only if a subscriber is already installed.
    if tracing_subscriber::fmt().with_max_level(level).try_init().is_err() {
        tracing::debug!("Logging already initialised");
    }
}

/// Loads the configuration and installs logging at its level. A load failure
/// still gets logged, at the default level, before it is returned.
fn load_configuration(
    load: impl FnOnce() -> Result<Configuration, ConfigError>,
) -> Result<Configuration, AppError> {
    match load() {
        Ok(configuration) => {
            init_logging(&configuration.log_level);
            Ok(configuration)
        }
        Err(e) => {
            init_logging("info");
            tracing::error!("Failed to load configuration: {}", e);
            Err(e.into())
        }
    }
}

/// Surfaces notices as they are raised.
async fn report_notices(dashboard: Dashboard, cancel_token: CancellationToken) {
    let mut ticker = tokio::time::interval(Duration::from_millis(250));
    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => break,
            _ = ticker.tick() => {
                for notice in dashboard.update(|state| state.take_notices()) {
                    tracing::warn!("{}", notice.message);
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let configuration = load_configuration(Configuration::load)?;
    let auto_camera = configuration.landmark_command.is_some();

    let coordinator = CoordinatorBuilder::new(configuration)
        .build()
        .inspect_err(|e| tracing::error!("Failed to start: {}", e))?;
    let cancel_token = CancellationToken::new();
    let command_tx = coordinator.command_sender();
    if auto_camera && command_tx.send(UserCommand::StartCamera).await.is_err() {
        tracing::warn!("Could not start camera: coordinator not running");
    }

    tokio::spawn(report_notices(coordinator.dashboard(), cancel_token.clone()));
    tracing::info!("{}", console::HELP);
    let console_task = tokio::spawn(console::run(
        BufReader::new(tokio::io::stdin()),
        coordinator.dashboard(),
        command_tx,
        cancel_token.clone(),
    ));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted"),
        _ = console_task => {}
    }
    cancel_token.cancel();
    coordinator.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_failure_is_returned_after_logging_is_up() {
        let result = load_configuration(|| Err(ConfigError::Message("bad backend".to_string())));
        assert!(matches!(result, Err(AppError::Config(_))));
        // a second initialisation must not panic
        init_logging("debug");
    }

    #[test]
    fn loaded_configuration_is_passed_through() {
        let configuration = load_configuration(|| Ok(Configuration::default())).unwrap();
        assert_eq!(configuration.log_level, "info");
    }
}
