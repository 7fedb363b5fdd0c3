use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;

use crate::coordinator::UserCommand;
use crate::dashboard::Dashboard;
use crate::pipeline::types::{Device, DeviceCommand, Power};

pub const HELP: &str = "commands: light on|off, fan on|off, camera start|stop, status, logs, help, quit";

/// One line of console input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleInput {
    Command(UserCommand),
    Status,
    Logs,
    Help,
    Quit,
}

impl FromStr for ConsoleInput {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<String> = line.split_whitespace().map(str::to_lowercase).collect();
        let words: Vec<&str> = words.iter().map(String::as_str).collect();
        match words.as_slice() {
            ["status"] => Ok(ConsoleInput::Status),
            ["logs"] => Ok(ConsoleInput::Logs),
            ["help"] => Ok(ConsoleInput::Help),
            ["quit"] | ["exit"] => Ok(ConsoleInput::Quit),
            ["camera", "start"] => Ok(ConsoleInput::Command(UserCommand::StartCamera)),
            ["camera", "stop"] => Ok(ConsoleInput::Command(UserCommand::StopCamera)),
            [device, power] => {
                let device = Device::from_str(device)?;
                let power = Power::from_str(power)?;
                Ok(ConsoleInput::Command(UserCommand::Control(DeviceCommand::new(
                    device, power,
                ))))
            }
            [] => Err("empty input".to_string()),
            _ => Err(format!("unknown command '{}'", line.trim())),
        }
    }
}

/// Reads commands until `quit`, end of input or cancellation.
pub async fn run<R>(
    input: R,
    dashboard: Dashboard,
    command_tx: Sender<UserCommand>,
    cancel_token: CancellationToken,
) where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        let line = tokio::select! {
            _ = cancel_token.cancelled() => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Error reading console input: {}", e);
                    break;
                }
            },
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<ConsoleInput>() {
            Ok(ConsoleInput::Command(command)) => {
                if command_tx.send(command).await.is_err() {
                    tracing::warn!("Coordinator is gone, leaving console");
                    break;
                }
            }
            Ok(ConsoleInput::Status) => {
                tracing::info!("{}", dashboard.snapshot().summary());
            }
            Ok(ConsoleInput::Logs) => {
                for entry in dashboard.snapshot().log.entries() {
                    tracing::info!("{}  {}", entry.time, entry.message);
                }
            }
            Ok(ConsoleInput::Help) => tracing::info!("{}", HELP),
            Ok(ConsoleInput::Quit) => break,
            Err(e) => tracing::warn!("{} ({})", e, HELP),
        }
    }
}
