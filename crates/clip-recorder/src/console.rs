//! Console command source.
//!
//! Reads commands from stdin, one per line, and forwards them to the main
//! application. Besides the recording intents it accepts lifecycle and
//! interruption commands that stand in for the platform events a mobile
//! host would deliver.

use crate::{AppCommand, AppError, AppResult};

use clip_recorder_core::{
    AppLifecycle, AudioFocusChange, AudioSessionInterruption, InterruptionSignal, SessionCommand,
};

use std::{
    io::{BufRead, stdin},
    panic::Location,
    time::Duration,
};

use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Command words with a short description, in help order.
pub(crate) const COMMANDS: &[(&str, &str)] = &[
    ("record", "start a new recording"),
    ("pause", "pause the recording"),
    ("resume", "resume the recording"),
    ("stop", "stop and preview the take"),
    ("save", "save the previewed take"),
    ("discard", "throw the previewed take away"),
    ("play", "play or resume the preview"),
    ("pause-preview", "pause the preview"),
    ("stop-preview", "stop the preview"),
    ("settings", "open the system privacy settings"),
    ("background", "simulate moving to the background"),
    ("foreground", "simulate returning to the foreground"),
    ("interrupt-begin", "simulate an audio session interruption"),
    ("interrupt-end", "simulate the interruption ending"),
    ("focus-loss", "simulate losing audio focus"),
    ("focus-gain", "simulate regaining audio focus"),
    ("status", "print the session status"),
    ("help", "print this list"),
    ("quit", "exit"),
];

/// Parse one console line. Case and surrounding whitespace are ignored.
pub(crate) fn parse_command(line: &str) -> Option<AppCommand> {
    let command = match line.trim().to_ascii_lowercase().as_str() {
        "record" | "start" => AppCommand::Session(SessionCommand::StartRecording),
        "pause" => AppCommand::Session(SessionCommand::Pause),
        "resume" => AppCommand::Session(SessionCommand::Resume),
        "stop" => AppCommand::Session(SessionCommand::Stop),
        "save" => AppCommand::Session(SessionCommand::Save),
        "discard" => AppCommand::Session(SessionCommand::Discard),
        "play" => AppCommand::Session(SessionCommand::PlayPreview),
        "pause-preview" => AppCommand::Session(SessionCommand::PausePreview),
        "stop-preview" => AppCommand::Session(SessionCommand::StopPreview),
        "settings" => AppCommand::Session(SessionCommand::OpenPermissionSettings),
        "background" => AppCommand::Lifecycle(AppLifecycle::Background),
        "foreground" => AppCommand::Lifecycle(AppLifecycle::Active),
        "interrupt-begin" => AppCommand::Interruption(InterruptionSignal::AudioSession(
            AudioSessionInterruption::Began,
        )),
        "interrupt-end" => AppCommand::Interruption(InterruptionSignal::AudioSession(
            AudioSessionInterruption::Ended,
        )),
        "focus-loss" => {
            AppCommand::Interruption(InterruptionSignal::AudioFocus(AudioFocusChange::Loss))
        }
        "focus-gain" => {
            AppCommand::Interruption(InterruptionSignal::AudioFocus(AudioFocusChange::Gain))
        }
        "status" => AppCommand::Status,
        "help" | "?" => AppCommand::Help,
        "quit" | "exit" => AppCommand::Shutdown,
        _ => return None,
    };
    Some(command)
}

/// Command list for the help output.
pub(crate) fn help_text() -> String {
    COMMANDS
        .iter()
        .map(|(word, description)| format!("  {word:<16} {description}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Forwards console commands to the main application.
pub struct ConsoleHandler {
    command_tx: mpsc::Sender<AppCommand>,
}

impl ConsoleHandler {
    /// Create a handler sending to `command_tx`.
    pub fn new(command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { command_tx }
    }

    /// Run the console loop until shutdown or end of input.
    ///
    /// End of input counts as `quit`.
    #[instrument(skip_all)]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let (line_tx, mut line_rx) = mpsc::channel::<String>(32);

        // Single persistent blocking task that forwards stdin lines.
        //
        // Shutdown: when line_rx is dropped (loop breaks), the next
        // line_tx.blocking_send() fails, breaking the blocking loop.
        let handle = tokio::task::spawn_blocking(move || {
            for line in stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if line_tx.blocking_send(line).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Console shutting down");
                    break;
                }
                line = line_rx.recv() => match line {
                    Some(line) => self.handle_line(&line).await?,
                    None => {
                        info!("Console input closed");
                        self.send(AppCommand::Shutdown).await?;
                        break;
                    }
                }
            }
        }

        drop(line_rx);

        // Best-effort join: the blocking task stays in read_line until the
        // next line arrives. The runtime is shut down with a timeout, so a
        // stuck reader does not hold up exit.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Console forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Console forwarder task panicked"),
            Err(_) => debug!(
                "Console forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        Ok(())
    }

    pub(crate) async fn handle_line(&self, line: &str) -> AppResult<()> {
        let input = line.trim();
        if input.is_empty() {
            return Ok(());
        }

        match parse_command(input) {
            Some(command) => self.send(command).await,
            None => {
                warn!(input, "Unknown command");
                self.send(AppCommand::Help).await
            }
        }
    }

    async fn send(&self, command: AppCommand) -> AppResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send {:?}: {}", command, e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
