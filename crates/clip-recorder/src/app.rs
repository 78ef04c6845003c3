use crate::{AppCommand, AppResult, console::help_text};

use clip_recorder_core::{RecordingSession, SessionEvent, SessionEvents, SessionPhase};

use tokio::sync::{mpsc, watch};
use tracing::{error, info, instrument};

/// Main application state.
///
/// Owns the recording session and is the only place it is driven from:
/// console commands and session events are handled one at a time on the
/// same task.
pub struct App {
    pub(crate) session: RecordingSession,
    pub(crate) session_events: SessionEvents,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Clip-Recorder starting");
        println!("{}\n\n{}", help_text(), self.session.snapshot());

        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    if cmd == AppCommand::Shutdown {
                        info!("Shutdown requested");
                        break;
                    }
                    if let Err(e) = self.handle_command(cmd).await {
                        error!(command = ?cmd, error = %e, "Command failed");
                    }
                }

                Some(event) = self.session_events.recv() => {
                    if let Err(e) = self.handle_event(event).await {
                        error!(error = %e, "Session event failed");
                    }
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        self.session.unmount().await;

        let _ = self.shutdown_tx.send(true);
        info!("Clip-Recorder shut down successfully");

        Ok(())
    }

    /// Apply one console command and print the resulting status.
    #[instrument(skip(self))]
    pub(crate) async fn handle_command(&mut self, cmd: AppCommand) -> AppResult<()> {
        let result = match cmd {
            AppCommand::Session(command) => self.session.handle_command(command).await,
            AppCommand::Lifecycle(lifecycle) => {
                self.session
                    .handle_event(SessionEvent::AppState(lifecycle))
                    .await
            }
            AppCommand::Interruption(signal) => {
                self.session
                    .handle_event(SessionEvent::Interruption(signal))
                    .await
            }
            AppCommand::Help => {
                println!("{}", help_text());
                return Ok(());
            }
            AppCommand::Status | AppCommand::Shutdown => Ok(()),
        };

        // The session has already corrected its state and told the user.
        println!("{}", self.session.snapshot());
        Ok(result?)
    }

    /// Feed a session event back into the session. The status line is
    /// reprinted when the event moved the session to another phase.
    pub(crate) async fn handle_event(&mut self, event: SessionEvent) -> AppResult<()> {
        let before = self.session.phase();
        let result = self.session.handle_event(event).await;

        if self.session.phase() != before {
            println!("{}", self.session.snapshot());
        }

        Ok(result?)
    }
}
