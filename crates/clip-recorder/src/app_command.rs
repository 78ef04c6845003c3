use clip_recorder_core::{AppLifecycle, InterruptionSignal, SessionCommand};

/// Commands sent from the console to the main application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// A user intent for the recording session.
    Session(SessionCommand),
    /// Simulated foreground/background change.
    Lifecycle(AppLifecycle),
    /// Simulated audio interruption or focus change.
    Interruption(InterruptionSignal),
    /// Print the session status.
    Status,
    /// Print the command list.
    Help,
    /// Request application shutdown.
    Shutdown,
}
