/// User intents accepted by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Ask for permission and begin recording.
    StartRecording,
    /// Pause the active recording.
    Pause,
    /// Resume a paused recording.
    Resume,
    /// Stop recording and preview the take.
    Stop,
    /// Commit the previewed take.
    Save,
    /// Throw the previewed take away.
    Discard,
    /// Play or resume the preview.
    PlayPreview,
    /// Pause the preview.
    PausePreview,
    /// Stop the preview and rewind.
    StopPreview,
    /// Open system settings after a permanent permission denial.
    OpenPermissionSettings,
}
