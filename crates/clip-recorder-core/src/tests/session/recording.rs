use crate::{
    HostPlatform, Notice, Permission, PermissionGrant, SessionCommand, SessionError,
    SessionEvent, SessionPhase,
    tests::support::{Harness, START_MS, temp_path_at},
};

use std::path::PathBuf;

/// WHAT: Starting from Idle with permission records into a fresh temp file
/// WHY: The happy path everything else builds on
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_idle_session_with_permission_when_starting_then_recording_into_temp_file() {
    // Given: A mounted desktop session
    let mut h = Harness::desktop();

    // When: Starting a recording
    h.session.start_recording().await.unwrap();

    // Then: Recording into temp_audio_<now>.m4a with the ticker running
    assert_eq!(h.session.phase(), SessionPhase::Recording);
    assert_eq!(h.engine.recording_path(), Some(temp_path_at(START_MS)));
    assert!(h.session.timer_active());
    assert_eq!(h.session.elapsed_display(), "0:00");
    assert_eq!(h.session.temp_file_path(), None);
    assert!(!h.session.is_previewable());
    assert_eq!(
        h.session.recording_clock().recording_start_ms(),
        Some(START_MS)
    );
}

/// WHAT: A plain permission denial leaves the session Idle and tells the user
/// WHY: Recording without microphone access is impossible
#[tokio::test]
async fn given_denied_permission_when_starting_then_idle_with_denied_notice() {
    // Given: The user refuses the prompt
    let mut h = Harness::desktop();
    h.permissions.answer(PermissionGrant::Denied);

    // When: Starting
    let result = h.session.start_recording().await;

    // Then: Still Idle, no recorder call, user told
    assert!(matches!(
        result,
        Err(SessionError::PermissionDenied {
            permanent: false,
            ..
        })
    ));
    assert_eq!(h.session.phase(), SessionPhase::Idle);
    assert_eq!(h.engine.count("start_recorder"), 0);
    assert!(!h.session.timer_active());
    assert_eq!(h.notifier.last(), Some(Notice::PermissionDenied));
}

/// WHAT: A blocked Android permission asks the user to open settings
/// WHY: The platform will not prompt again
#[tokio::test]
async fn given_blocked_android_permission_when_starting_then_settings_prompted() {
    // Given: Android 33 with media access blocked
    let mut h = Harness::mount(HostPlatform::Android { api_level: 33 }, true);
    h.permissions
        .answer_for(Permission::ReadMediaAudio, PermissionGrant::Blocked);

    // When: Starting, then following the settings prompt
    let result = h.session.start_recording().await;
    let opened = h
        .session
        .handle_command(SessionCommand::OpenPermissionSettings)
        .await;

    // Then: Permanent denial, settings opened once
    assert!(matches!(
        result,
        Err(SessionError::PermissionDenied {
            permanent: true,
            ..
        })
    ));
    assert!(opened.is_ok());
    assert_eq!(h.notifier.last(), Some(Notice::PermissionsRequired));
    assert!(Notice::PermissionsRequired.message().contains("`settings` command"));
    assert_eq!(h.permissions.settings_opened(), 1);
    assert_eq!(h.session.phase(), SessionPhase::Idle);
}

/// WHAT: Android 12 requests microphone and both storage permissions
/// WHY: The prompt has to cover where the recording is written
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_android_32_when_starting_then_storage_permissions_requested() {
    let mut h = Harness::mount(HostPlatform::Android { api_level: 32 }, true);

    h.session.start_recording().await.unwrap();

    assert_eq!(
        h.permissions.requests(),
        vec![vec![
            Permission::Microphone,
            Permission::WriteExternalStorage,
            Permission::ReadExternalStorage,
        ]]
    );
}

/// WHAT: A failing permission prompt counts as a denial
/// WHY: No answer must never unlock the microphone
#[tokio::test]
async fn given_unavailable_permission_prompt_when_starting_then_treated_as_denied() {
    let mut h = Harness::desktop();
    h.permissions.make_unavailable();

    let result = h.session.start_recording().await;

    assert!(matches!(
        result,
        Err(SessionError::PermissionDenied {
            permanent: false,
            ..
        })
    ));
    assert_eq!(h.session.phase(), SessionPhase::Idle);
}

/// WHAT: A recorder that fails to start leaves the session Idle
/// WHY: No timer or partial state may survive a failed start
#[tokio::test]
async fn given_failing_recorder_when_starting_then_idle_with_start_failed_notice() {
    // Given: The engine refuses to start
    let mut h = Harness::desktop();
    h.engine.fail("start_recorder");

    // When: Starting
    let result = h.session.start_recording().await;

    // Then: Idle, no timer, user told
    assert!(matches!(
        result,
        Err(SessionError::EngineStartFailure { .. })
    ));
    assert_eq!(h.session.phase(), SessionPhase::Idle);
    assert!(!h.session.timer_active());
    assert_eq!(h.session.recording_clock().recording_start_ms(), None);
    assert_eq!(h.notifier.last(), Some(Notice::RecorderStartFailed));
}

/// WHAT: Start while already recording is ignored
/// WHY: Double taps must not start a second recorder
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_session_when_starting_again_then_ignored() {
    let mut h = Harness::desktop().recording().await.unwrap();

    h.session.start_recording().await.unwrap();

    assert_eq!(h.engine.count("start_recorder"), 1);
    assert_eq!(h.permissions.requests().len(), 1);
}

/// WHAT: Ticks refresh the display from the wall clock
/// WHY: Elapsed time is derived, not counted
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_tick_arrives_then_display_shows_wall_clock_elapsed() {
    let mut h = Harness::desktop().recording().await.unwrap();

    h.clock.advance_ms(75_400);
    h.session.handle_event(SessionEvent::Tick).await.unwrap();

    assert_eq!(h.session.elapsed_display(), "1:15");
}

/// WHAT: Pause freezes the display, stops the timer and pauses the recorder
/// WHY: Paused time must not count toward the take
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_paused_then_timer_stopped_and_display_frozen() {
    // Given: 42 seconds into a take
    let mut h = Harness::desktop().recording().await.unwrap();
    h.clock.advance_secs(42);

    // When: Pausing and letting time pass
    h.session.pause().await.unwrap();
    h.clock.advance_secs(30);
    h.session.handle_event(SessionEvent::Tick).await.unwrap();

    // Then: Frozen at 0:42
    assert_eq!(h.session.phase(), SessionPhase::Paused);
    assert!(!h.session.timer_active());
    assert_eq!(h.session.elapsed_display(), "0:42");
    assert_eq!(h.engine.count("pause_recorder"), 1);
}

/// WHAT: Pausing twice is idempotent
/// WHY: Repeated intents are dropped, not queued
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_paused_session_when_pausing_again_then_single_engine_call() {
    let mut h = Harness::desktop().recording().await.unwrap();

    h.session.handle_command(SessionCommand::Pause).await.unwrap();
    h.session.handle_command(SessionCommand::Pause).await.unwrap();

    assert_eq!(h.session.phase(), SessionPhase::Paused);
    assert_eq!(h.engine.count("pause_recorder"), 1);
}

/// WHAT: A paused 1:30 take resumes at 1:30 and reads 1:40 ten seconds on
/// WHY: Time spent paused is excluded from the elapsed total
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_paused_at_1_30_when_resumed_after_5_minutes_then_1_40_after_10_seconds() {
    // Given: Paused at 1:30
    let mut h = Harness::desktop().recording().await.unwrap();
    h.clock.advance_secs(90);
    h.session.pause().await.unwrap();
    assert_eq!(h.session.elapsed_display(), "1:30");

    // When: Resumed five minutes later, then ten seconds pass
    h.clock.advance_secs(300);
    h.session.resume().await.unwrap();
    assert_eq!(h.session.elapsed_display(), "1:30");
    h.clock.advance_secs(10);
    h.session.handle_event(SessionEvent::Tick).await.unwrap();

    // Then: 1:40, recording with the timer running
    assert_eq!(h.session.elapsed_display(), "1:40");
    assert_eq!(h.session.phase(), SessionPhase::Recording);
    assert!(h.session.timer_active());
}

/// WHAT: Resume outside Paused is ignored
/// WHY: Only a paused take can be resumed
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_idle_or_recording_when_resuming_then_ignored() {
    let mut h = Harness::desktop();
    h.session.resume().await.unwrap();
    assert_eq!(h.session.phase(), SessionPhase::Idle);

    h.session.start_recording().await.unwrap();
    h.session.resume().await.unwrap();

    assert_eq!(h.session.phase(), SessionPhase::Recording);
    assert_eq!(h.engine.count("resume_recorder"), 0);
}

/// WHAT: A failed pause keeps recording and reports the failure
/// WHY: The session state must match what the recorder is doing
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_failing_pause_when_pausing_then_still_recording() {
    let mut h = Harness::desktop().recording().await.unwrap();
    h.engine.fail("pause_recorder");

    let result = h.session.pause().await;

    assert!(matches!(result, Err(SessionError::EngineOperation { .. })));
    assert_eq!(h.session.phase(), SessionPhase::Recording);
    assert!(h.session.timer_active());
    assert_eq!(h.notifier.last(), Some(Notice::RecorderControlFailed));
}

/// WHAT: A failed resume stays Paused
/// WHY: The frozen display must stay valid
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_failing_resume_when_resuming_then_still_paused() {
    let mut h = Harness::desktop().recording().await.unwrap();
    h.clock.advance_secs(5);
    h.session.pause().await.unwrap();
    h.engine.fail("resume_recorder");

    let result = h.session.resume().await;

    assert!(matches!(result, Err(SessionError::EngineOperation { .. })));
    assert_eq!(h.session.phase(), SessionPhase::Paused);
    assert!(!h.session.timer_active());
    assert_eq!(h.session.elapsed_display(), "0:05");
}

/// WHAT: Stop moves to preview with the recorded file and resets the clock
/// WHY: The take is kept for preview, save or discard
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_stopped_then_previewing_with_temp_file() {
    // Given: 12 seconds recorded
    let mut h = Harness::desktop().recording().await.unwrap();
    h.clock.advance_secs(12);

    // When: Stopping
    h.session.handle_command(SessionCommand::Stop).await.unwrap();

    // Then: Previewing the temp file, counters reset
    assert_eq!(h.session.phase(), SessionPhase::Previewing);
    assert!(h.session.is_previewable());
    assert_eq!(
        h.session.temp_file_path(),
        Some(temp_path_at(START_MS).as_path())
    );
    assert!(!h.session.timer_active());
    assert_eq!(h.session.elapsed_display(), "0:00");
    assert_eq!(h.session.recording_clock().recording_start_ms(), None);
    let take = h.session.take().unwrap();
    assert_eq!(take.recorded_secs, 12);
    assert!(!take.interrupted);
}

/// WHAT: Stopping a paused take keeps the paused length
/// WHY: Stop is valid from Paused as well as Recording
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_paused_when_stopped_then_take_length_is_paused_value() {
    let mut h = Harness::desktop().recording().await.unwrap();
    h.clock.advance_secs(20);
    h.session.pause().await.unwrap();
    h.clock.advance_secs(100);

    h.session.stop().await.unwrap();

    assert_eq!(h.session.phase(), SessionPhase::Previewing);
    assert_eq!(h.session.take().unwrap().recorded_secs, 20);
}

/// WHAT: The session previews whatever file the recorder reports
/// WHY: Some recorders pick their own output path
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recorder_reporting_other_path_when_stopped_then_that_path_previewed() {
    let mut h = Harness::desktop().recording().await.unwrap();
    h.engine.stop_with("/cache/engine_output.m4a");

    h.session.stop().await.unwrap();

    assert_eq!(
        h.session.temp_file_path(),
        Some(PathBuf::from("/cache/engine_output.m4a").as_path())
    );
}

/// WHAT: A recorder that fails to stop still leaves a previewable take
/// WHY: The partial file is the best reference available
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_failing_stop_when_stopping_then_previewing_allocated_path() {
    let mut h = Harness::desktop().recording().await.unwrap();
    h.engine.fail("stop_recorder");

    let result = h.session.stop().await;

    assert!(matches!(result, Err(SessionError::EngineStopFailure { .. })));
    assert_eq!(h.session.phase(), SessionPhase::Previewing);
    assert_eq!(
        h.session.temp_file_path(),
        Some(temp_path_at(START_MS).as_path())
    );
    assert!(!h.session.timer_active());
    assert!(h.notifier.contains(&Notice::RecorderStopFailed));
}

/// WHAT: Stop while Idle does nothing
/// WHY: There is no recorder to stop
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_idle_when_stopping_then_ignored() {
    let mut h = Harness::desktop();

    h.session.stop().await.unwrap();

    assert_eq!(h.session.phase(), SessionPhase::Idle);
    assert_eq!(h.engine.count("stop_recorder"), 0);
}

/// WHAT: The display timer runs exactly while Recording
/// WHY: A timer outliving its state would redraw stale values
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_full_take_when_walking_every_state_then_timer_active_only_while_recording() {
    let mut h = Harness::desktop();
    let steps = [
        SessionCommand::StartRecording,
        SessionCommand::Pause,
        SessionCommand::Resume,
        SessionCommand::Stop,
        SessionCommand::Discard,
    ];

    assert!(!h.session.timer_active());
    for step in steps {
        h.clock.advance_secs(3);
        h.session.handle_command(step).await.unwrap();
        assert_eq!(
            h.session.timer_active(),
            h.session.phase() == SessionPhase::Recording,
            "after {step:?}"
        );
    }
    assert_eq!(h.session.phase(), SessionPhase::Idle);
}

/// WHAT: The snapshot mirrors the session and renders a status line
/// WHY: The presentation layer only reads snapshots
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_previewing_session_when_snapshotting_then_fields_and_status_line_match() {
    let mut h = Harness::desktop().previewing(65).await.unwrap();

    let snapshot = h.session.snapshot();

    assert_eq!(snapshot.phase, SessionPhase::Previewing);
    assert!(snapshot.is_previewable);
    assert_eq!(snapshot.temp_file_path, Some(temp_path_at(START_MS)));
    assert_eq!(snapshot.take.map(|t| t.recorded_secs), Some(65));
    assert!(!snapshot.timer_active);
    let line = snapshot.to_string();
    assert!(line.starts_with("preview [1:05]"), "{line}");

    h.session.discard().await.unwrap();
    assert_eq!(h.session.snapshot().to_string(), "idle 0:00");
}
