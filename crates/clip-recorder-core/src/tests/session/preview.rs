use crate::{
    Notice, PlaybackState, SessionCommand, SessionError, SessionPhase,
    tests::support::{Harness, START_MS, temp_path_at},
};

/// Listener count with only the interruption listener registered.
const BASELINE_LISTENERS: usize = 1;

/// WHAT: Playing the preview starts the player with both listeners
/// WHY: Progress and completion drive the preview UI
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_previewing_when_playing_then_player_started_with_listeners() {
    // Given: A stopped take
    let mut h = Harness::desktop().previewing(4).await.unwrap();

    // When: Playing
    h.session
        .handle_command(SessionCommand::PlayPreview)
        .await
        .unwrap();

    // Then: Playing with progress and completion listeners registered
    let preview = h.session.preview().unwrap();
    assert_eq!(preview.playback(), PlaybackState::Playing);
    assert!(preview.is_listening());
    assert_eq!(h.engine.count("start_player"), 1);
    assert_eq!(h.engine.active_listeners(), BASELINE_LISTENERS + 2);
}

/// WHAT: Progress events update position and duration
/// WHY: The preview shows position / duration while playing
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_playing_preview_when_progress_reported_then_position_updated() {
    let mut h = Harness::desktop().previewing(4).await.unwrap();
    h.session.play_preview().await.unwrap();

    let sink = h.engine.playback_sink().unwrap();
    assert!(sink.progress(1_500, 4_000));
    h.pump().await.unwrap();

    let preview = h.session.preview().unwrap();
    assert_eq!(preview.position_ms(), 1_500);
    assert_eq!(preview.duration_ms(), 4_000);
}

/// WHAT: Play after pause resumes instead of restarting
/// WHY: The position must be kept across a pause
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_paused_preview_when_playing_then_resumed_from_position() {
    // Given: Preview paused at 2s
    let mut h = Harness::desktop().previewing(4).await.unwrap();
    h.session.play_preview().await.unwrap();
    h.engine.playback_sink().unwrap().progress(2_000, 4_000);
    h.pump().await.unwrap();
    h.session.pause_preview().await.unwrap();
    assert_eq!(
        h.session.preview().unwrap().playback(),
        PlaybackState::Paused
    );

    // When: Playing again
    h.session.play_preview().await.unwrap();

    // Then: Resumed, not restarted
    let preview = h.session.preview().unwrap();
    assert_eq!(preview.playback(), PlaybackState::Playing);
    assert_eq!(preview.position_ms(), 2_000);
    assert_eq!(h.engine.count("start_player"), 1);
    assert_eq!(h.engine.count("resume_player"), 1);
}

/// WHAT: Stopping the preview releases listeners and rewinds
/// WHY: Listeners must not outlive playback
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_playing_preview_when_stopped_then_listeners_released_and_rewound() {
    // Given: Playing at 1s
    let mut h = Harness::desktop().previewing(4).await.unwrap();
    h.session.play_preview().await.unwrap();
    let sink = h.engine.playback_sink().unwrap();
    sink.progress(1_000, 4_000);
    h.pump().await.unwrap();

    // When: Stopping, then a late progress event arrives
    h.session.stop_preview().await.unwrap();
    sink.progress(1_100, 4_000);
    h.pump().await.unwrap();

    // Then: Stopped at 0 with listeners gone
    let preview = h.session.preview().unwrap();
    assert_eq!(preview.playback(), PlaybackState::Stopped);
    assert_eq!(preview.position_ms(), 0);
    assert!(!preview.is_listening());
    assert_eq!(h.engine.active_listeners(), BASELINE_LISTENERS);
}

/// WHAT: Playback completion resets the preview
/// WHY: The next play starts from the beginning
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_playing_preview_when_completed_then_stopped_and_released() {
    let mut h = Harness::desktop().previewing(4).await.unwrap();
    h.session.play_preview().await.unwrap();
    let sink = h.engine.playback_sink().unwrap();
    sink.progress(3_900, 4_000);

    assert!(sink.complete());
    h.pump().await.unwrap();

    let preview = h.session.preview().unwrap();
    assert_eq!(preview.playback(), PlaybackState::Stopped);
    assert_eq!(preview.position_ms(), 0);
    assert_eq!(h.engine.active_listeners(), BASELINE_LISTENERS);
}

/// WHAT: Events from an earlier playback are dropped
/// WHY: A late event from a previous run must not move the new one
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_restarted_playback_when_old_run_reports_then_ignored() {
    // Given: A first run, stopped, and a second run
    let mut h = Harness::desktop().previewing(4).await.unwrap();
    h.session.play_preview().await.unwrap();
    let old_sink = h.engine.playback_sink().unwrap();
    h.session.stop_preview().await.unwrap();
    h.session.play_preview().await.unwrap();
    let new_sink = h.engine.playback_sink().unwrap();
    assert_ne!(old_sink.epoch(), new_sink.epoch());

    // When: Both report
    old_sink.progress(3_000, 4_000);
    old_sink.complete();
    new_sink.progress(500, 4_000);
    h.pump().await.unwrap();

    // Then: Only the current run counts
    let preview = h.session.preview().unwrap();
    assert_eq!(preview.position_ms(), 500);
    assert_eq!(preview.playback(), PlaybackState::Playing);
}

/// WHAT: Play with nothing recorded tells the user
/// WHY: The preview only exists after a stop
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_idle_when_playing_then_preview_unavailable() {
    let mut h = Harness::desktop();

    h.session.play_preview().await.unwrap();

    assert_eq!(h.notifier.last(), Some(Notice::PreviewUnavailable));
    assert_eq!(h.engine.count("start_player"), 0);
}

/// WHAT: Play with the temp file gone tells the user
/// WHY: The player must not be pointed at a missing file
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_missing_temp_file_when_playing_then_preview_unavailable() {
    let mut h = Harness::desktop().previewing(4).await.unwrap();
    h.files.remove(&temp_path_at(START_MS));

    h.session.play_preview().await.unwrap();

    assert_eq!(h.notifier.last(), Some(Notice::PreviewUnavailable));
    assert_eq!(h.engine.count("start_player"), 0);
    assert_eq!(h.session.phase(), SessionPhase::Previewing);
}

/// WHAT: A player that fails to start leaves no listeners behind
/// WHY: Orphaned listeners would fire into a stopped preview
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_failing_player_when_playing_then_stopped_without_listeners() {
    let mut h = Harness::desktop().previewing(4).await.unwrap();
    h.engine.fail("start_player");

    let result = h.session.play_preview().await;

    assert!(matches!(result, Err(SessionError::EngineOperation { .. })));
    let preview = h.session.preview().unwrap();
    assert_eq!(preview.playback(), PlaybackState::Stopped);
    assert!(!preview.is_listening());
    assert_eq!(h.engine.active_listeners(), BASELINE_LISTENERS);
    assert_eq!(h.notifier.last(), Some(Notice::PlaybackFailed));

    // And: A retry once the engine recovers works
    h.engine.recover("start_player");
    h.session.play_preview().await.unwrap();
    assert_eq!(
        h.session.preview().unwrap().playback(),
        PlaybackState::Playing
    );
}

/// WHAT: Saving stops playback and releases its listeners first
/// WHY: The file must not be in use while it is copied and deleted
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_playing_preview_when_saving_then_playback_stopped() {
    let mut h = Harness::desktop().previewing(4).await.unwrap();
    h.session.play_preview().await.unwrap();

    h.session.save().await.unwrap();

    assert_eq!(h.engine.count("stop_player"), 1);
    assert_eq!(h.engine.active_listeners(), BASELINE_LISTENERS);
    assert_eq!(h.session.phase(), SessionPhase::Idle);
}

/// WHAT: A preview that played to the end still releases the player on save
/// WHY: The engine keeps the finished player until the session stops it
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_completed_preview_when_saving_then_player_released() {
    // Given: Playback ran to the end
    let mut h = Harness::desktop().previewing(4).await.unwrap();
    h.session.play_preview().await.unwrap();
    assert!(h.engine.playback_sink().unwrap().complete());
    h.pump().await.unwrap();
    assert_eq!(h.engine.count("stop_player"), 0);

    // When: Saving
    h.session.save().await.unwrap();

    // Then: The player was stopped once
    assert_eq!(h.engine.count("stop_player"), 1);
    assert_eq!(h.session.phase(), SessionPhase::Idle);
}

/// WHAT: Discarding after completion releases the player, and only once
/// WHY: A later stop must not hit the engine again
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_completed_preview_when_discarding_then_player_released_once() {
    let mut h = Harness::desktop().previewing(4).await.unwrap();
    h.session.play_preview().await.unwrap();
    assert!(h.engine.playback_sink().unwrap().complete());
    h.pump().await.unwrap();

    h.session.discard().await.unwrap();
    h.session.unmount().await;

    assert_eq!(h.engine.count("stop_player"), 1);
    assert_eq!(h.session.phase(), SessionPhase::Idle);
}

/// WHAT: Stopping a preview that never played leaves the engine alone
/// WHY: No player exists to release
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_unplayed_preview_when_discarding_then_player_untouched() {
    let mut h = Harness::desktop().previewing(4).await.unwrap();

    h.session.discard().await.unwrap();

    assert_eq!(h.engine.count("stop_player"), 0);
}

/// WHAT: The recording length is known before playback when the engine can
/// measure it
/// WHY: The preview can show 0:00 / m:ss right away
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_measuring_engine_when_stopped_then_preview_duration_known() {
    let mut h = Harness::desktop().recording().await.unwrap();
    h.engine.set_duration(9_250);

    h.session.stop().await.unwrap();

    assert_eq!(h.session.preview().unwrap().duration_ms(), 9_250);
}
