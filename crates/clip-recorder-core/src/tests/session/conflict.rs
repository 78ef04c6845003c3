use crate::{
    AppLifecycle, AudioFocusChange, AudioSessionInterruption, InterruptionSignal, Notice,
    SessionError, SessionEvent, SessionPhase,
    tests::support::{Harness, START_MS, temp_path_at},
};

use std::time::Duration;

const FOCUS_LOSS: InterruptionSignal = InterruptionSignal::AudioFocus(AudioFocusChange::Loss);

/// WHAT: A conflict while recording stops and keeps the partial take
/// WHY: Another app took the microphone; the user keeps what was captured
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_microphone_lost_then_previewing_partial_take() {
    // Given: 7 seconds recorded
    let mut h = Harness::desktop().recording().await.unwrap();
    h.clock.advance_secs(7);

    // When: Focus is lost
    h.session
        .handle_event(SessionEvent::Interruption(FOCUS_LOSS))
        .await
        .unwrap();

    // Then: Previewing the temp file with the conflict flag set
    assert_eq!(h.session.phase(), SessionPhase::Previewing);
    assert!(h.session.mic_conflict_active());
    assert!(h.session.is_previewable());
    assert_eq!(
        h.session.temp_file_path(),
        Some(temp_path_at(START_MS).as_path())
    );
    assert!(!h.session.timer_active());
    let take = h.session.take().unwrap();
    assert!(take.interrupted);
    assert_eq!(take.recorded_secs, 7);
    assert_eq!(h.notifier.last(), Some(Notice::PartialRecordingPreserved));
}

/// WHAT: Interruptions delivered through the engine sink reach the session
/// WHY: The listener registered at mount is the native conflict path
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_engine_interruption_when_pumped_then_session_stops() {
    let mut h = Harness::desktop().recording().await.unwrap();

    let delivered = h.engine.interrupt(InterruptionSignal::AudioSession(
        AudioSessionInterruption::Began,
    ));
    h.pump().await.unwrap();

    assert!(delivered);
    assert_eq!(h.session.phase(), SessionPhase::Previewing);
    assert!(h.session.mic_conflict_active());
}

/// WHAT: A conflict while paused is ignored
/// WHY: A paused take has already released the microphone
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_paused_when_microphone_lost_then_still_paused() {
    let mut h = Harness::desktop().recording().await.unwrap();
    h.session.pause().await.unwrap();
    let notices_before = h.notifier.notices().len();

    h.session
        .handle_event(SessionEvent::Interruption(FOCUS_LOSS))
        .await
        .unwrap();

    assert_eq!(h.session.phase(), SessionPhase::Paused);
    assert!(!h.session.mic_conflict_active());
    assert_eq!(h.engine.count("stop_recorder"), 0);
    assert_eq!(h.notifier.notices().len(), notices_before);
}

/// WHAT: The microphone coming back clears the conflict flag
/// WHY: The user is told a new recording is possible
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_conflict_active_when_focus_regained_then_flag_cleared() {
    let mut h = Harness::desktop().recording().await.unwrap();
    h.session
        .handle_event(SessionEvent::Interruption(FOCUS_LOSS))
        .await
        .unwrap();

    h.session
        .handle_event(SessionEvent::Interruption(InterruptionSignal::AudioFocus(
            AudioFocusChange::Gain,
        )))
        .await
        .unwrap();

    assert!(!h.session.mic_conflict_active());
    assert_eq!(h.notifier.last(), Some(Notice::MicrophoneAvailable));
    assert_eq!(h.session.phase(), SessionPhase::Previewing);
}

/// WHAT: Ducking requests do not stop recording
/// WHY: Lowering volume for a moment takes nothing from the microphone
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_can_duck_focus_loss_then_still_recording() {
    let mut h = Harness::desktop().recording().await.unwrap();

    h.session
        .handle_event(SessionEvent::Interruption(InterruptionSignal::AudioFocus(
            AudioFocusChange::LossTransientCanDuck,
        )))
        .await
        .unwrap();

    assert_eq!(h.session.phase(), SessionPhase::Recording);
}

/// WHAT: A recorder that fails to stop on conflict still leaves a preview
/// WHY: The partial file is kept whatever the engine reports
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_failing_stop_when_microphone_lost_then_previewing_with_flag() {
    let mut h = Harness::desktop().recording().await.unwrap();
    h.engine.fail("stop_recorder");

    let result = h
        .session
        .handle_event(SessionEvent::Interruption(FOCUS_LOSS))
        .await;

    assert!(matches!(result, Err(SessionError::EngineStopFailure { .. })));
    assert_eq!(h.session.phase(), SessionPhase::Previewing);
    assert!(h.session.mic_conflict_active());
    assert!(h.notifier.contains(&Notice::PartialRecordingPreserved));
}

/// WHAT: Heuristic conflict fires when still backgrounded after the grace delay
/// WHY: Hosts without interruption events still need to save the take
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_heuristic_host_when_background_outlasts_grace_then_partial_take_kept() {
    // Given: Recording on a heuristic host, then backgrounded
    let mut h = Harness::heuristic().recording().await.unwrap();
    h.session
        .handle_event(SessionEvent::AppState(AppLifecycle::Background))
        .await
        .unwrap();

    // When: The grace delay runs out
    tokio::time::sleep(Duration::from_millis(1_001)).await;
    h.pump().await.unwrap();

    // Then: Treated as a conflict
    assert_eq!(h.session.phase(), SessionPhase::Previewing);
    assert!(h.session.mic_conflict_active());
    assert!(!h.session.conflict_check_pending());
}

/// WHAT: Resuming while already backgrounded arms the grace delay
/// WHY: No background transition follows, so resume must start the check
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_heuristic_host_when_resumed_in_background_then_partial_take_kept() {
    // Given: A paused take on a heuristic host, then backgrounded
    let mut h = Harness::heuristic().recording().await.unwrap();
    h.session.pause().await.unwrap();
    h.session
        .handle_event(SessionEvent::AppState(AppLifecycle::Background))
        .await
        .unwrap();
    assert!(!h.session.conflict_check_pending());

    // When: Resumed from the background and the grace delay runs out
    h.session.resume().await.unwrap();
    assert!(h.session.conflict_check_pending());
    tokio::time::sleep(Duration::from_millis(1_001)).await;
    h.pump().await.unwrap();

    // Then: Treated as a conflict
    assert_eq!(h.session.phase(), SessionPhase::Previewing);
    assert!(h.session.mic_conflict_active());
}

/// WHAT: Starting while already backgrounded arms the grace delay
/// WHY: A take started from the background gets the same conflict check
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_heuristic_host_when_started_in_background_then_partial_take_kept() {
    let mut h = Harness::heuristic();
    h.session
        .handle_event(SessionEvent::AppState(AppLifecycle::Background))
        .await
        .unwrap();

    h.session.start_recording().await.unwrap();
    assert!(h.session.conflict_check_pending());
    tokio::time::sleep(Duration::from_millis(1_001)).await;
    h.pump().await.unwrap();

    assert_eq!(h.session.phase(), SessionPhase::Previewing);
    assert!(h.session.mic_conflict_active());
}

/// WHAT: Hosts with native interruptions never arm the grace delay
/// WHY: Backgrounding alone is not a conflict there
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_native_host_when_resumed_in_background_then_no_conflict_check() {
    let mut h = Harness::desktop().recording().await.unwrap();
    h.session.pause().await.unwrap();
    h.session
        .handle_event(SessionEvent::AppState(AppLifecycle::Background))
        .await
        .unwrap();

    h.session.resume().await.unwrap();

    assert!(!h.session.conflict_check_pending());
    assert_eq!(h.session.phase(), SessionPhase::Recording);
}

/// WHAT: A grace expiry after returning to the foreground is ignored
/// WHY: A quick trip to the background is not a conflict
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_returned_to_foreground_when_grace_event_arrives_then_still_recording() {
    let mut h = Harness::heuristic().recording().await.unwrap();
    h.session
        .handle_event(SessionEvent::AppState(AppLifecycle::Background))
        .await
        .unwrap();
    h.session
        .handle_event(SessionEvent::AppState(AppLifecycle::Active))
        .await
        .unwrap();

    h.session
        .handle_event(SessionEvent::ConflictGraceElapsed)
        .await
        .unwrap();

    assert_eq!(h.session.phase(), SessionPhase::Recording);
    assert!(!h.session.mic_conflict_active());
}

/// WHAT: Unmount releases the interruption listener and every timer
/// WHY: Nothing may call back into a torn-down session
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_session_when_unmounted_then_listeners_and_timers_released() {
    // Given: A recording session with the interruption listener registered
    let mut h = Harness::desktop().recording().await.unwrap();
    assert!(h.session.listening_for_interruptions());
    assert_eq!(h.engine.active_listeners(), 1);

    // When: Unmounting
    h.session.unmount().await;

    // Then: Recorder stopped, listener gone, Idle
    assert_eq!(h.engine.calls().last(), Some(&"stop_recorder"));
    assert!(!h.session.listening_for_interruptions());
    assert_eq!(h.engine.active_listeners(), 0);
    assert!(!h.engine.interrupt(FOCUS_LOSS));
    assert!(!h.session.timer_active());
    assert_eq!(h.session.phase(), SessionPhase::Idle);
}
