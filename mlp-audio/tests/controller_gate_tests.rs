//! Reveal-gate scenarios driven end to end through the notice pump
//!
//! Each test builds a real controller wired to the scripted `FakeSpeech`
//! engine, starts the pump on the tokio runtime, and observes outcomes via
//! the broadcast event stream plus state snapshots.

mod helpers;

use helpers::FakeSpeech;
use mlp_audio::{PlaybackController, PlayerConfig};
use mlp_common::{AudioClip, PlaybackEvent, PlaybackState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

fn session() -> (Arc<PlaybackController>, Arc<FakeSpeech>) {
    let engine = Arc::new(FakeSpeech::new());
    let controller = Arc::new(PlaybackController::new(
        engine.clone(),
        PlayerConfig::default(),
    ));
    Arc::clone(&controller).start();
    (controller, engine)
}

fn main_clip() -> AudioClip {
    AudioClip::synthesized("main-line", "Hola, buenos dias", "es-MX", 2.0, 1.0)
}

fn phrase_clip() -> AudioClip {
    AudioClip::synthesized("phrase-1", "buenos dias", "es-MX", 1.0, 0.9)
}

async fn next_event(rx: &mut broadcast::Receiver<PlaybackEvent>) -> PlaybackEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event stream closed")
}

async fn expect_event(rx: &mut broadcast::Receiver<PlaybackEvent>, event_type: &str) -> PlaybackEvent {
    let event = next_event(rx).await;
    assert_eq!(event.event_type(), event_type, "unexpected event: {:?}", event);
    event
}

#[tokio::test]
async fn test_two_full_main_line_plays_open_gate() {
    let (ctl, engine) = session();
    let mut rx = ctl.events();

    // First play
    ctl.play_audio(&main_clip()).unwrap();
    expect_event(&mut rx, "PlayStarted").await;
    engine.complete("main-line");
    let completed = expect_event(&mut rx, "PlayCompleted").await;
    match completed {
        PlaybackEvent::PlayCompleted { main_line, play_count, can_reveal, .. } => {
            assert!(main_line);
            assert_eq!(play_count, 1);
            assert!(!can_reveal);
        }
        _ => unreachable!(),
    }
    let state = ctl.current_state();
    assert_eq!(state.play_count, 1);
    assert!(!state.can_reveal);

    // Second play
    ctl.play_audio(&main_clip()).unwrap();
    expect_event(&mut rx, "PlayStarted").await;
    engine.complete("main-line");
    let completed = expect_event(&mut rx, "PlayCompleted").await;
    match completed {
        PlaybackEvent::PlayCompleted { play_count, can_reveal, .. } => {
            assert_eq!(play_count, 2);
            assert!(can_reveal);
        }
        _ => unreachable!(),
    }
    let state = ctl.current_state();
    assert_eq!(state.play_count, 2);
    assert!(state.can_reveal, "gate opens on exactly the second completion");
}

#[tokio::test]
async fn test_phrase_play_does_not_affect_gate() {
    let (ctl, engine) = session();
    let mut rx = ctl.events();

    ctl.play_audio(&main_clip()).unwrap();
    expect_event(&mut rx, "PlayStarted").await;
    engine.complete("main-line");
    expect_event(&mut rx, "PlayCompleted").await;
    assert_eq!(ctl.current_state().play_count, 1);

    ctl.play_audio(&phrase_clip()).unwrap();
    expect_event(&mut rx, "PlayStarted").await;
    engine.complete("phrase-1");
    let completed = expect_event(&mut rx, "PlayCompleted").await;
    match completed {
        PlaybackEvent::PlayCompleted { main_line, .. } => assert!(!main_line),
        _ => unreachable!(),
    }

    let state = ctl.current_state();
    assert_eq!(state.play_count, 1, "phrase completion must not count");
    assert!(!state.can_reveal);
}

#[tokio::test]
async fn test_abort_leaves_play_count_unchanged() {
    let (ctl, engine) = session();
    let mut rx = ctl.events();

    ctl.play_audio(&main_clip()).unwrap();
    expect_event(&mut rx, "PlayStarted").await;

    ctl.stop_audio();
    let aborted = expect_event(&mut rx, "PlayAborted").await;
    assert_eq!(aborted.audio_id(), "main-line");
    assert_eq!(engine.issued_ids(), vec!["main-line"]);
    assert_eq!(engine.cancel_count(), 1);

    let state = ctl.current_state();
    assert!(!state.is_playing);
    assert_eq!(state.play_count, 0);
    assert!(!state.can_reveal);
}

#[tokio::test]
async fn test_error_then_reset_restores_default_snapshot() {
    let (ctl, engine) = session();
    let mut rx = ctl.events();

    ctl.play_audio(&main_clip()).unwrap();
    expect_event(&mut rx, "PlayStarted").await;
    engine.fail("main-line", "voice model crashed");
    let error_event = expect_event(&mut rx, "PlayError").await;
    assert_eq!(error_event.audio_id(), "main-line");

    let state = ctl.current_state();
    assert!(state.error.is_some());
    assert_eq!(state.play_count, 0, "errors never count toward the gate");
    assert!(!state.can_reveal);

    ctl.reset_playback();
    assert_eq!(ctl.current_state(), PlaybackState::default());
}

#[tokio::test]
async fn test_identity_change_mid_session_resets_gate() {
    let (ctl, engine) = session();
    let mut rx = ctl.events();

    ctl.set_main_line_audio_id("A");
    expect_event(&mut rx, "MainLineChanged").await;

    ctl.play_audio(&AudioClip::synthesized("A", "hola", "es-MX", 1.0, 1.0))
        .unwrap();
    expect_event(&mut rx, "PlayStarted").await;
    engine.complete("A");
    expect_event(&mut rx, "PlayCompleted").await;
    assert_eq!(ctl.current_state().play_count, 1);

    ctl.set_main_line_audio_id("B");
    let changed = expect_event(&mut rx, "MainLineChanged").await;
    match changed {
        PlaybackEvent::MainLineChanged { audio_id, previous_main_line_id, play_count_reset, .. } => {
            assert_eq!(audio_id, "B");
            assert_eq!(previous_main_line_id, "A");
            assert!(play_count_reset);
        }
        _ => unreachable!(),
    }

    let state = ctl.current_state();
    assert_eq!(state.play_count, 0);
    assert!(!state.can_reveal);
}

#[tokio::test]
async fn test_completions_before_identity_change_do_not_leak() {
    let (ctl, engine) = session();
    let mut rx = ctl.events();

    // Two completions of the old main line open the gate
    for _ in 0..2 {
        ctl.play_audio(&main_clip()).unwrap();
        expect_event(&mut rx, "PlayStarted").await;
        engine.complete("main-line");
        expect_event(&mut rx, "PlayCompleted").await;
    }
    assert!(ctl.current_state().can_reveal);

    // Switching lessons relocks the gate; old completions count for nothing
    ctl.set_main_line_audio_id("lesson-2-main");
    expect_event(&mut rx, "MainLineChanged").await;
    assert!(!ctl.current_state().can_reveal);

    // One completion of the new main line is not enough
    ctl.play_audio(&AudioClip::synthesized("lesson-2-main", "adios", "es-MX", 1.0, 1.0))
        .unwrap();
    expect_event(&mut rx, "PlayStarted").await;
    engine.complete("lesson-2-main");
    expect_event(&mut rx, "PlayCompleted").await;

    let state = ctl.current_state();
    assert_eq!(state.play_count, 1);
    assert!(!state.can_reveal);
}
