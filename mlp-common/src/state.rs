//! Playback state snapshot exposed to controller consumers

use serde::{Deserialize, Serialize};

/// Number of verified-complete main-line plays required to open the reveal gate
pub const REVEAL_THRESHOLD: u32 = 2;

/// Read-only snapshot of the playback controller's state.
///
/// Returned by value from `PlaybackController::current_state`; callers can
/// never mutate controller internals through it. `can_reveal` is derived from
/// `play_count` at snapshot time and is never set independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Whether an utterance is currently in flight
    pub is_playing: bool,

    /// Id of the clip currently (or most recently) playing, None when idle
    pub current_audio_id: Option<String>,

    /// Verified-complete plays of the main line since it was last set or reset
    pub play_count: u32,

    /// True iff `play_count >= REVEAL_THRESHOLD`
    pub can_reveal: bool,

    /// Last playback error message, cleared on next successful play start
    pub error: Option<String>,
}

impl PlaybackState {
    /// Derive the reveal gate from a play count
    pub fn reveal_gate_open(play_count: u32) -> bool {
        play_count >= REVEAL_THRESHOLD
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_audio_id: None,
            play_count: 0,
            can_reveal: false,
            error: None,
        }
    }
}
