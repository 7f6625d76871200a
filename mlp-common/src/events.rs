//! Event types for the playback event stream

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel audio id used when the clip id cannot be determined, e.g. an
/// error notice arriving after state has already been cleared.
pub const UNKNOWN_AUDIO_ID: &str = "unknown";

/// Playback lifecycle events emitted by the controller.
///
/// Events are immutable once constructed and are delivered to subscribers in
/// emission order. Consumers: UI play/stop rendering, progress credit,
/// telemetry sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlaybackEvent {
    /// An utterance was issued to the speech capability
    PlayStarted {
        audio_id: String,
        timestamp: DateTime<Utc>,
    },

    /// The speech capability reported genuine end-of-utterance
    PlayCompleted {
        audio_id: String,
        /// Whether the completed clip was the main line at completion time
        main_line: bool,
        /// Main-line play count after this completion
        play_count: u32,
        /// Reveal gate state after this completion
        can_reveal: bool,
        timestamp: DateTime<Utc>,
    },

    /// Playback was stopped before completion; never counts toward the gate
    PlayAborted {
        audio_id: String,
        timestamp: DateTime<Utc>,
    },

    /// The speech capability reported a synthesis failure.
    ///
    /// `audio_id` reflects the controller's current clip at the moment the
    /// error was observed, or [`UNKNOWN_AUDIO_ID`] if state was already
    /// cleared by a racing stop/reset.
    PlayError {
        audio_id: String,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// The main-line identity changed; play counts were reset
    MainLineChanged {
        /// The new main-line id
        audio_id: String,
        previous_main_line_id: String,
        play_count_reset: bool,
        timestamp: DateTime<Utc>,
    },
}

impl PlaybackEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            PlaybackEvent::PlayStarted { .. } => "PlayStarted",
            PlaybackEvent::PlayCompleted { .. } => "PlayCompleted",
            PlaybackEvent::PlayAborted { .. } => "PlayAborted",
            PlaybackEvent::PlayError { .. } => "PlayError",
            PlaybackEvent::MainLineChanged { .. } => "MainLineChanged",
        }
    }

    /// Audio id the event refers to
    pub fn audio_id(&self) -> &str {
        match self {
            PlaybackEvent::PlayStarted { audio_id, .. }
            | PlaybackEvent::PlayCompleted { audio_id, .. }
            | PlaybackEvent::PlayAborted { audio_id, .. }
            | PlaybackEvent::PlayError { audio_id, .. }
            | PlaybackEvent::MainLineChanged { audio_id, .. } => audio_id,
        }
    }
}
