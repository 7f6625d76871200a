//! Audio clip descriptions supplied by lesson content

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// An audio clip embedded in a lesson or phrase record.
///
/// The playback controller only knows how to execute `SynthesizedSpeech`;
/// presenting a `PreRecorded` clip is rejected at the call site rather than
/// silently ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AudioClip {
    /// Text-to-speech clip rendered by the speech capability
    SynthesizedSpeech {
        id: String,
        /// Advisory duration in seconds (not enforced)
        duration_secs: f64,
        /// Playback volume, 0.0-1.0
        volume: f32,
        /// Utterance text handed to the synthesizer
        text: String,
        /// BCP-47 language tag, e.g. "es-MX"
        language: String,
    },

    /// Pre-recorded clip referenced by file (playback unimplemented)
    PreRecorded {
        id: String,
        duration_secs: f64,
        volume: f32,
        file_path: PathBuf,
    },
}

impl AudioClip {
    /// Create a synthesized-speech clip with volume clamped to 0.0-1.0
    pub fn synthesized(
        id: impl Into<String>,
        text: impl Into<String>,
        language: impl Into<String>,
        duration_secs: f64,
        volume: f32,
    ) -> Self {
        AudioClip::SynthesizedSpeech {
            id: id.into(),
            duration_secs,
            volume: volume.clamp(0.0, 1.0),
            text: text.into(),
            language: language.into(),
        }
    }

    /// Create a pre-recorded clip with volume clamped to 0.0-1.0
    pub fn pre_recorded(
        id: impl Into<String>,
        file_path: impl Into<PathBuf>,
        duration_secs: f64,
        volume: f32,
    ) -> Self {
        AudioClip::PreRecorded {
            id: id.into(),
            duration_secs,
            volume: volume.clamp(0.0, 1.0),
            file_path: file_path.into(),
        }
    }

    /// Unique clip id
    pub fn id(&self) -> &str {
        match self {
            AudioClip::SynthesizedSpeech { id, .. } => id,
            AudioClip::PreRecorded { id, .. } => id,
        }
    }

    /// Advisory duration in seconds
    pub fn duration_secs(&self) -> f64 {
        match self {
            AudioClip::SynthesizedSpeech { duration_secs, .. } => *duration_secs,
            AudioClip::PreRecorded { duration_secs, .. } => *duration_secs,
        }
    }

    /// Playback volume (0.0-1.0)
    pub fn volume(&self) -> f32 {
        match self {
            AudioClip::SynthesizedSpeech { volume, .. } => *volume,
            AudioClip::PreRecorded { volume, .. } => *volume,
        }
    }

    /// Clip kind as string for diagnostics
    pub fn kind(&self) -> &str {
        match self {
            AudioClip::SynthesizedSpeech { .. } => "synthesized_speech",
            AudioClip::PreRecorded { .. } => "pre_recorded",
        }
    }
}
