//! mlp-audio specific configuration

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Playback controller configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Speech engine to use ("simulated" is the only in-repo engine;
    /// platform engines are wired in by the host)
    pub engine: String,

    /// Main-line clip id restored by `reset_playback`
    pub default_main_line_id: String,

    /// Synthesis parameters applied to every utterance
    pub speech: SpeechParams,
}

/// Utterance-level synthesis parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechParams {
    /// Speaking rate multiplier (1.0 = engine default)
    pub rate: f32,

    /// Pitch multiplier (1.0 = engine default)
    pub pitch: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            engine: "simulated".to_string(),
            default_main_line_id: "main-line".to_string(),
            speech: SpeechParams::default(),
        }
    }
}

impl Default for SpeechParams {
    fn default() -> Self {
        Self { rate: 1.0, pitch: 1.0 }
    }
}

impl PlayerConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}
