//! # MLP Audio Playback Library (mlp-audio)
//!
//! Audio playback and reveal-gate controller for the micro-lesson player.
//!
//! **Purpose:** Serialize text-to-speech playback through an external speech
//! capability, count verified-complete plays of the lesson's main line, and
//! open the text-reveal gate after the completion threshold. Lifecycle events
//! fan out to UI, progress, and telemetry consumers.
//!
//! **Architecture:** One explicitly constructed [`PlaybackController`] per
//! lesson session; the speech capability reports terminal notices over a
//! channel pumped on the session's tokio runtime.
//!
//! [`PlaybackController`]: controller::PlaybackController

pub mod config;
pub mod controller;
pub mod error;
pub mod speech;

pub use config::PlayerConfig;
pub use controller::{ListenerId, PlaybackController};
pub use error::{Error, Result};
pub use speech::{SpeechNotice, SpeechSynthesizer, UtteranceRequest};
