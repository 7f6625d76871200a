//! # MLP Common Types (mlp-common)
//!
//! Shared vocabulary for the micro-lesson player: audio clip descriptions,
//! playback lifecycle events, and the read-only playback state snapshot.
//!
//! The playback controller in `mlp-audio` owns all mutation; this crate only
//! defines the types that cross the boundary between the controller and its
//! consumers (UI, progress tracking, telemetry).

pub mod clip;
pub mod events;
pub mod state;

pub use clip::AudioClip;
pub use events::{PlaybackEvent, UNKNOWN_AUDIO_ID};
pub use state::{PlaybackState, REVEAL_THRESHOLD};
