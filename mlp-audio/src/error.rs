//! Error types for mlp-audio
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation.

use thiserror::Error;

/// Main error type for the mlp-audio crate
#[derive(Error, Debug)]
pub enum Error {
    /// No speech capability could be located in the host environment.
    /// Fatal to the playback subsystem, not retried.
    #[error("Speech capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// The clip kind cannot be executed (pre-recorded playback is a
    /// deliberate contract violation, not a missing feature)
    #[error("Unsupported clip kind: {0}")]
    UnsupportedClipKind(String),

    /// The speech capability failed to accept an utterance request
    #[error("Playback error: {0}")]
    Playback(String),

    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using the mlp-audio Error
pub type Result<T> = std::result::Result<T, Error>;
