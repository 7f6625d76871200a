//! Speech capability seam
//!
//! The text-to-speech engine is an opaque external capability: it accepts an
//! utterance request, reports end/failure asynchronously, and supports
//! cancellation of the active utterance. The controller talks to it through
//! the [`SpeechSynthesizer`] trait; terminal notices flow back over an mpsc
//! channel so they can be pumped on the session's runtime.

use crate::config::PlayerConfig;
use crate::error::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// A single utterance handed to the speech capability
#[derive(Debug, Clone)]
pub struct UtteranceRequest {
    /// Clip id, echoed back in the terminal notice
    pub utterance_id: String,
    pub text: String,
    /// BCP-47 language tag
    pub language: String,
    /// Speaking rate multiplier
    pub rate: f32,
    /// Pitch multiplier
    pub pitch: f32,
    /// Volume, 0.0-1.0
    pub volume: f32,
}

/// Terminal notice reported by the speech capability.
///
/// Exactly one notice is delivered per issued utterance, unless the
/// utterance was cancelled first.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechNotice {
    /// Genuine end-of-utterance
    Ended { utterance_id: String },

    /// Synthesis failed after the request was accepted
    Failed { utterance_id: String, message: String },
}

/// Abstraction over the host text-to-speech engine.
///
/// `speak` must not block until audio finishes; it returns once the request
/// has been accepted. `cancel` is idempotent and affects only the currently
/// active utterance.
pub trait SpeechSynthesizer: Send + Sync {
    /// Issue an utterance. The terminal notice is delivered on `notices`.
    fn speak(&self, request: UtteranceRequest, notices: UnboundedSender<SpeechNotice>) -> Result<()>;

    /// Cancel the active utterance, suppressing its terminal notice
    fn cancel(&self);
}

/// Timer-driven synthesizer for the demo binary and smoke tests.
///
/// "Synthesis" is a tokio sleep sized from the text length; no audio is
/// produced. Cancellation bumps a generation counter, and a timer only
/// delivers its notice if the generation is unchanged when it fires.
pub struct SimulatedSynthesizer {
    generation: Arc<AtomicU64>,
    /// Simulated speaking speed, characters per second
    chars_per_sec: f64,
}

impl SimulatedSynthesizer {
    pub fn new() -> Self {
        Self::with_chars_per_sec(15.0)
    }

    /// Override the simulated speaking speed (tests use high values)
    pub fn with_chars_per_sec(chars_per_sec: f64) -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            chars_per_sec,
        }
    }

    fn utterance_duration(&self, request: &UtteranceRequest) -> Duration {
        let rate = f64::from(request.rate.max(0.1));
        let secs = request.text.chars().count() as f64 / (self.chars_per_sec * rate);
        Duration::from_secs_f64(secs.max(0.01))
    }
}

impl Default for SimulatedSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechSynthesizer for SimulatedSynthesizer {
    fn speak(&self, request: UtteranceRequest, notices: UnboundedSender<SpeechNotice>) -> Result<()> {
        let generation = self.generation.load(Ordering::SeqCst);
        let duration = self.utterance_duration(&request);

        debug!(
            "Simulating utterance '{}' ({} chars, {:?})",
            request.utterance_id,
            request.text.chars().count(),
            duration
        );

        let counter = Arc::clone(&self.generation);
        let utterance_id = request.utterance_id;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            // A cancel() since speak() invalidates this timer's notice
            if counter.load(Ordering::SeqCst) == generation {
                let _ = notices.send(SpeechNotice::Ended { utterance_id });
            } else {
                debug!("Utterance '{}' was cancelled; dropping notice", utterance_id);
            }
        });

        Ok(())
    }

    fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Select a speech engine by configured name.
///
/// Unknown engine names are fatal: the whole playback subsystem is unusable
/// without a capability, so this is surfaced once and never retried.
pub fn default_engine(config: &PlayerConfig) -> Result<Arc<dyn SpeechSynthesizer>> {
    match config.engine.as_str() {
        "simulated" => Ok(Arc::new(SimulatedSynthesizer::new())),
        other => Err(Error::CapabilityUnavailable(format!(
            "no speech engine named '{}' in this host",
            other
        ))),
    }
}
