//! Playback controller
//!
//! Coordinates the single in-flight utterance, the reveal-gate play counter,
//! and lifecycle event fan-out. One controller instance governs one lesson
//! session; every collaborator must share the same instance, since gate
//! correctness depends on all callers observing the same counters.

use crate::config::PlayerConfig;
use crate::error::{Error, Result};
use crate::speech::{self, SpeechNotice, SpeechSynthesizer, UtteranceRequest};
use chrono::Utc;
use mlp_common::{AudioClip, PlaybackEvent, PlaybackState, UNKNOWN_AUDIO_ID};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Synchronous event listener
pub type Listener = Box<dyn Fn(&PlaybackEvent) + Send>;

/// Capability to unregister a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(Uuid);

/// Mutable controller state, owned exclusively by the controller
struct Inner {
    is_playing: bool,
    current_audio_id: Option<String>,
    play_count: u32,
    main_line_id: String,
    error: Option<String>,
}

impl Inner {
    fn new(main_line_id: String) -> Self {
        Self {
            is_playing: false,
            current_audio_id: None,
            play_count: 0,
            main_line_id,
            error: None,
        }
    }
}

/// Audio playback and reveal-gate controller.
///
/// Public operations are synchronous and non-blocking: `play_audio` returns
/// once the utterance has been issued, and completion arrives later through
/// the speech capability's notice channel (pumped by [`start`], or fed
/// directly via [`handle_notice`]).
///
/// [`start`]: PlaybackController::start
/// [`handle_notice`]: PlaybackController::handle_notice
pub struct PlaybackController {
    engine: Arc<dyn SpeechSynthesizer>,
    config: PlayerConfig,
    inner: Mutex<Inner>,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    event_tx: broadcast::Sender<PlaybackEvent>,
    notice_tx: mpsc::UnboundedSender<SpeechNotice>,
    notice_rx: Mutex<Option<mpsc::UnboundedReceiver<SpeechNotice>>>,
}

impl PlaybackController {
    /// Create a controller using an explicit speech engine
    pub fn new(engine: Arc<dyn SpeechSynthesizer>, config: PlayerConfig) -> Self {
        let (event_tx, _) = broadcast::channel(100); // Buffer up to 100 events
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        let main_line_id = config.default_main_line_id.clone();
        Self {
            engine,
            config,
            inner: Mutex::new(Inner::new(main_line_id)),
            listeners: Mutex::new(Vec::new()),
            event_tx,
            notice_tx,
            notice_rx: Mutex::new(Some(notice_rx)),
        }
    }

    /// Create a controller with the engine named in the configuration.
    ///
    /// Fails with `CapabilityUnavailable` if no such engine exists in this
    /// host; that failure is fatal to the playback subsystem and not retried.
    pub fn with_default_engine(config: PlayerConfig) -> Result<Self> {
        let engine = speech::default_engine(&config)?;
        Ok(Self::new(engine, config))
    }

    /// Spawn the notice pump that feeds capability notices into the
    /// controller. Call once per controller after wrapping it in an `Arc`.
    pub fn start(self: Arc<Self>) {
        let Some(mut rx) = self.lock_notice_rx().take() else {
            warn!("Notice pump already started; ignoring");
            return;
        };
        let controller = self;
        tokio::spawn(async move {
            while let Some(notice) = rx.recv().await {
                controller.handle_notice(notice);
            }
            debug!("Notice pump finished");
        });
        info!("Playback controller started");
    }

    /// Play a clip, stopping any clip already in flight first.
    ///
    /// Replaying the clip that is currently playing restarts it (the in-flight
    /// utterance is aborted like any other). `PreRecorded` clips fail with
    /// `UnsupportedClipKind`: no event is emitted and no state changes.
    pub fn play_audio(&self, clip: &AudioClip) -> Result<()> {
        let (id, text, language, volume) = match clip {
            AudioClip::PreRecorded { id, .. } => {
                return Err(Error::UnsupportedClipKind(format!(
                    "clip '{}' is pre_recorded; only synthesized_speech playback is implemented",
                    id
                )));
            }
            AudioClip::SynthesizedSpeech { id, text, language, volume, .. } => {
                (id.clone(), text.clone(), language.clone(), *volume)
            }
        };

        // Single-stream invariant: at most one clip audible at any instant
        self.stop_audio();

        let request = UtteranceRequest {
            utterance_id: id.clone(),
            text,
            language,
            rate: self.config.speech.rate,
            pitch: self.config.speech.pitch,
            volume,
        };
        self.engine
            .speak(request, self.notice_tx.clone())
            .map_err(|e| Error::Playback(format!("failed to issue utterance '{}': {}", id, e)))?;

        {
            let mut inner = self.lock_inner();
            inner.current_audio_id = Some(id.clone());
            inner.is_playing = true;
            inner.error = None;
        }

        debug!("Utterance '{}' issued", id);
        self.emit(PlaybackEvent::PlayStarted {
            audio_id: id,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Stop the in-flight utterance. Idempotent: calling while idle is a
    /// no-op with no event. An abort never counts toward the reveal gate.
    pub fn stop_audio(&self) {
        let aborted = {
            let mut inner = self.lock_inner();
            if inner.is_playing {
                self.engine.cancel();
                inner.is_playing = false;
                // current_audio_id is kept for inspection
                inner.current_audio_id.clone()
            } else {
                None
            }
        };

        if let Some(audio_id) = aborted {
            debug!("Utterance '{}' aborted", audio_id);
            self.emit(PlaybackEvent::PlayAborted {
                audio_id,
                timestamp: Utc::now(),
            });
        }
    }

    /// Process a terminal notice from the speech capability.
    ///
    /// Normally invoked by the notice pump; tests may call it directly to
    /// drive interleavings deterministically.
    pub fn handle_notice(&self, notice: SpeechNotice) {
        match notice {
            SpeechNotice::Ended { utterance_id } => self.on_utterance_ended(utterance_id),
            SpeechNotice::Failed { utterance_id, message } => {
                self.on_utterance_failed(utterance_id, message)
            }
        }
    }

    fn on_utterance_ended(&self, utterance_id: String) {
        let event = {
            let mut inner = self.lock_inner();
            // A notice for anything but the live utterance is stale: the clip
            // was stopped or replaced after the engine queued its report.
            if !inner.is_playing || inner.current_audio_id.as_deref() != Some(utterance_id.as_str())
            {
                debug!("Ignoring stale end notice for '{}'", utterance_id);
                return;
            }
            inner.is_playing = false;

            let main_line = inner.main_line_id == utterance_id;
            if main_line {
                inner.play_count += 1;
            }
            PlaybackEvent::PlayCompleted {
                audio_id: utterance_id,
                main_line,
                play_count: inner.play_count,
                can_reveal: PlaybackState::reveal_gate_open(inner.play_count),
                timestamp: Utc::now(),
            }
        };

        debug!("Utterance '{}' completed", event.audio_id());
        self.emit(event);
    }

    fn on_utterance_failed(&self, utterance_id: String, message: String) {
        let diagnostic = format!("Synthesis failed for '{}': {}", utterance_id, message);
        warn!("{}", diagnostic);

        let event = {
            let mut inner = self.lock_inner();
            inner.is_playing = false;
            inner.error = Some(diagnostic.clone());

            // The event carries whatever the controller considers current at
            // the moment the error is observed; a racing stop/reset may have
            // cleared it already.
            let audio_id = inner
                .current_audio_id
                .clone()
                .unwrap_or_else(|| UNKNOWN_AUDIO_ID.to_string());
            PlaybackEvent::PlayError {
                audio_id,
                message: diagnostic,
                timestamp: Utc::now(),
            }
        };

        self.emit(event);
    }

    /// Change which clip's completions count toward the reveal gate.
    ///
    /// Setting the id already in effect is a no-op with no event; otherwise
    /// the play count resets and one `MainLineChanged` event is emitted.
    pub fn set_main_line_audio_id(&self, id: &str) {
        let event = {
            let mut inner = self.lock_inner();
            if inner.main_line_id == id {
                return;
            }
            let previous = std::mem::replace(&mut inner.main_line_id, id.to_string());
            inner.play_count = 0;
            info!("Main line changed: '{}' -> '{}'", previous, id);
            PlaybackEvent::MainLineChanged {
                audio_id: id.to_string(),
                previous_main_line_id: previous,
                play_count_reset: true,
                timestamp: Utc::now(),
            }
        };

        self.emit(event);
    }

    /// Current main-line clip id
    pub fn main_line_audio_id(&self) -> String {
        self.lock_inner().main_line_id.clone()
    }

    /// Return the controller to its initial state, restoring the default
    /// main-line id. Any in-flight utterance is cancelled. Used when a
    /// learner restarts a lesson; emits no event.
    pub fn reset_playback(&self) {
        self.engine.cancel();
        let mut inner = self.lock_inner();
        *inner = Inner::new(self.config.default_main_line_id.clone());
        info!("Playback reset");
    }

    /// Immutable snapshot of the current playback state
    pub fn current_state(&self) -> PlaybackState {
        let inner = self.lock_inner();
        PlaybackState {
            is_playing: inner.is_playing,
            current_audio_id: inner.current_audio_id.clone(),
            play_count: inner.play_count,
            can_reveal: PlaybackState::reveal_gate_open(inner.play_count),
            error: inner.error.clone(),
        }
    }

    /// Register a listener invoked synchronously, in registration order, for
    /// every emitted event. Returns the capability to unregister it.
    ///
    /// The registry lock is held during dispatch, so listeners must not
    /// subscribe or unsubscribe from inside the callback.
    pub fn subscribe(&self, listener: impl Fn(&PlaybackEvent) + Send + 'static) -> ListenerId {
        let id = ListenerId(Uuid::new_v4());
        self.lock_listeners().push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; returns false if it was already gone
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock_listeners();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// Subscribe to the event stream for async consumers (telemetry, UI)
    pub fn events(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.event_tx.subscribe()
    }

    /// Deliver an event to the broadcast stream and every listener.
    ///
    /// A panicking listener is isolated so it cannot block delivery to the
    /// listeners registered after it.
    fn emit(&self, event: PlaybackEvent) {
        // Ignore send errors (no receivers is OK)
        let _ = self.event_tx.send(event.clone());

        let listeners = self.lock_listeners();
        for (id, listener) in listeners.iter() {
            if catch_unwind(AssertUnwindSafe(|| listener(&event))).is_err() {
                warn!("Playback listener {:?} panicked on {}; continuing delivery", id, event.event_type());
            }
        }
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Vec<(ListenerId, Listener)>> {
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_notice_rx(&self) -> MutexGuard<'_, Option<mpsc::UnboundedReceiver<SpeechNotice>>> {
        self.notice_rx.lock().unwrap_or_else(|e| e.into_inner())
    }
}
