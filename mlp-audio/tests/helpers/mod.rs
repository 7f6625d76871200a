//! Shared test infrastructure: scripted speech engine
//!
//! `FakeSpeech` accepts every utterance and lets the test decide when (and
//! how) each one terminates, so interleavings of completions, failures, and
//! cancellations can be driven deterministically through the controller's
//! notice pump.

use mlp_audio::{Result, SpeechNotice, SpeechSynthesizer, UtteranceRequest};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;

pub struct FakeSpeech {
    issued: Mutex<Vec<(UtteranceRequest, UnboundedSender<SpeechNotice>)>>,
    cancels: AtomicUsize,
}

impl FakeSpeech {
    pub fn new() -> Self {
        Self {
            issued: Mutex::new(Vec::new()),
            cancels: AtomicUsize::new(0),
        }
    }

    /// Ids of all utterances issued so far, in order
    pub fn issued_ids(&self) -> Vec<String> {
        self.issued
            .lock()
            .unwrap()
            .iter()
            .map(|(r, _)| r.utterance_id.clone())
            .collect()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    /// Report genuine end-of-utterance for the most recent issue of `id`
    pub fn complete(&self, id: &str) {
        self.send(id, SpeechNotice::Ended { utterance_id: id.to_string() });
    }

    /// Report a synthesis failure for the most recent issue of `id`
    pub fn fail(&self, id: &str, message: &str) {
        self.send(
            id,
            SpeechNotice::Failed {
                utterance_id: id.to_string(),
                message: message.to_string(),
            },
        );
    }

    fn send(&self, id: &str, notice: SpeechNotice) {
        let issued = self.issued.lock().unwrap();
        let (_, sender) = issued
            .iter()
            .rev()
            .find(|(r, _)| r.utterance_id == id)
            .unwrap_or_else(|| panic!("No utterance '{}' was issued", id));
        sender.send(notice).expect("notice channel closed");
    }
}

impl SpeechSynthesizer for FakeSpeech {
    fn speak(&self, request: UtteranceRequest, notices: UnboundedSender<SpeechNotice>) -> Result<()> {
        self.issued.lock().unwrap().push((request, notices));
        Ok(())
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}
