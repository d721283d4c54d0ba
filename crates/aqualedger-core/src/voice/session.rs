//! Listening session state machine

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;

use super::{RecognitionEvent, SpeechRecognizer, VoiceError};
use crate::events::{EventSink, LedgerEvent, NoopSink};

/// Where a session is in `idle → listening → result | cancelled | errored`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Listening,
    /// The session ended with or without a transcript
    Result,
    Cancelled,
    Errored,
}

/// How a listening session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceOutcome {
    Transcript(String),
    /// The recognizer ended without hearing anything usable
    NoSpeech,
    Cancelled,
}

/// Caller-owned listening session over a recognizer
pub struct VoiceSession<R> {
    recognizer: R,
    state: SessionState,
    events: Arc<dyn EventSink>,
}

impl<R: SpeechRecognizer + Send> VoiceSession<R> {
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer,
            state: SessionState::Idle,
            events: Arc::new(NoopSink),
        }
    }

    #[must_use]
    pub fn with_events(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Listen until a final transcript arrives, the recognizer ends, or
    /// `cancel` resolves.
    ///
    /// Interim results are ignored and only the first non-empty final
    /// transcript is returned; the recognizer is stopped right after it.
    pub async fn listen(
        &mut self,
        cancel: impl Future<Output = ()>,
    ) -> Result<VoiceOutcome, VoiceError> {
        if let Err(error) = self.recognizer.start() {
            self.state = SessionState::Errored;
            return Err(error);
        }
        self.state = SessionState::Listening;
        self.events.emit(LedgerEvent::VoiceListening);
        tokio::pin!(cancel);

        loop {
            let event = tokio::select! {
                biased;
                () = &mut cancel => {
                    self.recognizer.stop();
                    self.state = SessionState::Cancelled;
                    self.events.emit(LedgerEvent::VoiceCancelled);
                    return Ok(VoiceOutcome::Cancelled);
                }
                event = self.recognizer.next_event() => event,
            };

            match event {
                RecognitionEvent::Interim(text) => {
                    tracing::trace!("Interim transcript: {text}");
                }
                RecognitionEvent::Final(text) => {
                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    self.recognizer.stop();
                    self.state = SessionState::Result;
                    self.events.emit(LedgerEvent::VoiceTranscript {
                        text: text.to_string(),
                    });
                    return Ok(VoiceOutcome::Transcript(text.to_string()));
                }
                RecognitionEvent::Ended => {
                    self.recognizer.stop();
                    self.state = SessionState::Result;
                    return Ok(VoiceOutcome::NoSpeech);
                }
                RecognitionEvent::Failed(message) => {
                    self.recognizer.stop();
                    self.state = SessionState::Errored;
                    tracing::warn!("Speech recognition failed: {message}");
                    return Err(VoiceError::Recognition(message));
                }
            }
        }
    }
}
