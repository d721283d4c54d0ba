//! Voice capture sessions.
//!
//! A [`VoiceSession`] owns one [`SpeechRecognizer`] and turns its event stream
//! into at most one final transcript per listening session. The caller owns
//! the session and may cancel it at any point; a cancelled session yields no
//! transcript.

mod channel;
mod session;

use std::future::Future;

use thiserror::Error;

pub use channel::ChannelRecognizer;
pub use session::{SessionState, VoiceOutcome, VoiceSession};

/// Event delivered by a speech recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Partial hypothesis; may still change
    Interim(String),
    /// Final transcript for the utterance
    Final(String),
    /// The recognizer stopped without more results
    Ended,
    Failed(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VoiceError {
    #[error("Speech recognition unavailable: {0}")]
    Unavailable(String),
    #[error("Speech recognition failed: {0}")]
    Recognition(String),
}

/// A speech-to-text source such as a platform recognizer
pub trait SpeechRecognizer {
    /// Begin capturing audio
    fn start(&mut self) -> Result<(), VoiceError>;

    /// Stop capturing; pending results are discarded
    fn stop(&mut self);

    /// Wait for the next recognition event
    fn next_event(&mut self) -> impl Future<Output = RecognitionEvent> + Send;
}
