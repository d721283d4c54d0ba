//! Recognizer fed from a channel

use tokio::sync::mpsc;

use super::{RecognitionEvent, SpeechRecognizer, VoiceError};

/// Recognizer whose events are pushed by another task or thread.
///
/// Useful for platform bridges that deliver results through callbacks, for
/// typed "dictation" on a terminal, and for tests.
#[derive(Debug)]
pub struct ChannelRecognizer {
    receiver: mpsc::Receiver<RecognitionEvent>,
    active: bool,
}

impl ChannelRecognizer {
    /// Create a recognizer and the sender that feeds it
    #[must_use]
    pub fn new(buffer: usize) -> (mpsc::Sender<RecognitionEvent>, Self) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        (
            sender,
            Self {
                receiver,
                active: false,
            },
        )
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

impl SpeechRecognizer for ChannelRecognizer {
    fn start(&mut self) -> Result<(), VoiceError> {
        if self.receiver.is_closed() && self.receiver.is_empty() {
            return Err(VoiceError::Unavailable("event source closed".to_string()));
        }
        // Drop anything left over from a previous session
        while self.receiver.try_recv().is_ok() {}
        self.active = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.active = false;
    }

    async fn next_event(&mut self) -> RecognitionEvent {
        self.receiver.recv().await.unwrap_or(RecognitionEvent::Ended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn closed_source_ends_the_stream() {
        let (sender, mut recognizer) = ChannelRecognizer::new(4);
        recognizer.start().unwrap();
        sender
            .send(RecognitionEvent::Final("tuna 20kg".to_string()))
            .await
            .unwrap();
        drop(sender);

        assert_eq!(
            recognizer.next_event().await,
            RecognitionEvent::Final("tuna 20kg".to_string())
        );
        assert_eq!(recognizer.next_event().await, RecognitionEvent::Ended);
        assert!(recognizer.start().is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn start_discards_stale_events() {
        let (sender, mut recognizer) = ChannelRecognizer::new(4);
        sender
            .send(RecognitionEvent::Interim("old".to_string()))
            .await
            .unwrap();
        recognizer.start().unwrap();
        assert!(recognizer.is_active());

        sender.send(RecognitionEvent::Ended).await.unwrap();
        assert_eq!(recognizer.next_event().await, RecognitionEvent::Ended);
        recognizer.stop();
        assert!(!recognizer.is_active());
    }
}
