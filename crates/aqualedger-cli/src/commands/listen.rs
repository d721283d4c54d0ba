use std::sync::Arc;

use aqualedger_core::services::CatchCapture;
use aqualedger_core::voice::{
    RecognitionEvent, SpeechRecognizer, VoiceError, VoiceOutcome, VoiceSession,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::commands::common::{open_store, print_event};
use crate::commands::log::print_captured;
use crate::config::CliSettings;
use crate::error::CliError;

/// Treats each line on stdin as a final transcript from a speech engine
pub struct StdinRecognizer {
    lines: Option<Lines<BufReader<Stdin>>>,
}

impl StdinRecognizer {
    pub fn new() -> Self {
        Self {
            lines: Some(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

impl Default for StdinRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechRecognizer for StdinRecognizer {
    fn start(&mut self) -> Result<(), VoiceError> {
        if self.lines.is_none() {
            return Err(VoiceError::Unavailable("standard input is closed".to_string()));
        }
        Ok(())
    }

    fn stop(&mut self) {}

    async fn next_event(&mut self) -> RecognitionEvent {
        let Some(lines) = self.lines.as_mut() else {
            return RecognitionEvent::Ended;
        };
        match lines.next_line().await {
            Ok(Some(line)) => RecognitionEvent::Final(line),
            Ok(None) => {
                self.lines = None;
                RecognitionEvent::Ended
            }
            Err(error) => RecognitionEvent::Failed(error.to_string()),
        }
    }
}

pub async fn run_listen(settings: &CliSettings) -> Result<(), CliError> {
    let capture = CatchCapture::new(open_store(settings).await?);
    let mut session =
        VoiceSession::new(StdinRecognizer::new()).with_events(Arc::new(print_event));

    let cancel = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    match session.listen(cancel).await? {
        VoiceOutcome::Transcript(text) => {
            eprintln!("Heard: {text}");
            let captured = capture.log_text(&text).await?;
            print_captured(&captured);
        }
        VoiceOutcome::NoSpeech => eprintln!("Nothing heard; no catch saved"),
        VoiceOutcome::Cancelled => {}
    }
    Ok(())
}
