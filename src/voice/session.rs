//! Voice session: microphone, recognizer and speaker working together
//!
//! This is the speech-facing [`Prompter`] used by the CLI. Every failure
//! on the way from microphone to text is logged and becomes "nothing
//! heard".
//!
//! The collaborators are async. The interpreter calls [`Prompter`]
//! synchronously, so those calls hand the worker thread off with
//! `block_in_place` before waiting; they must not be made from a
//! current-thread runtime.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

use super::audio::{AudioClip, CommandMicrophone, MAX_PHRASE};
use super::recognizer::{transcribe, SpeechRecognizer};
use super::speaker::Speaker;
use crate::assistant::Prompter;
use crate::types::SpeechService;

/// A prompter that can also wait for the next unprompted phrase
#[async_trait]
pub trait Conversation: Prompter + Send {
    /// Wait at most `window` for a phrase to start
    async fn next_phrase(&mut self, window: Duration) -> Option<String>;
}

/// Speech input and output for one assistant
pub struct VoiceIo {
    microphone: CommandMicrophone,
    recognizer: Box<dyn SpeechRecognizer>,
    speaker: Box<dyn Speaker>,
    service: SpeechService,
    /// Longest phrase to record
    limit: Option<Duration>,
    /// How long to wait for an answer after a question
    answer_timeout: Duration,
}

impl VoiceIo {
    pub fn new(
        microphone: CommandMicrophone,
        recognizer: Box<dyn SpeechRecognizer>,
        speaker: Box<dyn Speaker>,
        service: SpeechService,
    ) -> Self {
        Self {
            microphone,
            recognizer,
            speaker,
            service,
            limit: None,
            answer_timeout: Duration::from_secs(5),
        }
    }

    /// Set the phrase limit and the answer timeout
    pub fn with_timings(mut self, limit: Option<Duration>, answer_timeout: Duration) -> Self {
        self.limit = limit;
        self.answer_timeout = answer_timeout;
        self
    }

    /// Calibrate the microphone against background noise
    pub async fn calibrate(&mut self, duration: Duration) -> Result<()> {
        self.microphone.calibrate(duration).await?;
        Ok(())
    }

    fn phrase_limit(&self) -> Duration {
        self.limit.unwrap_or(MAX_PHRASE)
    }

    pub async fn speak(&mut self, text: &str) {
        self.speaker.speak(text).await;
    }

    /// Record and transcribe one phrase, waiting at most `max`
    pub async fn hear(&self, max: Duration) -> Option<String> {
        match self.microphone.capture(max).await {
            Ok(Some(clip)) => transcribe(self.recognizer.as_ref(), &clip, self.service).await,
            Ok(None) => None,
            Err(e) => {
                error!("Microphone capture failed: {:#}", e);
                None
            }
        }
    }

    /// Speak `question` and wait for the answer
    pub async fn prompt(&mut self, question: &str) -> Option<String> {
        self.speak(question).await;
        self.hear(self.answer_timeout + self.phrase_limit()).await
    }

    /// Transcribe a WAV file
    pub async fn transcribe_file(&self, path: &Path) -> Result<Option<String>> {
        info!("Converting file {}", path.display());
        let owned = path.to_path_buf();
        let clip = tokio::task::spawn_blocking(move || AudioClip::from_wav_file(&owned))
            .await
            .context("WAV reader task failed")??;
        Ok(transcribe(self.recognizer.as_ref(), &clip, self.service).await)
    }
}

/// Drive async voice I/O from synchronous code
fn block_on<F: Future>(future: F) -> Option<F::Output> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Some(tokio::task::block_in_place(|| handle.block_on(future))),
        Err(_) => match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => Some(runtime.block_on(future)),
            Err(e) => {
                error!("Failed to start runtime for voice I/O: {}", e);
                None
            }
        },
    }
}

impl Prompter for VoiceIo {
    fn say(&mut self, text: &str) {
        block_on(self.speak(text));
    }

    fn ask(&mut self, question: &str) -> Option<String> {
        block_on(self.prompt(question)).flatten()
    }
}

#[async_trait]
impl Conversation for VoiceIo {
    async fn next_phrase(&mut self, window: Duration) -> Option<String> {
        let clip = match self.microphone.capture_within(window, self.phrase_limit()).await {
            Ok(clip) => clip?,
            Err(e) => {
                error!("Microphone capture failed: {:#}", e);
                // Avoid spinning when the recorder cannot start at all
                tokio::time::sleep(window).await;
                return None;
            }
        };
        transcribe(self.recognizer.as_ref(), &clip, self.service).await
    }
}
