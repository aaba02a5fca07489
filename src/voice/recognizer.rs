//! Speech-to-text
//!
//! Recognition runs an external transcription program: the clip is passed
//! as a WAV file on stdin and the transcript is read from stdout, either as
//! plain text or as a JSON object `{"text": ..., "error": ...}`.
//! Failures stay at this boundary; the engine only ever sees an utterance
//! or nothing.

use async_trait::async_trait;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, info};

use super::audio::AudioClip;
use crate::types::SpeechService;

/// Why a clip produced no transcript
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// The audio could not be understood
    #[error("{service} could not parse audio")]
    NoMatch { service: SpeechService },
    /// The backing service failed
    #[error("{service} did not respond; {reason}")]
    ServiceUnavailable { service: SpeechService, reason: String },
}

/// Converts audio to text
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn recognize(&self, audio: &AudioClip, service: SpeechService) -> Result<String, RecognitionError>;
}

/// Recognize a clip, logging and swallowing any error
pub async fn transcribe(
    recognizer: &dyn SpeechRecognizer,
    audio: &AudioClip,
    service: SpeechService,
) -> Option<String> {
    match recognizer.recognize(audio, service).await {
        Ok(text) => {
            info!("{} heard: {}", service, text);
            Some(text)
        }
        Err(e) => {
            error!("{}", e);
            None
        }
    }
}

/// Recognizer backed by an external program
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
    /// The service this program implements
    backend: SpeechService,
}

impl CommandRecognizer {
    pub fn new(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
            backend: SpeechService::Google,
        }
    }

    pub fn from_config(config: &crate::config::SpeechConfig) -> Self {
        Self::new(&config.recognizer_program, config.recognizer_args.clone())
            .with_backend(config.recognizer_backend)
    }

    /// Declare which service the program implements
    pub fn with_backend(mut self, backend: SpeechService) -> Self {
        self.backend = backend;
        self
    }

    async fn run(&self, wav: Vec<u8>, service: SpeechService) -> Result<String, RecognitionError> {
        let unavailable = |reason: String| RecognitionError::ServiceUnavailable { service, reason };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| unavailable(format!("failed to start {}: {}", self.program, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| unavailable("no stdin".to_string()))?;
        // Write and read together so a chatty program cannot stall on a full pipe
        let feed = async move {
            let written = stdin.write_all(&wav).await;
            drop(stdin);
            written
        };
        let (written, output) = tokio::join!(feed, child.wait_with_output());

        if let Err(e) = written {
            debug!("Recognizer closed stdin early: {}", e);
        }
        let output = output.map_err(|e| unavailable(e.to_string()))?;

        if !output.status.success() {
            return Err(unavailable(String::from_utf8_lossy(&output.stderr).trim().to_string()));
        }

        parse_transcript(&String::from_utf8_lossy(&output.stdout), service)
    }
}

#[async_trait]
impl SpeechRecognizer for CommandRecognizer {
    async fn recognize(&self, audio: &AudioClip, service: SpeechService) -> Result<String, RecognitionError> {
        if service != self.backend {
            return Ok(format!("The {} Recognizer is not yet implemented", service));
        }
        if audio.is_empty() {
            return Err(RecognitionError::NoMatch { service });
        }

        let wav = audio
            .to_wav_bytes()
            .map_err(|e| RecognitionError::ServiceUnavailable { service, reason: e.to_string() })?;
        self.run(wav, service).await
    }
}

/// Read the transcript printed by a recognizer program
fn parse_transcript(stdout: &str, service: SpeechService) -> Result<String, RecognitionError> {
    let text = match serde_json::from_str::<serde_json::Value>(stdout) {
        Ok(serde_json::Value::Object(result)) => {
            if let Some(error) = result.get("error").and_then(|e| e.as_str()) {
                if !error.is_empty() {
                    return Err(RecognitionError::ServiceUnavailable {
                        service,
                        reason: error.to_string(),
                    });
                }
            }
            result
                .get("text")
                .and_then(|t| t.as_str())
                .unwrap_or("")
                .trim()
                .to_string()
        }
        _ => stdout.trim().to_string(),
    };

    if text.is_empty() {
        return Err(RecognitionError::NoMatch { service });
    }
    Ok(text)
}
