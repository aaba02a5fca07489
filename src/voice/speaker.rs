//! Text-to-speech through the system voice

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Speaks text aloud. Fire and forget: failures are logged, not returned.
#[async_trait]
pub trait Speaker: Send {
    async fn speak(&mut self, text: &str);
}

/// Speaker backed by a `say`-style program (`say -v <voice> <text>`)
#[derive(Debug, Clone)]
pub struct SystemSpeaker {
    program: String,
    /// Placed before `-v <voice> <text>`
    args: Vec<String>,
    voice: String,
    alias: String,
}

impl SystemSpeaker {
    pub fn new(program: &str, voice: &str, alias: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            voice: voice.to_string(),
            alias: alias.to_string(),
        }
    }

    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(
            &config.speech.speaker_program,
            &config.assistant.voice,
            &config.assistant.alias,
        )
        .with_args(config.speech.speaker_args.clone())
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    fn args(&self, text: &str) -> Vec<String> {
        let mut args = self.args.clone();
        args.extend(["-v".to_string(), self.voice.clone(), text.to_string()]);
        args
    }
}

#[async_trait]
impl Speaker for SystemSpeaker {
    async fn speak(&mut self, text: &str) {
        if text.trim().is_empty() {
            debug!("speak: ({} ignored {:?})", self.alias, text);
            return;
        }
        info!("{} says: {}", self.alias, text);

        let status = Command::new(&self.program)
            .args(self.args(text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        match status {
            Ok(status) if status.success() => {}
            Ok(status) => warn!("{} exited with {}", self.program, status),
            Err(e) => warn!("Failed to run {}: {}", self.program, e),
        }
    }
}

/// Speaker that only logs, for machines without a system voice
#[derive(Debug, Clone)]
pub struct LogSpeaker {
    alias: String,
}

impl LogSpeaker {
    pub fn new(alias: &str) -> Self {
        Self {
            alias: alias.to_string(),
        }
    }
}

#[async_trait]
impl Speaker for LogSpeaker {
    async fn speak(&mut self, text: &str) {
        if !text.trim().is_empty() {
            info!("{} says: {}", self.alias, text);
            println!("{}: {}", self.alias, text);
        }
    }
}
