//! Configuration management
//!
//! Manages assistant configuration: wake word, voice, recognition service,
//! listening timings, skills files, and the external speech programs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::learning::DEFAULT_SKILL_THRESHOLD;
use crate::types::SpeechService;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Identity and learning settings
    #[serde(default)]
    pub assistant: AssistantConfig,
    /// Listening loop timings
    #[serde(default)]
    pub listen: ListenConfig,
    /// Skills file locations
    #[serde(default)]
    pub skills: SkillsConfig,
    /// External speech programs
    #[serde(default)]
    pub speech: SpeechConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Assistant name, used as the wake word
    #[serde(default = "default_alias")]
    pub alias: String,
    /// System voice used for speech
    #[serde(default = "default_voice")]
    pub voice: String,
    /// Speech recognition service
    #[serde(default)]
    pub service: SpeechService,
    /// Confirmations needed before a phrase becomes a command
    #[serde(default = "default_threshold")]
    pub skill_threshold: u32,
}

fn default_alias() -> String {
    "Panda".to_string()
}

fn default_voice() -> String {
    "Ava".to_string()
}

fn default_threshold() -> u32 {
    DEFAULT_SKILL_THRESHOLD
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            alias: default_alias(),
            voice: default_voice(),
            service: SpeechService::default(),
            skill_threshold: default_threshold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenConfig {
    /// Seconds between continuous listening windows
    #[serde(default = "default_duty")]
    pub duty_secs: u64,
    /// Seconds allotted to complete a phrase (unlimited when unset)
    #[serde(default)]
    pub limit_secs: Option<u64>,
    /// Seconds of ambient noise recorded to calibrate the microphone
    #[serde(default = "default_calibration")]
    pub calibration_secs: u64,
    /// Seconds to wait for a command or an answer after a prompt
    #[serde(default = "default_timeout_command")]
    pub timeout_command_secs: u64,
}

fn default_duty() -> u64 {
    5
}

fn default_calibration() -> u64 {
    2
}

fn default_timeout_command() -> u64 {
    5
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            duty_secs: default_duty(),
            limit_secs: None,
            calibration_secs: default_calibration(),
            timeout_command_secs: default_timeout_command(),
        }
    }
}

impl ListenConfig {
    pub fn duty(&self) -> Duration {
        Duration::from_secs(self.duty_secs)
    }

    pub fn limit(&self) -> Option<Duration> {
        self.limit_secs.map(Duration::from_secs)
    }

    pub fn calibration(&self) -> Duration {
        Duration::from_secs(self.calibration_secs)
    }

    pub fn timeout_command(&self) -> Duration {
        Duration::from_secs(self.timeout_command_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillsConfig {
    /// Skills shipped with the assistant (defaults to `<data>/skills.json`)
    #[serde(default)]
    pub default_path: Option<PathBuf>,
    /// Skills including everything learned (defaults to `<data>/modified_skills.json`)
    #[serde(default)]
    pub modified_path: Option<PathBuf>,
}

impl SkillsConfig {
    pub fn default_path(&self) -> Result<PathBuf> {
        resolve_data_file(&self.default_path, "skills.json")
    }

    pub fn modified_path(&self) -> Result<PathBuf> {
        resolve_data_file(&self.modified_path, "modified_skills.json")
    }
}

fn resolve_data_file(configured: &Option<PathBuf>, file_name: &str) -> Result<PathBuf> {
    match configured {
        Some(path) => Ok(path.clone()),
        None => Ok(data_dir()?.join(file_name)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Program that reads a WAV file on stdin and prints the transcript
    #[serde(default = "default_recognizer")]
    pub recognizer_program: String,
    /// Extra arguments for the recognizer
    #[serde(default)]
    pub recognizer_args: Vec<String>,
    /// Speech service the recognizer program implements
    #[serde(default)]
    pub recognizer_backend: SpeechService,
    /// Program that records raw PCM to stdout (sox `rec` compatible)
    #[serde(default = "default_recorder")]
    pub recorder_program: String,
    /// Arguments placed before the recording options
    #[serde(default)]
    pub recorder_args: Vec<String>,
    /// Program that speaks text (macOS `say` compatible)
    #[serde(default = "default_speaker")]
    pub speaker_program: String,
    /// Arguments placed before `-v <voice> <text>`
    #[serde(default)]
    pub speaker_args: Vec<String>,
}

fn default_recognizer() -> String {
    "whisper-transcribe".to_string()
}

fn default_recorder() -> String {
    "rec".to_string()
}

fn default_speaker() -> String {
    "say".to_string()
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            recognizer_program: default_recognizer(),
            recognizer_args: Vec::new(),
            recognizer_backend: SpeechService::default(),
            recorder_program: default_recorder(),
            recorder_args: Vec::new(),
            speaker_program: default_speaker(),
            speaker_args: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        let config_path = config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .context("Failed to read config file")?;
        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent()
            .context("Config path has no parent")?;

        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "panda", "panda")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}

/// Get the data directory path
pub fn data_dir() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "panda", "panda")
        .context("Failed to get project directories")?;
    Ok(base.data_dir().to_path_buf())
}

/// Print the effective configuration
pub fn show_config(config: &Config) -> Result<()> {
    let contents = toml::to_string_pretty(config)
        .context("Failed to serialize config")?;
    println!("# {}", config_path()?.display());
    println!("{}", contents);
    println!("# skills: {}", config.skills.default_path()?.display());
    println!("# learned skills: {}", config.skills.modified_path()?.display());
    Ok(())
}
