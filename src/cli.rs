//! CLI interface for panda

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::assistant::Assistant;
use crate::config::{show_config, Config};
use crate::skills::{Skill, SkillBehavior, SkillStore};
use crate::types::SpeechService;
use crate::voice::{
    listen_loop, CommandMicrophone, CommandRecognizer, LogSpeaker, Speaker, SystemSpeaker, VoiceIo,
};

/// Phrase used in one-shot mode when nothing was given or heard
pub const DEFAULT_PHRASE: &str = "help me";

#[derive(Parser)]
#[command(name = "panda")]
#[command(about = "Voice assistant that learns new commands as you use it", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    loglevel: LogLevel,

    /// Print responses instead of speaking them
    #[arg(long, global = true)]
    mute: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Settings that override the configuration file
#[derive(Args, Default)]
struct Overrides {
    /// System voice used for speech
    #[arg(long, global = true)]
    voice: Option<String>,
    /// Assistant name, used as the wake word
    #[arg(long, global = true)]
    alias: Option<String>,
    /// Speech recognition service
    #[arg(long, value_enum, global = true)]
    service: Option<SpeechService>,
    /// Seconds per continuous listening window
    #[arg(long, global = true)]
    duty: Option<u64>,
    /// Seconds allotted to complete a phrase
    #[arg(long, global = true)]
    limit: Option<u64>,
    /// Seconds of background noise used for calibration
    #[arg(long, global = true)]
    duration: Option<u64>,
    /// Confirmations needed before a phrase becomes a command
    #[arg(long, global = true)]
    threshold: Option<u32>,
}

impl Overrides {
    fn apply(&self, config: &mut Config) {
        if let Some(voice) = &self.voice {
            config.assistant.voice = voice.clone();
        }
        if let Some(alias) = &self.alias {
            config.assistant.alias = alias.clone();
        }
        if let Some(service) = self.service {
            config.assistant.service = service;
        }
        if let Some(duty) = self.duty {
            config.listen.duty_secs = duty;
        }
        if let Some(limit) = self.limit {
            config.listen.limit_secs = Some(limit);
        }
        if let Some(duration) = self.duration {
            config.listen.calibration_secs = duration;
        }
        if let Some(threshold) = self.threshold {
            config.assistant.skill_threshold = threshold;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            // tracing has no level above error
            LogLevel::Critical | LogLevel::Error => "error",
            LogLevel::Warning => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Handle one phrase and exit (default when no command given)
    Run {
        /// Phrase to handle instead of listening for one
        #[arg(short, long)]
        phrase: Option<String>,
    },
    /// Listen continuously until told to stop listening
    Listen,
    /// Transcribe a WAV file, or one spoken phrase
    Transcribe {
        /// WAV file to transcribe
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Inspect or reset the skill table
    Skills {
        #[command(subcommand)]
        command: SkillCommands,
    },
    /// Configure the assistant
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand)]
enum SkillCommands {
    /// List all skills
    List,
    /// Show the commands and candidates of one skill
    Show {
        /// Skill name
        name: String,
    },
    /// Forget everything learned
    Reset,
}

/// Initialize logging
fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.directive()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.loglevel);

    let mut config = Config::load()?;
    cli.overrides.apply(&mut config);

    match cli.command {
        None => run_once(&config, None, cli.mute).await?,
        Some(Commands::Run { phrase }) => run_once(&config, phrase, cli.mute).await?,
        Some(Commands::Listen) => listen(&config, cli.mute).await?,
        Some(Commands::Transcribe { file }) => transcribe(&config, file, cli.mute).await?,
        Some(Commands::Skills { command }) => {
            let store = SkillStore::from_config(&config.skills)?;
            match command {
                SkillCommands::List => list_skills(&store, &config.assistant.alias)?,
                SkillCommands::Show { name } => show_skill(&store, &config.assistant.alias, &name)?,
                SkillCommands::Reset => {
                    if store.reset()? {
                        println!("Learned skills removed: {}", store.modified_path().display());
                    } else {
                        println!("Nothing learned yet.");
                    }
                }
            }
        }
        Some(Commands::Config { show }) => {
            if show {
                show_config(&config)?;
            } else {
                println!("Configuration file: {}", crate::config::config_path()?.display());
                println!("Use --show to print the effective configuration.");
            }
        }
    }

    Ok(())
}

/// Build the speech session from configuration
fn voice_io(config: &Config, mute: bool) -> VoiceIo {
    let alias = &config.assistant.alias;
    let speaker: Box<dyn Speaker> = if mute {
        Box::new(LogSpeaker::new(alias))
    } else {
        Box::new(SystemSpeaker::from_config(config))
    };

    VoiceIo::new(
        CommandMicrophone::from_config(&config.speech),
        Box::new(CommandRecognizer::from_config(&config.speech)),
        speaker,
        config.assistant.service,
    )
    .with_timings(config.listen.limit(), config.listen.timeout_command())
}

async fn calibrate(io: &mut VoiceIo, config: &Config) {
    if let Err(e) = io.calibrate(config.listen.calibration()).await {
        warn!("Microphone calibration failed: {:#}", e);
    }
}

fn load_assistant(config: &Config) -> Result<(SkillStore, Assistant)> {
    let store = SkillStore::from_config(&config.skills)?;
    let table = store
        .load(&config.assistant.alias)
        .context("Failed to load skills")?;
    Ok((store, Assistant::from_config(config, table)))
}

/// Handle one phrase: the given one, else one heard, else the default
async fn run_once(config: &Config, phrase: Option<String>, mute: bool) -> Result<()> {
    let (store, mut assistant) = load_assistant(config)?;
    let mut io = voice_io(config, mute);
    let before = assistant.table().clone();

    let phrase = match phrase {
        Some(phrase) => phrase,
        None => {
            calibrate(&mut io, config).await;
            io.prompt("Listening").await.unwrap_or_else(|| {
                info!("Nothing heard, using \"{}\"", DEFAULT_PHRASE);
                DEFAULT_PHRASE.to_string()
            })
        }
    };

    assistant.interpret(Some(&phrase), false, &mut io);

    if assistant.table() != &before {
        store.save(assistant.table())?;
    }
    Ok(())
}

/// Continuous listening, then persist what was learned
async fn listen(config: &Config, mute: bool) -> Result<()> {
    let (store, mut assistant) = load_assistant(config)?;
    let mut io = voice_io(config, mute);
    calibrate(&mut io, config).await;

    let summary = listen_loop(&mut assistant, &mut io, config.listen.duty()).await;
    info!(
        "Heard {} phrases and answered {}",
        summary.phrases, summary.responses
    );

    if let Err(e) = store.save(assistant.table()) {
        error!("Failed to save skills: {:#}", e);
        return Err(e);
    }
    info!("Skills saved to {}", store.modified_path().display());
    Ok(())
}

async fn transcribe(config: &Config, file: Option<PathBuf>, mute: bool) -> Result<()> {
    let mut io = voice_io(config, mute);
    let text = match file {
        Some(path) => io.transcribe_file(&path).await?,
        None => {
            calibrate(&mut io, config).await;
            io.prompt("Listening").await
        }
    };

    match text {
        Some(text) => {
            println!("{}", text);
            Ok(())
        }
        None => bail!("No speech was recognized"),
    }
}

fn list_skills(store: &SkillStore, alias: &str) -> Result<()> {
    let table = store.load(alias)?;
    println!("{} skills:", table.len());
    for skill in table.iter() {
        let learning = if skill.candidates.is_empty() {
            String::new()
        } else {
            format!(" ({} candidates)", skill.candidates.len())
        };
        println!("  {:<10} {}{}", skill.name, skill.commands.join(", "), learning);
    }
    Ok(())
}

fn show_skill(store: &SkillStore, alias: &str, name: &str) -> Result<()> {
    let table = store.load(alias)?;
    let Some(skill) = table.get(name) else {
        bail!("Unknown skill: {}", name);
    };
    print!("{}", describe_skill(skill));
    Ok(())
}

fn describe_skill(skill: &Skill) -> String {
    let mut out = format!("Skill: {}\n", skill.name);
    out.push_str(&format!("  Commands: {}\n", skill.commands.join(", ")));
    match &skill.behavior {
        SkillBehavior::Fixed(text) => out.push_str(&format!("  Response: {}\n", text)),
        SkillBehavior::Random(choices) => {
            out.push_str(&format!("  Responses: {} to choose from\n", choices.len()))
        }
        SkillBehavior::Computed(kind) => out.push_str(&format!("  Built in: {:?}\n", kind)),
    }
    if let Some(pattern) = &skill.pattern {
        out.push_str(&format!("  Pattern: {}\n", pattern));
    }
    for (phrase, count) in &skill.candidates {
        out.push_str(&format!("  Candidate: \"{}\" x{}\n", phrase, count));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "panda", "--alias", "Koala", "--service", "Wit.ai", "--limit", "4", "--threshold", "2",
            "listen",
        ]);
        let mut config = Config::default();
        cli.overrides.apply(&mut config);

        assert_eq!(config.assistant.alias, "Koala");
        assert_eq!(config.assistant.service, SpeechService::WitAi);
        assert_eq!(config.listen.limit_secs, Some(4));
        assert_eq!(config.assistant.skill_threshold, 2);
        assert_eq!(config.assistant.voice, "Ava");
        assert!(matches!(cli.command, Some(Commands::Listen)));
    }

    #[test]
    fn test_default_command_and_loglevel() {
        let cli = Cli::parse_from(["panda"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.loglevel, LogLevel::Info);

        let cli = Cli::parse_from(["panda", "run", "--phrase", "tell me a joke", "--loglevel", "critical"]);
        assert_eq!(cli.loglevel.directive(), "error");
        match cli.command {
            Some(Commands::Run { phrase }) => assert_eq!(phrase.as_deref(), Some("tell me a joke")),
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_describe_skill() {
        let mut skill = Skill::fixed("greeting", &["hello", "hi"], "Hello yourself!");
        skill.candidates.insert("howdy".to_string(), 2);
        let text = describe_skill(&skill);
        assert!(text.contains("Commands: hello, hi"));
        assert!(text.contains("Response: Hello yourself!"));
        assert!(text.contains("Candidate: \"howdy\" x2"));
    }
}
