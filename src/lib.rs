//! Panda - a voice assistant that learns its commands
//!
//! An assistant with:
//! - A persisted skill table (skill name, trigger commands, candidates)
//! - Wake-word stripping and first-match command lookup
//! - Interactive learning: unknown phrases become commands after repeated
//!   confirmation
//! - Voice input and output through external recorder, recognizer and
//!   speech programs
//!
//! # Example
//!
//! ```
//! use panda_assistant::assistant::{Assistant, ScriptedPrompter};
//! use panda_assistant::skills::default_table;
//!
//! let mut assistant = Assistant::new("Panda", default_table("Panda"), 3);
//! let mut prompter = ScriptedPrompter::default();
//! let result = assistant.interpret(Some("Panda hello"), true, &mut prompter).unwrap();
//! assert_eq!(result.response, "Hello yourself!");
//! ```

// Core modules
pub mod types;
pub mod clock;
pub mod config;
pub mod skills;
pub mod learning;
pub mod assistant;
pub mod voice;
pub mod cli;

// Re-export commonly used types for convenience
pub use assistant::{Assistant, Prompter, ScriptedPrompter};

pub use config::Config;

pub use learning::{LearningOutcome, LearningSession, Reinforcer};

pub use skills::{Dispatch, Skill, SkillStore, SkillTable};

pub use types::SpeechService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get the library info
pub fn info() -> String {
    format!("{} v{} - Voice Assistant Library", NAME, VERSION)
}
