//! Command interpreter
//!
//! Takes one utterance at a time, strips the wake word, matches the command
//! against the skill table and dispatches it. Phrases no command matches go
//! through a [`LearningSession`], whose questions are asked through the
//! [`Prompter`].

pub mod prompter;

pub use prompter::{Prompter, ScriptedPrompter};

use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::learning::{LearningOutcome, LearningSession, LearningStep, Reinforcer};
use crate::skills::{dispatch, has_leading, strip_leading, Dispatch, SkillTable};

/// Reply to an empty command
pub const NOT_UNDERSTOOD: &str = "I do not understand what you are trying to tell me!";

/// A command found in a phrase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMatch {
    pub skill: String,
    /// The skill name or command that matched
    pub command: String,
    /// What followed the command
    pub operand: String,
}

/// The assistant: session settings plus the skill table it owns
pub struct Assistant {
    alias: String,
    table: SkillTable,
    reinforcer: Reinforcer,
    clock: Box<dyn Clock>,
}

impl Assistant {
    /// Create an assistant answering to `alias`.
    ///
    /// Candidates loaded at or above `threshold` are promoted right away.
    pub fn new(alias: &str, mut table: SkillTable, threshold: u32) -> Self {
        info!("Your assistant's name is {}.", alias);
        let reinforcer = Reinforcer::new(threshold);
        for event in reinforcer.normalize(&mut table) {
            debug!("{}", event);
        }
        Self {
            alias: alias.to_string(),
            table,
            reinforcer,
            clock: Box::new(SystemClock),
        }
    }

    /// Create from configuration
    pub fn from_config(config: &Config, table: SkillTable) -> Self {
        Self::new(&config.assistant.alias, table, config.assistant.skill_threshold)
    }

    /// Replace the clock used by date and time skills
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn threshold(&self) -> u32 {
        self.reinforcer.threshold()
    }

    pub fn table(&self) -> &SkillTable {
        &self.table
    }

    /// Handle a raw utterance that may start with the wake word, and speak
    /// the response.
    ///
    /// With `require_wake_word`, phrases not addressed to the assistant get
    /// a diagnostic reply that is logged, not spoken, and nothing else
    /// happens. A bare wake word gives
    /// the user one more chance to say the command.
    pub fn interpret(
        &mut self,
        phrase: Option<&str>,
        require_wake_word: bool,
        prompter: &mut dyn Prompter,
    ) -> Option<Dispatch> {
        let phrase = phrase?;

        let command = if has_leading(phrase, &self.alias) {
            let rest = strip_leading(phrase, &self.alias).into_owned();
            if rest.is_empty() {
                prompter.listen()?
            } else {
                rest
            }
        } else if require_wake_word {
            let result = Dispatch::message(format!(
                "Wake word was not found, but I heard \"{}\"",
                phrase
            ));
            warn!("{}", result.response);
            return Some(result);
        } else {
            phrase.to_string()
        };

        if command.trim().is_empty() {
            return None;
        }

        let result = self.process_command(&command, prompter)?;
        prompter.say(&result.response);
        Some(result)
    }

    /// Run a command (no wake word): dispatch it, or learn it
    pub fn process_command(&mut self, phrase: &str, prompter: &mut dyn Prompter) -> Option<Dispatch> {
        if phrase.trim().is_empty() {
            return Some(Dispatch::message(NOT_UNDERSTOOD));
        }

        match self.match_command(phrase) {
            Some(found) => Some(self.dispatch(&found.skill, &found.operand)),
            None => self.learn(phrase, prompter),
        }
    }

    /// Find the first skill whose name or command starts `phrase`.
    ///
    /// Skills are tried in table order and each skill's name before its
    /// commands, so the first hit wins.
    pub fn match_command(&self, phrase: &str) -> Option<CommandMatch> {
        for skill in self.table.iter() {
            for command in skill.leaders() {
                let operand = strip_leading(phrase, command);
                if operand != phrase {
                    debug!("process_command: command = {} ({})", command, operand);
                    return Some(CommandMatch {
                        skill: skill.name.clone(),
                        command: command.to_string(),
                        operand: operand.into_owned(),
                    });
                }
            }
        }
        None
    }

    /// Invoke a skill directly
    pub fn dispatch(&self, skill: &str, operand: &str) -> Dispatch {
        dispatch(&self.table, skill, operand, self.clock.as_ref())
    }

    /// Drive a learning session to completion
    fn learn(&mut self, phrase: &str, prompter: &mut dyn Prompter) -> Option<Dispatch> {
        let mut session = LearningSession::new(phrase, &self.table);
        let mut answer: Option<String> = None;

        loop {
            let step = session.step(&mut self.table, &self.reinforcer, answer.as_deref());
            for event in session.take_events() {
                prompter.say(&event.to_string());
            }

            match step {
                LearningStep::Ask { notice, question, .. } => {
                    if let Some(notice) = notice {
                        prompter.say(&notice);
                    }
                    answer = prompter.ask(&question);
                }
                LearningStep::Finished(LearningOutcome::Confirmed { skill }) => {
                    return Some(self.dispatch(&skill, ""));
                }
                LearningStep::Finished(LearningOutcome::Aborted) => return None,
                LearningStep::Finished(LearningOutcome::NewSkillUnsupported) => {
                    info!("Learning new skills is not supported yet: \"{}\"", phrase);
                    return None;
                }
            }
        }
    }
}
