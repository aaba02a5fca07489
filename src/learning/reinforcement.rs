//! Candidate reinforcement - promotes confirmed phrases to skill commands
//!
//! Each unrecognized phrase the user ties to a skill becomes a candidate
//! with a count. Confirmations raise the count and rejections lower it.
//! Reaching the threshold commits the phrase as a command; dropping below
//! zero forgets it. Counts in between survive restarts with the table.

use std::fmt;
use tracing::{debug, info, warn};

use crate::skills::SkillTable;

/// Confirmations needed before a candidate becomes a command
pub const DEFAULT_SKILL_THRESHOLD: u32 = 3;

/// A candidate crossed one of its bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateEvent {
    /// Promoted into the skill's commands
    Learned { skill: String, phrase: String },
    /// Dropped from the skill's candidates
    Forgotten { skill: String, phrase: String },
}

impl fmt::Display for CandidateEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateEvent::Learned { skill, phrase } => {
                write!(f, "I learned the command \"{}\" for the skill {}", phrase, skill)
            }
            CandidateEvent::Forgotten { skill, phrase } => {
                write!(f, "I forgot the command \"{}\" for the skill {}", phrase, skill)
            }
        }
    }
}

/// Applies reinforcement to skill candidates
#[derive(Debug, Clone, Copy)]
pub struct Reinforcer {
    threshold: u32,
}

impl Reinforcer {
    /// Create with a promotion threshold (at least 1)
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Record a confirmation that `phrase` means `skill`
    pub fn increase_candidate(
        &self,
        table: &mut SkillTable,
        skill: &str,
        phrase: &str,
    ) -> Option<CandidateEvent> {
        let Some(entry) = table.get_mut(skill) else {
            warn!("Cannot reinforce unknown skill: {}", skill);
            return None;
        };
        if entry.has_command(phrase) {
            debug!("\"{}\" is already a command of {}", phrase, skill);
            return None;
        }

        let count = entry.candidates.entry(phrase.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        debug!("Candidate \"{}\" for {}: {}/{}", phrase, skill, count, self.threshold);

        if *count < self.threshold {
            return None;
        }

        entry.candidates.remove(phrase);
        entry.commands.push(phrase.to_string());
        info!("Learned command \"{}\" for skill {}", phrase, skill);
        Some(CandidateEvent::Learned {
            skill: skill.to_string(),
            phrase: phrase.to_string(),
        })
    }

    /// Promote every candidate already at or above the threshold.
    ///
    /// Counts read from disk may have been saved under a higher threshold;
    /// after this every remaining count is below the current one.
    pub fn normalize(&self, table: &mut SkillTable) -> Vec<CandidateEvent> {
        let mut events = Vec::new();
        for name in table.names() {
            let Some(entry) = table.get_mut(&name) else {
                continue;
            };
            let ripe: Vec<String> = entry
                .candidates
                .iter()
                .filter(|(_, count)| **count >= self.threshold)
                .map(|(phrase, _)| phrase.clone())
                .collect();

            for phrase in ripe {
                entry.candidates.remove(&phrase);
                if !entry.has_command(&phrase) {
                    entry.commands.push(phrase.clone());
                }
                info!("Learned command \"{}\" for skill {} (loaded at threshold)", phrase, name);
                events.push(CandidateEvent::Learned {
                    skill: name.clone(),
                    phrase,
                });
            }
        }
        events
    }

    /// Record a rejection of `phrase` for `skill`. Phrases that are not
    /// candidates are left alone.
    pub fn decrease_candidate(
        &self,
        table: &mut SkillTable,
        skill: &str,
        phrase: &str,
    ) -> Option<CandidateEvent> {
        let entry = table.get_mut(skill)?;
        let count = entry.candidates.get_mut(phrase)?;

        match count.checked_sub(1) {
            Some(lowered) => {
                *count = lowered;
                debug!("Candidate \"{}\" for {}: {}/{}", phrase, skill, lowered, self.threshold);
                None
            }
            None => {
                entry.candidates.remove(phrase);
                info!("Forgot candidate \"{}\" for skill {}", phrase, skill);
                Some(CandidateEvent::Forgotten {
                    skill: skill.to_string(),
                    phrase: phrase.to_string(),
                })
            }
        }
    }
}

impl Default for Reinforcer {
    fn default() -> Self {
        Self::new(DEFAULT_SKILL_THRESHOLD)
    }
}
