//! Skill dispatcher
//!
//! Turns a matched skill and its operand into a spoken response. Every
//! branch produces a value; nothing here fails for a well-formed table.

use chrono::{DateTime, Local};
use rand::seq::IndexedRandom;
use serde::Serialize;
use std::fmt::Write;
use tracing::{debug, warn};

use super::builtin::{DATE_PATTERN, TIME_PATTERN};
use super::table::{SkillBehavior, SkillKind, SkillTable};
use crate::clock::Clock;

/// Token placed between parts of a spoken listing
pub const LIST_SEPARATOR: &str = ": ... ";

/// Result of invoking a skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dispatch {
    /// Skill that produced the response; `None` for interpreter messages
    pub skill: Option<String>,
    /// Text to speak
    pub response: String,
    /// The listening loop should stop after this turn
    pub request_stop: bool,
}

impl Dispatch {
    /// A response that did not come from a skill
    pub fn message(response: impl Into<String>) -> Self {
        Self {
            skill: None,
            response: response.into(),
            request_stop: false,
        }
    }

    fn reply(skill: &str, response: String) -> Self {
        Self {
            skill: Some(skill.to_string()),
            response,
            request_stop: false,
        }
    }
}

/// Invoke the skill `name` with the remainder of the phrase.
pub fn dispatch(table: &SkillTable, name: &str, operand: &str, clock: &dyn Clock) -> Dispatch {
    let Some(skill) = table.get(name) else {
        warn!("Dispatch to unknown skill: {}", name);
        return Dispatch::reply(name, unprogrammed(name));
    };
    debug!("Dispatching skill {} (operand: {:?})", name, operand);

    match &skill.behavior {
        SkillBehavior::Fixed(text) => Dispatch::reply(name, text.clone()),
        SkillBehavior::Random(choices) => {
            let response = choices
                .choose(&mut rand::rng())
                .cloned()
                .unwrap_or_else(|| unprogrammed(name));
            Dispatch::reply(name, response)
        }
        SkillBehavior::Computed(kind) => match kind {
            SkillKind::Help => Dispatch::reply(name, help(table, operand)),
            SkillKind::Date => {
                let pattern = skill.pattern.as_deref().unwrap_or(DATE_PATTERN);
                Dispatch::reply(name, format_time(clock.now(), pattern))
            }
            SkillKind::Time => Dispatch::reply(name, format_time(clock.now(), TIME_PATTERN)),
            SkillKind::Quit => Dispatch {
                skill: Some(name.to_string()),
                response: "Stopping now".to_string(),
                request_stop: true,
            },
            SkillKind::TurnOn => {
                let response = if operand.is_empty() {
                    "You need to tell me what to turn on".to_string()
                } else {
                    format!("I cannot turn on {}", operand)
                };
                Dispatch::reply(name, response)
            }
            SkillKind::Unprogrammed => Dispatch::reply(name, unprogrammed(name)),
        },
    }
}

fn unprogrammed(name: &str) -> String {
    format!("I am not yet programmed for the skill {}", name)
}

/// Help listing for one skill's commands, or for all skills
fn help(table: &SkillTable, operand: &str) -> String {
    let requested = table
        .iter()
        .find(|s| !operand.is_empty() && s.name.eq_ignore_ascii_case(operand));

    let parts: Vec<String> = match requested {
        Some(skill) => std::iter::once(format!(
            "These commands are available for the {} skill",
            skill.name
        ))
        .chain(skill.commands.iter().cloned())
        .collect(),
        None => std::iter::once(
            "To list commands for a specific skill, simply say \"help\" followed by the \
             name of the skill.  The following skills are currently supported"
                .to_string(),
        )
        .chain(table.sorted_names())
        .collect(),
    };
    parts.join(LIST_SEPARATOR)
}

/// strftime formatting that degrades to the raw pattern instead of panicking
fn format_time(now: DateTime<Local>, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", now.format(pattern)).is_err() {
        warn!("Invalid time pattern: {}", pattern);
        return pattern.to_string();
    }
    out
}
