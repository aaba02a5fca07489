//! Skill table
//!
//! The in-memory set of skills the assistant can dispatch to. Skills keep
//! their registration order because command matching is first-match-wins;
//! the table serializes as a JSON object keyed by skill name, in that same
//! order.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Code-level behaviors for skills without a stored response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillKind {
    /// List skills, or the commands of one skill
    Help,
    /// Current date, formatted with the skill's pattern
    Date,
    /// Current time
    Time,
    /// Stop the listening loop
    Quit,
    /// Switch something on (nothing is wired up yet)
    TurnOn,
    /// Registered, but no behavior exists for it
    Unprogrammed,
}

impl SkillKind {
    /// Resolve the computed behavior for a skill name
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "help" => SkillKind::Help,
            "date" => SkillKind::Date,
            "time" => SkillKind::Time,
            "quit" => SkillKind::Quit,
            "turn on" => SkillKind::TurnOn,
            _ => SkillKind::Unprogrammed,
        }
    }
}

/// What a skill does when invoked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillBehavior {
    /// Always answers with the same text
    Fixed(String),
    /// Answers with one of several texts, picked at random
    Random(Vec<String>),
    /// Answer is produced in code
    Computed(SkillKind),
}

/// A single skill
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    /// Unique skill name, also usable as a command
    pub name: String,
    /// Committed commands, most specific first
    pub commands: Vec<String>,
    /// Phrases being reinforced, with their current count
    pub candidates: BTreeMap<String, u32>,
    /// Response behavior
    pub behavior: SkillBehavior,
    /// strftime pattern for date-style skills
    pub pattern: Option<String>,
}

impl Skill {
    /// Create a skill whose behavior is derived from its name
    pub fn computed(name: &str, commands: &[&str]) -> Self {
        Self::new(name, commands, SkillBehavior::Computed(SkillKind::from_name(name)))
    }

    /// Create a skill with a fixed response
    pub fn fixed(name: &str, commands: &[&str], response: &str) -> Self {
        Self::new(name, commands, SkillBehavior::Fixed(response.to_string()))
    }

    /// Create a skill with random responses
    pub fn random(name: &str, commands: &[&str], choices: &[&str]) -> Self {
        let choices = choices.iter().map(|c| c.to_string()).collect();
        Self::new(name, commands, SkillBehavior::Random(choices))
    }

    fn new(name: &str, commands: &[&str], behavior: SkillBehavior) -> Self {
        Self {
            name: name.to_string(),
            commands: commands.iter().map(|c| c.to_string()).collect(),
            candidates: BTreeMap::new(),
            behavior,
            pattern: None,
        }
    }

    /// Attach a strftime pattern
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }

    /// Leaders tried during matching: the skill name, then each command
    pub fn leaders(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.commands.iter().map(String::as_str))
    }

    /// Whether `phrase` is a committed command
    pub fn has_command(&self, phrase: &str) -> bool {
        self.commands.iter().any(|c| c == phrase)
    }

    /// Current reinforcement count for a candidate phrase
    pub fn candidate(&self, phrase: &str) -> Option<u32> {
        self.candidates.get(phrase).copied()
    }
}

/// On-disk shape of a skill
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SkillRecord {
    #[serde(default)]
    commands: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    random: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
    // Older files predate candidates; start every skill with an empty map.
    #[serde(default)]
    candidates: BTreeMap<String, u32>,
}

impl SkillRecord {
    fn from_skill(skill: &Skill) -> Self {
        let (response, random) = match &skill.behavior {
            SkillBehavior::Fixed(text) => (Some(text.clone()), None),
            SkillBehavior::Random(choices) => (None, Some(choices.clone())),
            SkillBehavior::Computed(_) => (None, None),
        };
        Self {
            commands: skill.commands.clone(),
            response,
            random,
            pattern: skill.pattern.clone(),
            candidates: skill.candidates.clone(),
        }
    }

    fn into_skill(self, name: String) -> Skill {
        let behavior = match (self.response, self.random) {
            (Some(text), _) => SkillBehavior::Fixed(text),
            (None, Some(choices)) if !choices.is_empty() => SkillBehavior::Random(choices),
            _ => SkillBehavior::Computed(SkillKind::from_name(&name)),
        };
        let mut skill = Skill {
            name,
            commands: self.commands,
            candidates: self.candidates,
            behavior,
            pattern: self.pattern,
        };
        // A committed command is never also a candidate
        let commands = skill.commands.clone();
        skill.candidates.retain(|phrase, _| !commands.contains(phrase));
        skill
    }
}

/// Ordered collection of skills keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillTable {
    skills: Vec<Skill>,
}

impl SkillTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a skill, replacing any skill of the same name in place
    pub fn register(&mut self, skill: Skill) {
        match self.skills.iter_mut().find(|s| s.name == skill.name) {
            Some(existing) => {
                debug!("Replacing skill: {}", skill.name);
                *existing = skill;
            }
            None => {
                debug!("Registered skill: {}", skill.name);
                self.skills.push(skill);
            }
        }
    }

    /// Get a skill by name
    pub fn get(&self, name: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.name == name)
    }

    /// Get a mutable skill by name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Skill> {
        self.skills.iter_mut().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Skills in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter()
    }

    /// Skill names in registration order
    pub fn names(&self) -> Vec<String> {
        self.skills.iter().map(|s| s.name.clone()).collect()
    }

    /// Skill names sorted alphabetically
    pub fn sorted_names(&self) -> Vec<String> {
        let mut names = self.names();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl FromIterator<Skill> for SkillTable {
    fn from_iter<I: IntoIterator<Item = Skill>>(iter: I) -> Self {
        let mut table = SkillTable::new();
        for skill in iter {
            table.register(skill);
        }
        table
    }
}

impl Serialize for SkillTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.skills.len()))?;
        for skill in &self.skills {
            map.serialize_entry(&skill.name, &SkillRecord::from_skill(skill))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SkillTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = SkillTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object keyed by skill name")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut table = SkillTable::new();
                // Entries are visited in file order, which becomes match order
                while let Some((name, record)) = access.next_entry::<String, SkillRecord>()? {
                    table.register(record.into_skill(name));
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}
