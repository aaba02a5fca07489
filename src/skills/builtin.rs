//! Built-in skill table
//!
//! Used when no skills file exists yet. More precise commands come first
//! within each skill ("help me" before "help").

use super::table::{Skill, SkillTable};

/// Pattern used by the date skill
pub const DATE_PATTERN: &str = "Today is %A %d %B %Y";

/// Pattern used by the time skill
pub const TIME_PATTERN: &str = "It is now %H:%M";

/// Build the default skill table. `alias` is the assistant's wake word,
/// which the identity skill introduces itself with.
pub fn default_table(alias: &str) -> SkillTable {
    [
        Skill::computed("help", &["help me", "help"]),
        Skill::computed(
            "date",
            &[
                "date",
                "what date is it",
                "what's the date",
                "what is the date",
                "what day is it",
            ],
        )
        .with_pattern(DATE_PATTERN),
        Skill::computed(
            "time",
            &["time", "what time is it", "what's the time", "what is the time"],
        )
        .with_pattern(TIME_PATTERN),
        Skill::random(
            "joke",
            &["joke", "tell me a joke"],
            &["Knock knock. Who's there? Amish. Amish who? You're not a shoe!"],
        ),
        Skill::random(
            "riddle",
            &["riddle", "tell me a riddle", "ask me a riddle"],
            &[
                "What's long, brown, and sticky? ... A stick!",
                "What's orange and sounds like a parrot? ... A carrot!",
            ],
        ),
        Skill::computed("turn on", &["turn on", "enable"]),
        Skill::fixed(
            "turn off",
            &["turn off", "disable"],
            "There is currently nothing on to turn off.",
        ),
        Skill::fixed(
            "greeting",
            &["hello", "hi", "good morning", "good day", "good evening"],
            "Hello yourself!",
        ),
        Skill::fixed(
            "farewell",
            &["goodbye", "bye", "goodnight", "good night", "sayonara"],
            "But we are just getting started!",
        ),
        Skill::computed("quit", &["stop listening"]),
        Skill::fixed(
            "identity",
            &[
                "who are you",
                "where did you come from",
                "who made you",
                "how old are you",
            ],
            &format!("My real name is {} and I was created by Kevin in April 2017.", alias),
        ),
    ]
    .into_iter()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::table::{SkillBehavior, SkillKind};

    #[test]
    fn test_default_table_contents() {
        let table = default_table("Panda");
        assert_eq!(table.len(), 11);
        assert_eq!(
            table.get("quit").unwrap().behavior,
            SkillBehavior::Computed(SkillKind::Quit)
        );
        assert_eq!(table.get("date").unwrap().pattern.as_deref(), Some(DATE_PATTERN));
    }

    #[test]
    fn test_identity_uses_alias() {
        let table = default_table("Koala");
        match &table.get("identity").unwrap().behavior {
            SkillBehavior::Fixed(text) => assert!(text.starts_with("My real name is Koala")),
            other => panic!("unexpected behavior: {:?}", other),
        }
    }

    #[test]
    fn test_help_prefers_specific_command() {
        let table = default_table("Panda");
        assert_eq!(table.get("help").unwrap().commands[0], "help me");
    }
}
