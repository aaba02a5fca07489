//! End-to-end conversations through the public API

use panda_assistant::assistant::{Assistant, ScriptedPrompter};
use panda_assistant::clock::FixedClock;
use panda_assistant::learning::Reinforcer;
use panda_assistant::skills::{default_table, Skill, SkillStore, SkillTable, LIST_SEPARATOR};

use chrono::{Local, TimeZone};

fn store_in(dir: &tempfile::TempDir) -> SkillStore {
    SkillStore::new(
        dir.path().join("skills.json"),
        dir.path().join("modified_skills.json"),
    )
}

/// Answer "yes" for `target` and "no" for every other skill, in the order
/// the generalization round asks
fn answers_for(table: &SkillTable, target: &str) -> ScriptedPrompter {
    let mut prompter = ScriptedPrompter::default();
    for name in table.sorted_names() {
        prompter.push_reply(Some(if name == target { "yes" } else { "no" }));
    }
    prompter
}

#[test]
fn test_greeting_from_custom_table() {
    let table: SkillTable = [Skill::fixed("greeting", &["hello", "hi"], "Hello yourself!")]
        .into_iter()
        .collect();
    let mut assistant = Assistant::new("Panda", table, 3);
    let mut prompter = ScriptedPrompter::default();

    let result = assistant.interpret(Some("hello"), false, &mut prompter).unwrap();
    assert_eq!(result.skill.as_deref(), Some("greeting"));
    assert_eq!(result.response, "Hello yourself!");
    assert_eq!(prompter.transcript, vec!["Hello yourself!"]);
}

#[test]
fn test_turn_on_with_wake_word() {
    let mut assistant = Assistant::new("Panda", default_table("Panda"), 3);
    let mut prompter = ScriptedPrompter::default();

    let result = assistant
        .interpret(Some("Panda turn on the lights"), true, &mut prompter)
        .unwrap();
    assert_eq!(result.response, "I cannot turn on the lights");
    assert!(!result.request_stop);
}

#[test]
fn test_help_for_joke_lists_its_commands() {
    let mut assistant = Assistant::new("Panda", default_table("Panda"), 3);
    let mut prompter = ScriptedPrompter::default();

    let result = assistant
        .interpret(Some("panda help joke"), true, &mut prompter)
        .unwrap();
    let parts: Vec<&str> = result.response.split(LIST_SEPARATOR).collect();
    assert_eq!(&parts[1..], &["joke", "tell me a joke"]);
}

#[test]
fn test_date_with_fixed_clock() {
    let clock = FixedClock(Local.with_ymd_and_hms(2017, 4, 14, 12, 0, 0).unwrap());
    let mut assistant = Assistant::new("Panda", default_table("Panda"), 3).with_clock(clock);
    let mut prompter = ScriptedPrompter::default();

    let result = assistant
        .interpret(Some("Panda what is the date"), true, &mut prompter)
        .unwrap();
    assert_eq!(result.response, "Today is Friday 14 April 2017");
}

#[test]
fn test_reinforcement_promotes_after_threshold() {
    let mut table: SkillTable = [Skill::computed("weather", &["weather"])].into_iter().collect();
    let reinforcer = Reinforcer::new(3);

    for _ in 0..2 {
        assert!(reinforcer
            .increase_candidate(&mut table, "weather", "tell me the weather")
            .is_none());
    }
    let event = reinforcer
        .increase_candidate(&mut table, "weather", "tell me the weather")
        .unwrap();
    assert_eq!(
        event.to_string(),
        "I learned the command \"tell me the weather\" for the skill weather"
    );

    let weather = table.get("weather").unwrap();
    assert_eq!(weather.commands, vec!["weather", "tell me the weather"]);
    assert!(weather.candidates.is_empty());
}

#[test]
fn test_decrease_at_zero_forgets_candidate() {
    let mut table: SkillTable = [Skill::computed("weather", &["weather"])].into_iter().collect();
    table
        .get_mut("weather")
        .unwrap()
        .candidates
        .insert("is it raining".to_string(), 0);

    let event = Reinforcer::new(3).decrease_candidate(&mut table, "weather", "is it raining");
    assert!(event.is_some());
    assert_eq!(table.get("weather").unwrap().candidate("is it raining"), None);
}

#[test]
fn test_learning_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let phrase = "make me laugh";

    // Two sessions, each confirming the joke skill once
    for _ in 0..2 {
        let table = store.load("Panda").unwrap();
        let mut prompter = answers_for(&table, "joke");
        let mut assistant = Assistant::new("Panda", table, 2);

        let result = assistant.interpret(Some(phrase), false, &mut prompter).unwrap();
        assert_eq!(result.skill.as_deref(), Some("joke"));
        store.save(assistant.table()).unwrap();
    }

    // The third session matches directly, no questions asked
    let table = store.load("Panda").unwrap();
    assert!(table.get("joke").unwrap().has_command(phrase));

    let mut assistant = Assistant::new("Panda", table, 2);
    let mut prompter = ScriptedPrompter::default();
    let result = assistant.interpret(Some(phrase), false, &mut prompter).unwrap();
    assert_eq!(result.skill.as_deref(), Some("joke"));
    assert_eq!(prompter.transcript.len(), 1);
}

#[test]
fn test_reset_restores_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let mut table = store.load("Panda").unwrap();
    table.get_mut("joke").unwrap().commands.push("make me laugh".to_string());
    store.save(&table).unwrap();
    assert!(store.load("Panda").unwrap().get("joke").unwrap().has_command("make me laugh"));

    assert!(store.reset().unwrap());
    assert!(!store.reset().unwrap());
    assert_eq!(store.load("Panda").unwrap(), default_table("Panda"));
}

#[test]
fn test_declined_learning_changes_nothing() {
    let mut assistant = Assistant::new("Panda", default_table("Panda"), 3);
    let before = assistant.table().clone();
    let mut prompter = ScriptedPrompter::new(["skip"]);

    let result = assistant.interpret(Some("Panda sing a song"), true, &mut prompter);
    assert_eq!(result, None);
    assert_eq!(assistant.table(), &before);
    assert_eq!(prompter.remaining(), 0);
}
