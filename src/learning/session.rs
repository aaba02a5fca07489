//! Learning session - the clarifying-question protocol for unmatched phrases
//!
//! A session is a resumable state object. Each call to [`LearningSession::step`]
//! takes the user's answer to the previous question (if any) and returns
//! either the next question or a final outcome, so the protocol can be driven
//! by a live microphone, a script, or a test without any blocking inside.
//!
//! ```text
//! ScanKnownSkills ──(no skill confirmed)──> GeneralizeSkill ──(exhausted)──> LearnNewSkill
//!        │                                     │      │
//!        └──────────(yes)──> Confirmed <──(yes)┘      └──(skip/stop)──> Aborted
//! ```

use tracing::{debug, info};

use super::reinforcement::{CandidateEvent, Reinforcer};
use crate::skills::SkillTable;

/// Answers that confirm a skill
pub const AFFIRMATIVE_WORDS: &[&str] = &["yes", "yup", "yeah", "affirmative"];

/// Answers that abandon the generalization round
pub const ABORT_WORDS: &[&str] = &["skip", "stop"];

/// Spoken before asking about every skill
pub const GENERALIZE_NOTICE: &str = "I do not know which skill you want to use.";

/// How a spoken answer is understood
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Affirmative,
    Abort,
    /// Anything else, including silence
    Negative,
}

impl Answer {
    /// Classify an utterance by its first word
    pub fn classify(utterance: Option<&str>) -> Self {
        let first = utterance
            .and_then(|u| u.split_whitespace().next())
            .map(|w| {
                w.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .unwrap_or_default();

        if AFFIRMATIVE_WORDS.contains(&first.as_str()) {
            Answer::Affirmative
        } else if ABORT_WORDS.contains(&first.as_str()) {
            Answer::Abort
        } else {
            Answer::Negative
        }
    }
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LearningOutcome {
    /// The user confirmed a skill; the phrase should be dispatched to it
    Confirmed { skill: String },
    /// The user asked to skip learning
    Aborted,
    /// No existing skill fits; creating new skills is not supported yet
    NewSkillUnsupported,
}

/// Where the session is in the protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LearningState {
    /// Asking about skills whose name appears in the phrase
    ScanKnownSkills { next: usize },
    /// Asking about every skill, alphabetically
    GeneralizeSkill { next: usize },
    /// Extension point for building a brand new skill
    LearnNewSkill,
    Finished(LearningOutcome),
}

/// What the session needs next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LearningStep {
    /// Speak `notice` (if any), ask `question`, and feed the answer back
    Ask {
        notice: Option<String>,
        skill: String,
        question: String,
    },
    Finished(LearningOutcome),
}

/// One run of the learning protocol for a single phrase
#[derive(Debug, Clone)]
pub struct LearningSession {
    phrase: String,
    state: LearningState,
    /// Skills named inside the phrase, in table order
    named: Vec<String>,
    /// Every skill, sorted by name
    all: Vec<String>,
    /// Skill the last question asked about
    pending: Option<String>,
    events: Vec<CandidateEvent>,
}

impl LearningSession {
    /// Start a session for an unmatched phrase
    pub fn new(phrase: &str, table: &SkillTable) -> Self {
        let phrase = normalize(phrase);
        let named = table
            .iter()
            .filter(|s| phrase.contains(&s.name.to_lowercase()))
            .map(|s| s.name.clone())
            .collect();

        debug!("Learning session for \"{}\" (named skills: {:?})", phrase, named);
        Self {
            phrase,
            state: LearningState::ScanKnownSkills { next: 0 },
            named,
            all: table.sorted_names(),
            pending: None,
            events: Vec::new(),
        }
    }

    /// The phrase being learned, lowercased with single spaces
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn state(&self) -> &LearningState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, LearningState::Finished(_))
    }

    /// Candidate promotions and removals since the last call
    pub fn take_events(&mut self) -> Vec<CandidateEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance the protocol.
    ///
    /// `answer` is the reply to the previous [`LearningStep::Ask`]; it is
    /// ignored on the first call. An absent answer counts as "no".
    pub fn step(
        &mut self,
        table: &mut SkillTable,
        reinforcer: &Reinforcer,
        answer: Option<&str>,
    ) -> LearningStep {
        if let Some(skill) = self.pending.take() {
            match Answer::classify(answer) {
                Answer::Affirmative => {
                    self.events
                        .extend(reinforcer.increase_candidate(table, &skill, &self.phrase));
                    info!("\"{}\" confirmed for skill {}", self.phrase, skill);
                    return self.finish(LearningOutcome::Confirmed { skill });
                }
                Answer::Abort if matches!(self.state, LearningState::GeneralizeSkill { .. }) => {
                    info!("Learning skipped for \"{}\"", self.phrase);
                    return self.finish(LearningOutcome::Aborted);
                }
                _ => {
                    self.events
                        .extend(reinforcer.decrease_candidate(table, &skill, &self.phrase));
                }
            }
        }

        loop {
            match self.state.clone() {
                LearningState::ScanKnownSkills { next } => match self.named.get(next).cloned() {
                    Some(skill) => {
                        self.state = LearningState::ScanKnownSkills { next: next + 1 };
                        return self.ask(skill, None);
                    }
                    None => self.state = LearningState::GeneralizeSkill { next: 0 },
                },
                LearningState::GeneralizeSkill { next } => match self.all.get(next).cloned() {
                    Some(skill) => {
                        self.state = LearningState::GeneralizeSkill { next: next + 1 };
                        let notice = (next == 0).then(|| GENERALIZE_NOTICE.to_string());
                        return self.ask(skill, notice);
                    }
                    None => self.state = LearningState::LearnNewSkill,
                },
                LearningState::LearnNewSkill => {
                    debug!("No skill accepted \"{}\"", self.phrase);
                    return self.finish(LearningOutcome::NewSkillUnsupported);
                }
                LearningState::Finished(outcome) => return LearningStep::Finished(outcome),
            }
        }
    }

    fn ask(&mut self, skill: String, notice: Option<String>) -> LearningStep {
        let question = format!("Do you mean the skill {}?", skill);
        self.pending = Some(skill.clone());
        LearningStep::Ask {
            notice,
            skill,
            question,
        }
    }

    fn finish(&mut self, outcome: LearningOutcome) -> LearningStep {
        self.state = LearningState::Finished(outcome.clone());
        LearningStep::Finished(outcome)
    }
}

fn normalize(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::Skill;

    fn table() -> SkillTable {
        [
            Skill::fixed("joke", &["joke"], "Ha"),
            Skill::fixed("greeting", &["hello"], "Hello yourself!"),
            Skill::computed("date", &["date"]),
        ]
        .into_iter()
        .collect()
    }

    fn asked_skill(step: &LearningStep) -> &str {
        match step {
            LearningStep::Ask { skill, .. } => skill,
            other => panic!("expected a question, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_answers() {
        assert_eq!(Answer::classify(Some("Yes")), Answer::Affirmative);
        assert_eq!(Answer::classify(Some("yeah sure")), Answer::Affirmative);
        assert_eq!(Answer::classify(Some("affirmative.")), Answer::Affirmative);
        assert_eq!(Answer::classify(Some("skip")), Answer::Abort);
        assert_eq!(Answer::classify(Some("Stop")), Answer::Abort);
        assert_eq!(Answer::classify(Some("no")), Answer::Negative);
        assert_eq!(Answer::classify(Some("")), Answer::Negative);
        assert_eq!(Answer::classify(None), Answer::Negative);
    }

    #[test]
    fn test_named_skill_confirmed() {
        let mut table = table();
        let reinforcer = Reinforcer::new(3);
        let mut session = LearningSession::new("Another  JOKE please", &table);
        assert_eq!(session.phrase(), "another joke please");

        let step = session.step(&mut table, &reinforcer, None);
        assert_eq!(
            step,
            LearningStep::Ask {
                notice: None,
                skill: "joke".to_string(),
                question: "Do you mean the skill joke?".to_string(),
            }
        );

        let step = session.step(&mut table, &reinforcer, Some("yes"));
        assert_eq!(
            step,
            LearningStep::Finished(LearningOutcome::Confirmed {
                skill: "joke".to_string()
            })
        );
        assert!(session.is_finished());
        assert_eq!(table.get("joke").unwrap().candidate("another joke please"), Some(1));
        assert!(session.take_events().is_empty());
    }

    #[test]
    fn test_rejected_named_skill_moves_to_generalize() {
        let mut table = table();
        table
            .get_mut("joke")
            .unwrap()
            .candidates
            .insert("one more joke".to_string(), 1);
        let reinforcer = Reinforcer::new(3);
        let mut session = LearningSession::new("one more joke", &table);

        let step = session.step(&mut table, &reinforcer, None);
        assert_eq!(asked_skill(&step), "joke");

        // Silence counts as "no"
        let step = session.step(&mut table, &reinforcer, None);
        match &step {
            LearningStep::Ask { notice, skill, .. } => {
                assert_eq!(notice.as_deref(), Some(GENERALIZE_NOTICE));
                assert_eq!(skill, "date");
            }
            other => panic!("expected a question, got {:?}", other),
        }
        assert_eq!(table.get("joke").unwrap().candidate("one more joke"), Some(0));
    }

    #[test]
    fn test_generalize_walks_sorted_skills() {
        let mut table = table();
        let reinforcer = Reinforcer::new(3);
        let mut session = LearningSession::new("say something nice", &table);

        let mut asked = Vec::new();
        let mut step = session.step(&mut table, &reinforcer, None);
        while let LearningStep::Ask { skill, .. } = &step {
            asked.push(skill.clone());
            let answer = if skill == "greeting" { "yup" } else { "nope" };
            step = session.step(&mut table, &reinforcer, Some(answer));
        }

        assert_eq!(asked, vec!["date", "greeting"]);
        assert_eq!(
            step,
            LearningStep::Finished(LearningOutcome::Confirmed {
                skill: "greeting".to_string()
            })
        );
        assert_eq!(table.get("greeting").unwrap().candidate("say something nice"), Some(1));
    }

    #[test]
    fn test_skip_aborts_without_reinforcement() {
        let mut table = table();
        let reinforcer = Reinforcer::new(3);
        let before = table.clone();
        let mut session = LearningSession::new("make coffee", &table);

        let step = session.step(&mut table, &reinforcer, None);
        assert_eq!(asked_skill(&step), "date");
        let step = session.step(&mut table, &reinforcer, Some("skip"));
        assert_eq!(step, LearningStep::Finished(LearningOutcome::Aborted));
        assert_eq!(table, before);
    }

    #[test]
    fn test_stop_during_scan_is_a_no() {
        let mut table = table();
        let reinforcer = Reinforcer::new(3);
        let mut session = LearningSession::new("date night ideas", &table);

        let step = session.step(&mut table, &reinforcer, None);
        assert_eq!(asked_skill(&step), "date");
        let step = session.step(&mut table, &reinforcer, Some("stop"));
        assert!(matches!(step, LearningStep::Ask { .. }));
        assert!(matches!(session.state(), LearningState::GeneralizeSkill { .. }));
    }

    #[test]
    fn test_exhausted_reaches_learn_new_skill() {
        let mut table = table();
        let reinforcer = Reinforcer::new(3);
        let mut session = LearningSession::new("open the pod bay doors", &table);

        let mut questions = 0;
        let mut step = session.step(&mut table, &reinforcer, None);
        while matches!(step, LearningStep::Ask { .. }) {
            questions += 1;
            step = session.step(&mut table, &reinforcer, Some("no"));
        }

        assert_eq!(questions, 3);
        assert_eq!(step, LearningStep::Finished(LearningOutcome::NewSkillUnsupported));
        // Stepping a finished session repeats the outcome
        assert_eq!(
            session.step(&mut table, &reinforcer, Some("yes")),
            LearningStep::Finished(LearningOutcome::NewSkillUnsupported)
        );
        for skill in table.iter() {
            assert!(skill.candidates.is_empty());
        }
    }

    #[test]
    fn test_repeated_confirmation_emits_learned_event() {
        let mut table = table();
        let reinforcer = Reinforcer::new(2);

        for round in 0..2 {
            let mut session = LearningSession::new("tell me something funny", &table);
            let step = session.step(&mut table, &reinforcer, None);
            assert_eq!(asked_skill(&step), "date");
            let step = session.step(&mut table, &reinforcer, Some("no"));
            assert_eq!(asked_skill(&step), "greeting");
            let step = session.step(&mut table, &reinforcer, Some("no"));
            assert_eq!(asked_skill(&step), "joke");
            session.step(&mut table, &reinforcer, Some("yes"));

            let events = session.take_events();
            if round == 0 {
                assert!(events.is_empty());
            } else {
                assert_eq!(
                    events,
                    vec![CandidateEvent::Learned {
                        skill: "joke".to_string(),
                        phrase: "tell me something funny".to_string(),
                    }]
                );
            }
        }
        assert!(table.get("joke").unwrap().has_command("tell me something funny"));
    }
}
