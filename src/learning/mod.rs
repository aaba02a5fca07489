//! Adaptive learning for unrecognized phrases
//!
//! When no command matches, the assistant asks which skill was meant and
//! reinforces the phrase as a candidate command for that skill. Candidates
//! confirmed often enough are promoted to permanent commands.

pub mod reinforcement;
pub mod session;

pub use reinforcement::{CandidateEvent, Reinforcer, DEFAULT_SKILL_THRESHOLD};
pub use session::{Answer, LearningOutcome, LearningSession, LearningState, LearningStep};
