//! Continuous listening
//!
//! Listens in fixed duty windows, feeding each heard phrase to the
//! assistant with the wake word required, until a skill asks to stop.
//! Only one phrase is ever in flight: the next window does not open until
//! the previous phrase, including any learning questions, is handled.

use std::time::Duration;
use tracing::info;

use super::session::Conversation;
use crate::assistant::{Assistant, Prompter};

/// What happened during a listening session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Windows that produced a phrase
    pub phrases: usize,
    /// Phrases that produced a response
    pub responses: usize,
}

/// Listen until a skill requests a stop
pub async fn listen_loop<C: Conversation>(
    assistant: &mut Assistant,
    conversation: &mut C,
    duty: Duration,
) -> LoopSummary {
    let mut summary = LoopSummary::default();
    conversation.say("Listening");

    loop {
        info!("{} is waiting in continuous mode...", assistant.alias());
        let Some(phrase) = conversation.next_phrase(duty).await else {
            continue;
        };
        summary.phrases += 1;

        let Some(result) = assistant.interpret(Some(&phrase), true, conversation) else {
            continue;
        };
        summary.responses += 1;

        if result.request_stop {
            info!("Stop requested by skill {}", result.skill.as_deref().unwrap_or("?"));
            break;
        }
    }

    summary
}
