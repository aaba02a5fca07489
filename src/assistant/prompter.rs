//! The conversational side channel the interpreter talks through

use std::collections::VecDeque;

/// Speaks to the user and collects short replies
pub trait Prompter {
    /// Say something without waiting for a reply
    fn say(&mut self, text: &str);

    /// Ask a question and wait for one utterance. Silence, a timeout, or a
    /// recognition failure all yield `None`.
    fn ask(&mut self, question: &str) -> Option<String>;

    /// Listen for a command after the wake word was said on its own
    fn listen(&mut self) -> Option<String> {
        self.ask("Listening")
    }
}

/// Prompter that replays canned replies and records everything said.
/// Used for text-driven sessions and tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    replies: VecDeque<Option<String>>,
    /// Everything spoken, questions included, in order
    pub transcript: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: replies.into_iter().map(|r| Some(r.into())).collect(),
            transcript: Vec::new(),
        }
    }

    /// Queue a reply; `None` simulates silence
    pub fn push_reply(&mut self, reply: Option<&str>) {
        self.replies.push_back(reply.map(str::to_string));
    }

    /// Replies not yet consumed
    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn say(&mut self, text: &str) {
        if !text.is_empty() {
            self.transcript.push(text.to_string());
        }
    }

    fn ask(&mut self, question: &str) -> Option<String> {
        self.say(question);
        self.replies.pop_front().flatten()
    }
}
