//! Phrase utilities
//!
//! Whole-word prefix handling used for wake words and skill commands.
//! Matching is token based (split on whitespace) and case-insensitive, so
//! `"Panda  turn on"` starts with `"panda"` but `"Pandas turn on"` does not.

use std::borrow::Cow;
use tracing::trace;

/// Remove the leading words `leader` from `phrase`.
///
/// Returns the remaining words joined by single spaces when the first
/// words of `phrase` equal the words of `leader` (ignoring case). Otherwise
/// the original `phrase` is returned untouched as `Cow::Borrowed`, so
/// callers can compare against the input to detect "no match".
pub fn strip_leading<'a>(phrase: &'a str, leader: &str) -> Cow<'a, str> {
    let phrase_words: Vec<&str> = phrase.split_whitespace().collect();
    let leader_words: Vec<&str> = leader.split_whitespace().collect();

    if leader_words.is_empty() || leader_words.len() > phrase_words.len() {
        return Cow::Borrowed(phrase);
    }

    let matches = phrase_words
        .iter()
        .zip(&leader_words)
        .all(|(word, lead)| word.to_lowercase() == lead.to_lowercase());

    if !matches {
        return Cow::Borrowed(phrase);
    }

    let rest = phrase_words[leader_words.len()..].join(" ");
    trace!("strip_leading: {} => {}", leader, rest);
    Cow::Owned(rest)
}

/// [`strip_leading`] for an utterance that may be absent.
pub fn strip_leading_opt(phrase: Option<&str>, leader: &str) -> Option<String> {
    phrase.map(|p| strip_leading(p, leader).into_owned())
}

/// True when `leader` starts `phrase` as whole words.
pub fn has_leading(phrase: &str, leader: &str) -> bool {
    strip_leading(phrase, leader) != phrase
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_single_word() {
        assert_eq!(strip_leading("hello there", "hello"), "there");
        assert_eq!(strip_leading("hello", "hello"), "");
    }

    #[test]
    fn test_strip_is_case_insensitive() {
        assert_eq!(strip_leading("Panda turn on the lights", "panda"), "turn on the lights");
        assert_eq!(strip_leading("TELL me a joke", "tell Me"), "a joke");
    }

    #[test]
    fn test_strip_multi_word_leader() {
        assert_eq!(strip_leading("turn on the lights", "turn on"), "the lights");
        assert_eq!(strip_leading("what  is   the time", "what is"), "the time");
    }

    #[test]
    fn test_no_match_returns_original() {
        let phrase = "good   morning";
        let stripped = strip_leading(phrase, "hello");
        assert!(matches!(stripped, Cow::Borrowed(_)));
        assert_eq!(stripped, phrase);
        assert!(!has_leading(phrase, "hello"));
    }

    #[test]
    fn test_partial_word_does_not_match() {
        assert_eq!(strip_leading("hiking boots", "hi"), "hiking boots");
        assert!(!has_leading("Pandas are cute", "panda"));
    }

    #[test]
    fn test_leader_longer_than_phrase() {
        assert_eq!(strip_leading("turn", "turn on"), "turn");
        assert!(!has_leading("turn", "turn on"));
    }

    #[test]
    fn test_empty_leader_never_matches() {
        assert!(!has_leading("hello   there", ""));
        assert!(!has_leading("hello", "   "));
    }

    #[test]
    fn test_has_leading() {
        assert!(has_leading("help me please", "help me"));
        assert!(has_leading("hi", "HI"));
        assert!(!has_leading("", "hi"));
    }

    #[test]
    fn test_absent_phrase() {
        assert_eq!(strip_leading_opt(None, "panda"), None);
        assert_eq!(
            strip_leading_opt(Some("panda what time is it"), "panda").as_deref(),
            Some("what time is it")
        );
    }

    #[test]
    fn test_identity_when_not_leading() {
        for (phrase, leader) in [
            ("stop listening", "listening"),
            ("who are you", "who is"),
            ("  spaced  out ", "out"),
        ] {
            assert!(!has_leading(phrase, leader));
            assert_eq!(strip_leading(phrase, leader), phrase);
        }
    }
}
