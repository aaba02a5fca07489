//! Shared types used across modules
//!
//! This module contains types that are used by multiple modules
//! to avoid circular dependencies.

use serde::{Deserialize, Serialize};

/// Speech recognition services the assistant knows about
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum SpeechService {
    #[default]
    #[value(name = "Google")]
    Google,
    #[value(name = "GoogleCloud")]
    GoogleCloud,
    #[value(name = "Sphinx")]
    Sphinx,
    #[serde(rename = "Wit.ai")]
    #[value(name = "Wit.ai")]
    WitAi,
    #[value(name = "Bing")]
    Bing,
    #[value(name = "Houndify")]
    Houndify,
    #[serde(rename = "IBM")]
    #[value(name = "IBM")]
    Ibm,
}

impl SpeechService {
    /// Display name, as users type it
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeechService::Google => "Google",
            SpeechService::GoogleCloud => "GoogleCloud",
            SpeechService::Sphinx => "Sphinx",
            SpeechService::WitAi => "Wit.ai",
            SpeechService::Bing => "Bing",
            SpeechService::Houndify => "Houndify",
            SpeechService::Ibm => "IBM",
        }
    }
}

impl std::fmt::Display for SpeechService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_cli_name() {
        use clap::ValueEnum;
        for service in SpeechService::value_variants() {
            let value = service.to_possible_value().unwrap();
            assert_eq!(value.get_name(), service.to_string());
        }
        assert_eq!(SpeechService::from_str("Wit.ai", false), Ok(SpeechService::WitAi));
    }

    #[test]
    fn test_service_serde_name() {
        let json = serde_json::to_string(&SpeechService::WitAi).unwrap();
        assert_eq!(json, "\"Wit.ai\"");
        let ibm: SpeechService = serde_json::from_str("\"IBM\"").unwrap();
        assert_eq!(ibm, SpeechService::Ibm);
    }
}
