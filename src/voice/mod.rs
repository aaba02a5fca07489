//! Voice input and output
//!
//! - Audio capture through an external recorder, with an energy gate
//! - Speech recognition through an external transcription program
//! - Spoken output through the system speech program
//! - The continuous listening loop

pub mod audio;
pub mod listen_loop;
pub mod recognizer;
pub mod session;
pub mod speaker;

pub use audio::{AudioClip, CommandMicrophone, MAX_PHRASE, SAMPLE_RATE};
pub use listen_loop::{listen_loop, LoopSummary};
pub use recognizer::{transcribe, CommandRecognizer, RecognitionError, SpeechRecognizer};
pub use session::{Conversation, VoiceIo};
pub use speaker::{LogSpeaker, Speaker, SystemSpeaker};
