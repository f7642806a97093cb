//! Conversation turn pipeline for the Miku assistant.
//!
//! A turn takes one utterance, records it, asks the language model for an
//! in-character reply given the recent history, records the reply and voices
//! it. Only generation is fatal; persistence and synthesis degrade.

pub mod error;
pub mod orchestrator;
pub mod persona;
pub mod reply;

pub use error::TurnError;
pub use orchestrator::{
    SynthesisStatus, TurnDiagnostics, TurnOrchestrator, TurnOutcome, TurnResult, UserContext,
};
pub use persona::{compile_instructions, window_history, HISTORY_WINDOW, PERSONA_DIRECTIVE};
pub use reply::{extract_emotion, speech_text, stray_annotations};
