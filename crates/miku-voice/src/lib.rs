//! Voice infrastructure for the Miku assistant.
//!
//! Three concerns live here:
//!
//! - **Speech synthesis**: [`SpeechSynthesizer`] and its Google Cloud
//!   Text-to-Speech implementation [`GoogleTts`], which turn speech-safe reply
//!   text into encoded audio.
//! - **Room credentials**: [`VoiceService`] issues LiveKit join tokens for
//!   the single assistant room.
//! - **Room agent**: [`RoomAgent`] joins the room as the assistant and
//!   acknowledges subscribed tracks. Audio transcription is not wired; the
//!   agent is a contract stub.

pub mod agent;
pub mod config;
pub mod error;
pub mod service;
pub mod tts;

pub use agent::{AgentSession, RoomAgent, AGENT_DISPLAY_NAME, AGENT_IDENTITY};
pub use config::{LiveKitConfig, SpeechConfig, VoiceParams, DEFAULT_ROOM};
pub use error::VoiceError;
pub use service::VoiceService;
pub use tts::{GoogleTts, SpeechSynthesizer, MAX_TTS_INPUT_BYTES};
