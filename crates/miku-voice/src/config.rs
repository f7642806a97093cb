use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The single room every participant and the agent join.
pub const DEFAULT_ROOM: &str = "miku-room";

fn default_room() -> String {
    DEFAULT_ROOM.to_string()
}

fn default_token_ttl_seconds() -> u64 {
    3600
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LiveKitConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing)]
    pub api_secret: String,
    /// Room granted by issued tokens.
    #[serde(default = "default_room")]
    pub room: String,
    /// JWT token TTL in seconds for LiveKit join tokens. Default: 3600 (1 hour).
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,
}

impl Default for LiveKitConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            room: default_room(),
            token_ttl_seconds: default_token_ttl_seconds(),
        }
    }
}

impl fmt::Debug for LiveKitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveKitConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("room", &self.room)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

impl LiveKitConfig {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            ..Self::default()
        }
    }
}

/// Voice selection and rendering parameters sent with every synthesis
/// request. Fixed per deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceParams {
    /// BCP-47 language code, e.g. `hi-IN`.
    pub language_code: String,
    /// Provider voice identifier.
    pub voice_name: String,
    /// Output container, e.g. `MP3`.
    pub audio_encoding: String,
    /// Pitch offset in semitones.
    pub pitch: f32,
    /// Speaking-rate multiplier (1.0 is normal).
    pub speaking_rate: f32,
    /// Volume gain in dB.
    pub volume_gain_db: f32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            language_code: "hi-IN".to_string(),
            voice_name: "hi-IN-Wavenet-A".to_string(),
            audio_encoding: "MP3".to_string(),
            pitch: 3.0,
            speaking_rate: 0.88,
            volume_gain_db: 2.0,
        }
    }
}

fn default_speech_endpoint() -> String {
    "https://texttospeech.googleapis.com/v1/text:synthesize".to_string()
}

fn default_speech_timeout_secs() -> u64 {
    5
}

/// Connection settings for the speech provider.
#[derive(Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Provider API key. Empty disables synthesis.
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default = "default_speech_endpoint")]
    pub endpoint: String,
    /// Request timeout. Synthesis sits on the request path, so keep it short.
    #[serde(default = "default_speech_timeout_secs")]
    pub timeout_secs: u64,
    /// Voice fields sit directly in the speech table.
    #[serde(flatten)]
    pub voice: VoiceParams,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_speech_endpoint(),
            timeout_secs: default_speech_timeout_secs(),
            voice: VoiceParams::default(),
        }
    }
}

impl fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("api_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("voice", &self.voice)
            .finish()
    }
}

impl SpeechConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
