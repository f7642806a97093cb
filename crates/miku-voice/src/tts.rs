use crate::config::{SpeechConfig, VoiceParams};
use crate::error::VoiceError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Maximum text input size for TTS. The provider rejects longer input, so
/// such requests fail before touching the network.
pub const MAX_TTS_INPUT_BYTES: usize = 5000;

/// Upper bound on the synthesis timeout, whatever the configuration says.
const MAX_TTS_TIMEOUT: Duration = Duration::from_secs(10);

/// Converts speech-safe text into encoded audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns the encoded audio, or `None` when synthesis is not configured.
    ///
    /// A returned buffer is never empty.
    async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceParams,
    ) -> Result<Option<Vec<u8>>, VoiceError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig<'a>,
}

#[derive(Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig<'a> {
    audio_encoding: &'a str,
    pitch: f32,
    speaking_rate: f32,
    volume_gain_db: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: Option<String>,
}

/// [`SpeechSynthesizer`] backed by Google Cloud Text-to-Speech.
#[derive(Debug, Clone)]
pub struct GoogleTts {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl GoogleTts {
    pub fn new(config: &SpeechConfig) -> Result<Self, VoiceError> {
        let timeout = config.timeout().clamp(Duration::from_secs(1), MAX_TTS_TIMEOUT);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VoiceError::Config(format!("failed to build TTS client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.trim().to_string(),
            timeout,
        })
    }

    /// Returns `true` if an API key is configured.
    pub fn is_enabled(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn request_body<'a>(text: &'a str, voice: &'a VoiceParams) -> SynthesizeRequest<'a> {
        SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: &voice.language_code,
                name: &voice.voice_name,
            },
            audio_config: AudioConfig {
                audio_encoding: &voice.audio_encoding,
                pitch: voice.pitch,
                speaking_rate: voice.speaking_rate,
                volume_gain_db: voice.volume_gain_db,
            },
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceParams,
    ) -> Result<Option<Vec<u8>>, VoiceError> {
        if !self.is_enabled() {
            tracing::debug!("speech synthesis disabled: no API key configured");
            return Ok(None);
        }

        if text.len() > MAX_TTS_INPUT_BYTES {
            return Err(VoiceError::Tts(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_TTS_INPUT_BYTES
            )));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::request_body(text, voice))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VoiceError::Tts(format!(
                        "TTS request timed out after {} seconds",
                        self.timeout.as_secs()
                    ))
                } else {
                    VoiceError::Tts(format!("TTS request failed: {}", e.without_url()))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Tts(format!(
                "TTS provider returned {}: {}",
                status.as_u16(),
                body.chars().take(512).collect::<String>()
            )));
        }

        let parsed: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::Tts(format!("malformed TTS response: {}", e)))?;

        let encoded = parsed
            .audio_content
            .filter(|content| !content.is_empty())
            .ok_or_else(|| VoiceError::Tts("TTS response has no audio content".to_string()))?;

        let audio = BASE64_STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| VoiceError::Tts(format!("TTS audio is not valid base64: {}", e)))?;

        if audio.is_empty() {
            return Err(VoiceError::Tts("TTS provider returned empty audio".to_string()));
        }

        Ok(Some(audio))
    }
}
