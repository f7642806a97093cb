//! Runs one conversation turn end to end.

use crate::error::TurnError;
use crate::persona::{compile_instructions, HISTORY_WINDOW};
use crate::reply::{extract_emotion, speech_text, stray_annotations};
use miku_history::{HistoryError, HistoryStore};
use miku_llm::{GenerationParams, LanguageModel};
use miku_types::{Emotion, Message, Role, UserId};
use miku_voice::{SpeechSynthesizer, VoiceParams};
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Identity of the caller a turn runs on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: UserId,
}

impl UserContext {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

/// What the caller gets back from a successful turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResult {
    /// Raw model output, persona tag included.
    pub reply: String,
    pub emotion: Emotion,
    /// Encoded audio, absent when synthesis was skipped or failed.
    pub audio: Option<Vec<u8>>,
}

/// How the synthesis step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisStatus {
    Synthesized,
    /// Nothing left to voice after post-processing.
    Skipped,
    /// No synthesis provider configured.
    Disabled,
    Failed,
}

/// Degradation record for a completed turn. Logged, never sent to clients.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnDiagnostics {
    pub turn_id: Uuid,
    pub history_used: usize,
    pub inbound_persisted: bool,
    pub outbound_persisted: bool,
    pub stray_annotations: usize,
    pub synthesis: SynthesisStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub result: TurnResult,
    pub diagnostics: TurnDiagnostics,
}

/// Sequences history, generation and synthesis for a turn.
///
/// Holds no per-turn state; one instance serves every request.
#[derive(Clone)]
pub struct TurnOrchestrator {
    history: Arc<dyn HistoryStore>,
    model: Arc<dyn LanguageModel>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    generation: GenerationParams,
    voice: VoiceParams,
}

impl TurnOrchestrator {
    pub fn new(
        history: Arc<dyn HistoryStore>,
        model: Arc<dyn LanguageModel>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            history,
            model,
            synthesizer,
            generation: GenerationParams::default(),
            voice: VoiceParams::default(),
        }
    }

    pub fn with_generation_params(mut self, params: GenerationParams) -> Self {
        self.generation = params;
        self
    }

    pub fn with_voice(mut self, voice: VoiceParams) -> Self {
        self.voice = voice;
        self
    }

    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }

    /// Runs a turn on its own task so that dropping the caller's future
    /// does not interrupt persistence.
    pub async fn run_detached(
        &self,
        ctx: UserContext,
        utterance: Option<String>,
    ) -> Result<TurnOutcome, TurnError> {
        let this = self.clone();
        tokio::spawn(async move { this.run_turn(&ctx, utterance.as_deref()).await })
            .await
            .map_err(|e| TurnError::Interrupted(e.to_string()))?
    }

    /// Runs one turn for `ctx`.
    ///
    /// Fails only on empty input or a generation failure. History and
    /// synthesis failures are logged and reflected in the diagnostics.
    pub async fn run_turn(
        &self,
        ctx: &UserContext,
        utterance: Option<&str>,
    ) -> Result<TurnOutcome, TurnError> {
        let utterance = match utterance {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Err(TurnError::InvalidInput("No text provided".to_string())),
        };

        let turn_id = Uuid::new_v4();
        let span = info_span!("turn", turn_id = %turn_id, user_id = %ctx.user_id);
        self.execute(turn_id, ctx.user_id, utterance)
            .instrument(span)
            .await
    }

    async fn execute(
        &self,
        turn_id: Uuid,
        user_id: UserId,
        utterance: &str,
    ) -> Result<TurnOutcome, TurnError> {
        let inbound = self.persist_inbound(user_id, utterance).await;
        let history = match &inbound {
            Some(message) => self.load_history(user_id, message.id).await,
            None => Vec::new(),
        };

        let instructions = compile_instructions(&history, utterance);
        let reply = match self.model.generate(&instructions, &self.generation).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "generation failed");
                return Err(TurnError::Generation(e));
            }
        };

        let outbound_persisted = match self
            .history
            .append_message(user_id, Role::Assistant, &reply)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "failed to persist reply");
                false
            }
        };

        let stray = stray_annotations(&reply);
        if stray > 0 {
            warn!(stray_annotations = stray, "reply carries annotations beyond the leading tag");
        }

        let emotion = extract_emotion(&reply);
        let (audio, synthesis) = self.synthesize(&speech_text(&reply)).await;

        let diagnostics = TurnDiagnostics {
            turn_id,
            history_used: history.len(),
            inbound_persisted: inbound.is_some(),
            outbound_persisted,
            stray_annotations: stray,
            synthesis,
        };
        info!(
            history_used = diagnostics.history_used,
            inbound_persisted = diagnostics.inbound_persisted,
            outbound_persisted = diagnostics.outbound_persisted,
            synthesis = ?diagnostics.synthesis,
            emotion = %emotion,
            "turn complete"
        );

        Ok(TurnOutcome {
            result: TurnResult {
                reply,
                emotion,
                audio,
            },
            diagnostics,
        })
    }

    async fn persist_inbound(&self, user_id: UserId, utterance: &str) -> Option<Message> {
        match self.store_inbound(user_id, utterance).await {
            Ok(message) => Some(message),
            Err(e) => {
                warn!(error = %e, "history unavailable, continuing without context");
                None
            }
        }
    }

    async fn store_inbound(&self, user_id: UserId, utterance: &str) -> Result<Message, HistoryError> {
        self.history.get_or_create_user(user_id).await?;
        self.history
            .append_message(user_id, Role::User, utterance)
            .await
    }

    /// Loads the history window preceding the inbound message `inbound_id`.
    async fn load_history(&self, user_id: UserId, inbound_id: i64) -> Vec<Message> {
        let limit = (HISTORY_WINDOW + 1) as u32;
        match self.history.recent_messages(user_id, limit).await {
            Ok(mut messages) => {
                messages.retain(|m| m.id != inbound_id);
                let excess = messages.len().saturating_sub(HISTORY_WINDOW);
                messages.split_off(excess)
            }
            Err(e) => {
                warn!(error = %e, "failed to read history");
                Vec::new()
            }
        }
    }

    async fn synthesize(&self, text: &str) -> (Option<Vec<u8>>, SynthesisStatus) {
        if text.is_empty() {
            return (None, SynthesisStatus::Skipped);
        }

        match self.synthesizer.synthesize(text, &self.voice).await {
            Ok(Some(audio)) if !audio.is_empty() => (Some(audio), SynthesisStatus::Synthesized),
            Ok(Some(_)) => {
                warn!("synthesizer returned empty audio");
                (None, SynthesisStatus::Failed)
            }
            Ok(None) => (None, SynthesisStatus::Disabled),
            Err(e) => {
                warn!(error = %e, "speech synthesis failed");
                (None, SynthesisStatus::Failed)
            }
        }
    }
}
