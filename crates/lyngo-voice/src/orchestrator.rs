//! **TurnOrchestrator** — the turn state machine.
//!
//! Drives one turn through
//! `Received → Transcribing → Generating(primary) → Synthesizing(primary)
//! → [Generating(alternate) → Synthesizing(alternate)]? → Completed`.
//! `Transcribing` is skipped for text input. Transcription and
//! primary-generation failures are fatal; every synthesis failure and any
//! alternate-branch failure is isolated into the result so the caller can
//! render whatever succeeded. The primary and alternate branches share no
//! data after the transcript and run concurrently.

use crate::cancel::CancelToken;
use crate::config::{PersonaConfig, VoiceConfig};
use crate::error::{Stage, StageFailure, VoiceError, VoiceResult};
use crate::reply::ReplyGenerator;
use crate::synthesize::SpeechSynthesizer;
use crate::transcribe::Transcriber;
use crate::turn::{
    detect_booking_signal, AudioArtifact, ReplyResult, Transcript, TurnInput, TurnRequest,
    TurnResult,
};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Turn lifecycle states, logged at each transition. There is no `Failed`
/// terminal state: isolable failures still end in `Completed`, and fatal
/// errors surface before any result exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnState {
    Received,
    Transcribing,
    Generating(Branch),
    Synthesizing(Branch),
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    Primary,
    Alternate,
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnState::Received => write!(f, "received"),
            TurnState::Transcribing => write!(f, "transcribing"),
            TurnState::Generating(Branch::Primary) => write!(f, "generating-primary"),
            TurnState::Generating(Branch::Alternate) => write!(f, "generating-alternate"),
            TurnState::Synthesizing(Branch::Primary) => write!(f, "synthesizing-primary"),
            TurnState::Synthesizing(Branch::Alternate) => write!(f, "synthesizing-alternate"),
            TurnState::Completed => write!(f, "completed"),
        }
    }
}

fn enter(state: TurnState) {
    debug!(state = %state, "turn state");
}

/// Orchestrates one turn across the three downstream services. Holds only
/// the adapters; all per-turn data arrives in the [`TurnRequest`] and dies
/// with the [`TurnResult`].
pub struct TurnOrchestrator {
    transcriber: Arc<dyn Transcriber>,
    generator: Arc<dyn ReplyGenerator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl TurnOrchestrator {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        generator: Arc<dyn ReplyGenerator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            transcriber,
            generator,
            synthesizer,
        }
    }

    /// Run one full turn. Fatal errors (transcription, primary generation,
    /// malformed request, cancellation before the primary result) surface
    /// as `Err` with no partial result; everything else completes with
    /// failures recorded inside the [`TurnResult`].
    pub async fn run_turn(
        &self,
        request: TurnRequest,
        cancel: CancelToken,
    ) -> VoiceResult<TurnResult> {
        enter(TurnState::Received);
        let alternate_persona = match (request.want_alternate, request.alternate_persona) {
            (true, None) => {
                return Err(VoiceError::Config(
                    "alternate branch requested without an alternate persona".to_string(),
                ))
            }
            (true, Some(persona)) => Some(persona),
            (false, _) => None,
        };

        let transcript = self.resolve_transcript(request.input, &cancel).await?;
        info!(transcript = %transcript.text, "transcript resolved");

        // Pure derivation from the transcript, computed exactly once and
        // independent of how the branches fare.
        let booking_signal = detect_booking_signal(&transcript.text);
        if booking_signal {
            info!("booking signal detected in transcript");
        }

        let primary = self.run_branch(
            &transcript,
            &request.primary_persona,
            &request.voice,
            Branch::Primary,
            &cancel,
        );

        let (primary_outcome, alternate_outcome) = match alternate_persona {
            Some(ref persona) => {
                let alternate =
                    self.run_branch(&transcript, persona, &request.voice, Branch::Alternate, &cancel);
                let (p, a) = tokio::join!(primary, alternate);
                (p, Some(a))
            }
            None => (primary.await, None),
        };

        // Primary generation failure (or cancellation) is fatal.
        let (primary_reply, primary_audio) = primary_outcome?;

        // The alternate branch degrades to "not available" on any failure.
        let (alternate_reply, alternate_audio) = match alternate_outcome {
            Some(Ok((reply, audio))) => (Some(reply), Some(audio)),
            Some(Err(err)) => {
                warn!(error = %err, "alternate branch unavailable");
                (None, None)
            }
            None => (None, None),
        };

        enter(TurnState::Completed);
        Ok(TurnResult {
            transcript,
            primary_reply,
            primary_audio,
            alternate_reply,
            alternate_audio,
            booking_signal,
        })
    }

    /// Resolve the transcript: call the transcriber for audio input, take
    /// the text verbatim otherwise. An empty or whitespace-only transcript
    /// cannot seed a meaningful reply and is fatal here, before any
    /// downstream call happens.
    async fn resolve_transcript(
        &self,
        input: TurnInput,
        cancel: &CancelToken,
    ) -> VoiceResult<Transcript> {
        let transcript = match input {
            TurnInput::Audio(payload) => {
                enter(TurnState::Transcribing);
                with_cancel(cancel, self.transcriber.transcribe(&payload)).await?
            }
            TurnInput::Text(text) => Transcript::new(text),
        };
        if transcript.text.trim().is_empty() {
            return Err(VoiceError::Transcription(
                "transcript is empty".to_string(),
            ));
        }
        Ok(transcript)
    }

    /// Generate and synthesize for one persona. A generation error (or
    /// cancellation) propagates as `Err`; a synthesis error is isolated
    /// into the returned audio slot, annotated with the branch's stage.
    async fn run_branch(
        &self,
        transcript: &Transcript,
        persona: &PersonaConfig,
        voice: &VoiceConfig,
        branch: Branch,
        cancel: &CancelToken,
    ) -> VoiceResult<(ReplyResult, Result<AudioArtifact, StageFailure>)> {
        enter(TurnState::Generating(branch));
        let reply = with_cancel(cancel, self.generator.generate(transcript, persona)).await?;

        enter(TurnState::Synthesizing(branch));
        let synthesis_stage = match branch {
            Branch::Primary => Stage::SynthesisPrimary,
            Branch::Alternate => Stage::SynthesisAlternate,
        };
        let audio = match with_cancel(cancel, self.synthesizer.synthesize(&reply, voice)).await {
            Ok(artifact) => Ok(artifact),
            Err(err) => {
                warn!(stage = %synthesis_stage, error = %err, "synthesis failed; reply text still surfaces");
                Err(StageFailure::new(synthesis_stage, &err))
            }
        };
        Ok((reply, audio))
    }
}

/// Race a service call against the turn's cancellation token.
async fn with_cancel<T, F>(cancel: &CancelToken, fut: F) -> VoiceResult<T>
where
    F: Future<Output = VoiceResult<T>>,
{
    tokio::select! {
        // Cancellation wins over an already-ready call result.
        biased;
        _ = cancel.cancelled() => Err(VoiceError::Cancelled),
        res = fut => res,
    }
}
