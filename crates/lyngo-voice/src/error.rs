//! Error types for the turn pipeline.
//!
//! Two layers: `VoiceError` is the fatal taxonomy that aborts a turn
//! (transcription failure, primary-generation failure, bad request config,
//! cancellation). `StageFailure` is the isolable record embedded inside an
//! otherwise-successful `TurnResult` (synthesis failures, alternate-branch
//! failures) so the caller can still render whatever succeeded.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type VoiceResult<T> = Result<T, VoiceError>;

/// Errors that abort a turn. Isolable failures never pass through here;
/// they are recorded as [`StageFailure`] inside the turn result instead.
#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Turn cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for VoiceError {
    fn from(err: reqwest::Error) -> Self {
        VoiceError::Http(err.to_string())
    }
}

/// Pipeline stage identifiers, used to annotate where a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Transcription,
    GenerationPrimary,
    GenerationAlternate,
    SynthesisPrimary,
    SynthesisAlternate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Transcription => "transcription",
            Stage::GenerationPrimary => "generation-primary",
            Stage::GenerationAlternate => "generation-alternate",
            Stage::SynthesisPrimary => "synthesis-primary",
            Stage::SynthesisAlternate => "synthesis-alternate",
        };
        f.write_str(s)
    }
}

/// A failure confined to one stage that did not abort the turn.
/// Rendered to callers alongside whatever the turn did produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub message: String,
}

impl StageFailure {
    pub fn new(stage: Stage, err: &VoiceError) -> Self {
        Self {
            stage,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.message)
    }
}
