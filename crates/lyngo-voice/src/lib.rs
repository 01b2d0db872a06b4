//! # Lyngo Voice - Receptionist Turn Pipeline
//!
//! One spoken or typed utterance in, a persona-flavored reply plus
//! synthesized speech out, with an optional second register and
//! partial-failure isolation per branch.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                       Turn Orchestrator                        │
//! │  ┌─────────────┐   ┌──────────────┐   ┌───────────────────┐  │
//! │  │ Transcriber │ → │ booking      │ → │ primary branch     │  │
//! │  │ (audio only)│   │ signal check │   │ generate → synth   │  │
//! │  └─────────────┘   └──────────────┘   └───────────────────┘  │
//! │                                        ┌───────────────────┐  │
//! │                          opt-in ────→  │ alternate branch   │  │
//! │                                        │ generate → synth   │  │
//! │                                        └───────────────────┘  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Transcription and primary-generation failures abort the turn; synthesis
//! and alternate-branch failures are recorded inside the [`TurnResult`] so
//! the caller can render whatever succeeded.

pub mod cancel;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod reply;
pub mod synthesize;
pub mod transcribe;
pub mod turn;

pub use cancel::CancelToken;
pub use config::{ElevenLabsConfig, OpenAiConfig, PersonaConfig, VoiceConfig};
pub use error::{Stage, StageFailure, VoiceError, VoiceResult};
pub use orchestrator::TurnOrchestrator;
pub use reply::{ChatApiGenerator, PlaceholderGenerator, ReplyGenerator};
pub use synthesize::{
    mime_for_output_format, ElevenLabsSynthesizer, PlaceholderSynthesizer, SpeechSynthesizer,
};
pub use transcribe::{PlaceholderTranscriber, Transcriber, WhisperApiTranscriber};
pub use turn::{
    detect_booking_signal, AudioArtifact, AudioEncoding, AudioPayload, ReplyResult, Transcript,
    TurnInput, TurnRequest, TurnResult, BOOKING_TRIGGER,
};
