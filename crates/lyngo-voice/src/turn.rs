//! Per-turn data model: everything a single turn creates and delivers.
//!
//! All entities here live for exactly one turn. They are built fresh when a
//! `TurnRequest` arrives and dropped once the `TurnResult` is delivered;
//! nothing is shared across turns.

use crate::config::{PersonaConfig, VoiceConfig};
use crate::error::StageFailure;
use serde::{Deserialize, Serialize};

/// Trigger term for the booking boundary signal (case-insensitive substring).
pub const BOOKING_TRIGGER: &str = "book";

/// Encoding tag carried with raw audio bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioEncoding {
    Wav,
    Mp3,
    Ogg,
}

impl AudioEncoding {
    /// MIME type for upload parts and artifacts.
    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioEncoding::Wav => "audio/wav",
            AudioEncoding::Mp3 => "audio/mpeg",
            AudioEncoding::Ogg => "audio/ogg",
        }
    }

    /// File name used for multipart uploads.
    pub fn upload_file_name(&self) -> &'static str {
        match self {
            AudioEncoding::Wav => "audio.wav",
            AudioEncoding::Mp3 => "audio.mp3",
            AudioEncoding::Ogg => "audio.ogg",
        }
    }
}

/// Raw recorded audio plus its encoding tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    pub bytes: Vec<u8>,
    pub encoding: AudioEncoding,
}

impl AudioPayload {
    pub fn new(bytes: Vec<u8>, encoding: AudioEncoding) -> Self {
        Self { bytes, encoding }
    }
}

/// One user utterance: recorded audio or already-typed text.
/// Exactly one payload kind by construction; immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnInput {
    Audio(AudioPayload),
    Text(String),
}

impl TurnInput {
    pub fn audio(bytes: Vec<u8>, encoding: AudioEncoding) -> Self {
        TurnInput::Audio(AudioPayload::new(bytes, encoding))
    }

    pub fn text(text: impl Into<String>) -> Self {
        TurnInput::Text(text.into())
    }
}

/// What the user said, as text. For text input this is the input itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
}

impl Transcript {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Reply text produced for one persona (primary or alternate branch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyResult {
    pub text: String,
}

impl ReplyResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Synthesized speech for one reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioArtifact {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl AudioArtifact {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// One inbound turn: the utterance, the requested personas, and the voice.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub input: TurnInput,
    /// Opt-in toggle for the alternate-register branch.
    pub want_alternate: bool,
    pub primary_persona: PersonaConfig,
    /// Required when `want_alternate` is set.
    pub alternate_persona: Option<PersonaConfig>,
    pub voice: VoiceConfig,
}

impl TurnRequest {
    /// Primary-only turn.
    pub fn new(input: TurnInput, primary_persona: PersonaConfig, voice: VoiceConfig) -> Self {
        Self {
            input,
            want_alternate: false,
            primary_persona,
            alternate_persona: None,
            voice,
        }
    }

    /// Opt in to the alternate-register branch.
    pub fn with_alternate(mut self, persona: PersonaConfig) -> Self {
        self.want_alternate = true;
        self.alternate_persona = Some(persona);
        self
    }
}

/// The assembled outcome of one completed turn. Audio fields may carry an
/// isolated [`StageFailure`] while the corresponding reply text still
/// surfaces; the alternate branch is absent entirely unless requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResult {
    pub transcript: Transcript,
    pub primary_reply: ReplyResult,
    pub primary_audio: Result<AudioArtifact, StageFailure>,
    pub alternate_reply: Option<ReplyResult>,
    pub alternate_audio: Option<Result<AudioArtifact, StageFailure>>,
    /// Coarse reservation-intent boundary signal; see [`detect_booking_signal`].
    pub booking_signal: bool,
}

/// Case-insensitive substring check for the booking trigger term.
///
/// Deliberately a literal match, not intent classification: it is a coarse
/// boundary signal for a downstream reservation system, nothing more.
pub fn detect_booking_signal(transcript_text: &str) -> bool {
    transcript_text.to_lowercase().contains(BOOKING_TRIGGER)
}
