//! Immutable configuration for the pipeline's external services and personas.
//!
//! All config is constructed once at startup and passed into component
//! constructors explicitly; core logic never reads the environment. The
//! `from_env` constructors exist for the outermost wiring layer only.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | OPENAI_API_KEY | (required) | Bearer key for transcription + chat. |
//! | LYNGO_OPENAI_BASE_URL | https://api.openai.com/v1 | OpenAI-compatible base URL. |
//! | LYNGO_STT_MODEL | whisper-1 | Transcription model. |
//! | LYNGO_CHAT_MODEL | gpt-4o | Reply-generation model. |
//! | ELEVENLABS_API_KEY | (required) | `xi-api-key` for synthesis. |
//! | ELEVENLABS_VOICE_ID | (required) | Voice used for both branches. |
//! | LYNGO_ELEVENLABS_BASE_URL | https://api.elevenlabs.io | TTS base URL. |
//! | LYNGO_TTS_MODEL | eleven_monolingual_v1 | TTS model id. |
//! | LYNGO_TTS_FORMAT | mp3 | TTS output format tag. |

use crate::error::{VoiceError, VoiceResult};
use serde::{Deserialize, Serialize};

/// Register/persona requested from the reply generator. A turn carries one
/// primary persona and optionally an alternate one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// System prompt establishing role, dialect, and tone.
    pub system_prompt: String,
    /// Human-readable register label (for logs and the result surface).
    pub language_label: String,
}

impl PersonaConfig {
    pub fn new(system_prompt: impl Into<String>, language_label: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            language_label: language_label.into(),
        }
    }

    /// Primary register: friendly Egyptian Arabic restaurant receptionist.
    pub fn egyptian_receptionist() -> Self {
        Self::new(
            "You're a friendly Egyptian receptionist working at a restaurant. \
             Reply only in Egyptian Arabic. Keep it short and natural.",
            "Egyptian Arabic",
        )
    }

    /// Alternate register: neutral Modern Standard Arabic.
    pub fn msa_receptionist() -> Self {
        Self::new(
            "You're a receptionist replying in neutral Modern Standard Arabic.",
            "Modern Standard Arabic",
        )
    }
}

/// Parameters for the speech synthesizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceConfig {
    pub voice_id: String,
    pub model_id: String,
    pub output_format: String,
}

impl VoiceConfig {
    pub fn new(
        voice_id: impl Into<String>,
        model_id: impl Into<String>,
        output_format: impl Into<String>,
    ) -> Self {
        Self {
            voice_id: voice_id.into(),
            model_id: model_id.into(),
            output_format: output_format.into(),
        }
    }

    /// Default ElevenLabs voice parameters for the given voice id.
    pub fn elevenlabs_default(voice_id: impl Into<String>) -> Self {
        Self::new(voice_id, "eleven_monolingual_v1", "mp3")
    }
}

/// OpenAI-compatible service credentials shared by transcription and chat.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base URL without trailing slash (e.g. https://api.openai.com/v1).
    pub base_url: String,
    /// Bearer API key.
    pub api_key: String,
    /// Transcription model: whisper-1 or gpt-4o-transcribe, etc.
    pub stt_model: String,
    /// Chat model for reply generation.
    pub chat_model: String,
}

impl OpenAiConfig {
    /// Build from environment: OPENAI_API_KEY plus LYNGO_* overrides.
    pub fn from_env() -> VoiceResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| VoiceError::Config("OPENAI_API_KEY is not set".to_string()))?;
        let base_url = std::env::var("LYNGO_OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let stt_model =
            std::env::var("LYNGO_STT_MODEL").unwrap_or_else(|_| "whisper-1".to_string());
        let chat_model =
            std::env::var("LYNGO_CHAT_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        Ok(Self {
            base_url,
            api_key,
            stt_model,
            chat_model,
        })
    }

    /// Create with explicit values (e.g. for tests or non-env wiring).
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            stt_model: "whisper-1".to_string(),
            chat_model: "gpt-4o".to_string(),
        }
    }
}

/// ElevenLabs credentials and voice selection.
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    /// Base URL without trailing slash (e.g. https://api.elevenlabs.io).
    pub base_url: String,
    /// API key sent as the `xi-api-key` header.
    pub api_key: String,
    /// Voice used when the caller does not pick one explicitly.
    pub voice: VoiceConfig,
}

impl ElevenLabsConfig {
    /// Build from environment: ELEVENLABS_API_KEY, ELEVENLABS_VOICE_ID,
    /// plus LYNGO_ELEVENLABS_BASE_URL / LYNGO_TTS_MODEL / LYNGO_TTS_FORMAT.
    pub fn from_env() -> VoiceResult<Self> {
        let api_key = std::env::var("ELEVENLABS_API_KEY")
            .map_err(|_| VoiceError::Config("ELEVENLABS_API_KEY is not set".to_string()))?;
        let voice_id = std::env::var("ELEVENLABS_VOICE_ID")
            .map_err(|_| VoiceError::Config("ELEVENLABS_VOICE_ID is not set".to_string()))?;
        let base_url = std::env::var("LYNGO_ELEVENLABS_BASE_URL")
            .unwrap_or_else(|_| "https://api.elevenlabs.io".to_string());
        let model_id =
            std::env::var("LYNGO_TTS_MODEL").unwrap_or_else(|_| "eleven_monolingual_v1".to_string());
        let output_format = std::env::var("LYNGO_TTS_FORMAT").unwrap_or_else(|_| "mp3".to_string());
        Ok(Self {
            base_url,
            api_key,
            voice: VoiceConfig::new(voice_id, model_id, output_format),
        })
    }

    /// Create with explicit values.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        voice: VoiceConfig,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            voice,
        }
    }
}
