//! **SpeechSynthesizer** — render reply text as audio bytes.
//!
//! The production adapter targets the ElevenLabs text-to-speech API. Any
//! non-success response status is a failure and its body is failure detail,
//! never audio; callers must not attempt to play or forward it.

use crate::config::{ElevenLabsConfig, VoiceConfig};
use crate::error::{VoiceError, VoiceResult};
use crate::turn::{AudioArtifact, ReplyResult};
use async_trait::async_trait;
use std::time::Duration;

/// Backend that turns reply text into a playable audio artifact.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        reply: &ReplyResult,
        voice: &VoiceConfig,
    ) -> VoiceResult<AudioArtifact>;
}

/// MIME type for an ElevenLabs output format tag (e.g. `mp3`, `mp3_44100_128`,
/// `pcm_16000`, `ulaw_8000`). Unknown tags fall back to a generic stream type.
pub fn mime_for_output_format(output_format: &str) -> &'static str {
    if output_format.starts_with("mp3") {
        "audio/mpeg"
    } else if output_format.starts_with("pcm") || output_format.starts_with("wav") {
        "audio/wav"
    } else if output_format.starts_with("ulaw") {
        "audio/basic"
    } else if output_format.starts_with("ogg") || output_format.starts_with("opus") {
        "audio/ogg"
    } else {
        "application/octet-stream"
    }
}

/// Production TTS adapter: `POST {base}/v1/text-to-speech/{voice_id}` with
/// the `xi-api-key` header.
#[derive(Debug, Clone)]
pub struct ElevenLabsSynthesizer {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl ElevenLabsSynthesizer {
    pub fn new(config: &ElevenLabsConfig) -> VoiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    async fn synthesize(
        &self,
        reply: &ReplyResult,
        voice: &VoiceConfig,
    ) -> VoiceResult<AudioArtifact> {
        let url = format!("{}/v1/text-to-speech/{}", self.base_url, voice.voice_id);
        let body = serde_json::json!({
            "text": reply.text,
            "model_id": voice.model_id,
            "output_format": voice.output_format,
        });
        let res = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VoiceError::Synthesis(e.to_string()))?;
        if !res.status().is_success() {
            // Coarse classification on purpose: status + body text, no
            // error-body parsing. The body is detail, never audio.
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(VoiceError::Synthesis(format!(
                "TTS API error {}: {}",
                status, body
            )));
        }
        let bytes = res
            .bytes()
            .await
            .map_err(|e| VoiceError::Synthesis(e.to_string()))?;
        if bytes.is_empty() {
            return Err(VoiceError::Synthesis(
                "service returned an empty audio body".to_string(),
            ));
        }
        Ok(AudioArtifact::new(
            bytes.to_vec(),
            mime_for_output_format(&voice.output_format),
        ))
    }
}

/// Placeholder synthesizer: tiny canned artifact so the pipeline completes
/// without TTS credentials. Nothing playable comes out of it.
#[derive(Debug, Default)]
pub struct PlaceholderSynthesizer;

#[async_trait]
impl SpeechSynthesizer for PlaceholderSynthesizer {
    async fn synthesize(
        &self,
        _reply: &ReplyResult,
        voice: &VoiceConfig,
    ) -> VoiceResult<AudioArtifact> {
        Ok(AudioArtifact::new(
            b"placeholder-audio".to_vec(),
            mime_for_output_format(&voice.output_format),
        ))
    }
}
