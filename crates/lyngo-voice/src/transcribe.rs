//! **Transcriber** — convert an `AudioPayload` into a `Transcript`.
//!
//! Implement `Transcriber` for any speech-to-text service. The production
//! adapter targets OpenAI-compatible transcription endpoints; the
//! placeholder lets the pipeline run without credentials.

use crate::config::OpenAiConfig;
use crate::error::{VoiceError, VoiceResult};
use crate::turn::{AudioPayload, Transcript};
use async_trait::async_trait;
use std::time::Duration;

/// Backend for converting recorded audio into text. One outbound call per
/// transcription; no retries here (retry policy belongs to the caller).
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe one utterance. Empty or unintelligible audio is an error,
    /// not an empty transcript.
    async fn transcribe(&self, audio: &AudioPayload) -> VoiceResult<Transcript>;
}

/// Production STT adapter: OpenAI-compatible transcription API
/// (`POST {base}/audio/transcriptions`, multipart upload).
#[derive(Debug, Clone)]
pub struct WhisperApiTranscriber {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl WhisperApiTranscriber {
    pub fn new(config: &OpenAiConfig) -> VoiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.stt_model.clone(),
            client,
        })
    }
}

#[async_trait]
impl Transcriber for WhisperApiTranscriber {
    async fn transcribe(&self, audio: &AudioPayload) -> VoiceResult<Transcript> {
        if audio.bytes.is_empty() {
            return Err(VoiceError::Transcription("audio payload is empty".to_string()));
        }
        let url = format!("{}/audio/transcriptions", self.base_url);
        let part = reqwest::multipart::Part::bytes(audio.bytes.clone())
            .file_name(audio.encoding.upload_file_name())
            .mime_str(audio.encoding.mime_type())
            .map_err(|e| VoiceError::Transcription(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone());
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| VoiceError::Transcription(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(VoiceError::Transcription(format!(
                "STT API error {}: {}",
                status, body
            )));
        }
        let json: serde_json::Value = res
            .json()
            .await
            .map_err(|e| VoiceError::Transcription(e.to_string()))?;
        let text = json
            .get("text")
            .and_then(|t| t.as_str())
            .unwrap_or("")
            .trim()
            .to_string();
        if text.is_empty() {
            return Err(VoiceError::Transcription(
                "service returned an empty transcript".to_string(),
            ));
        }
        Ok(Transcript::new(text))
    }
}

/// Placeholder transcriber: returns a fixed string. Use for wiring tests
/// and the demo without STT credentials.
#[derive(Debug, Default)]
pub struct PlaceholderTranscriber {
    /// If set, return this instead of the default message.
    pub response: Option<String>,
}

impl PlaceholderTranscriber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(s: impl Into<String>) -> Self {
        Self {
            response: Some(s.into()),
        }
    }
}

#[async_trait]
impl Transcriber for PlaceholderTranscriber {
    async fn transcribe(&self, audio: &AudioPayload) -> VoiceResult<Transcript> {
        if let Some(ref r) = self.response {
            return Ok(Transcript::new(r.clone()));
        }
        Ok(Transcript::new(format!(
            "[transcriber placeholder: {} bytes of {} — connect a real STT backend]",
            audio.bytes.len(),
            audio.encoding.mime_type()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::AudioEncoding;

    #[tokio::test]
    async fn placeholder_returns_message() {
        let stt = PlaceholderTranscriber::new();
        let audio = AudioPayload::new(vec![0u8; 64], AudioEncoding::Wav);
        let transcript = stt.transcribe(&audio).await.unwrap();
        assert!(transcript.text.contains("placeholder"));
        assert!(transcript.text.contains("64"));
    }

    #[tokio::test]
    async fn placeholder_with_response() {
        let stt = PlaceholderTranscriber::with_response("book a table");
        let audio = AudioPayload::new(vec![], AudioEncoding::Mp3);
        let transcript = stt.transcribe(&audio).await.unwrap();
        assert_eq!(transcript.text, "book a table");
    }

    #[tokio::test]
    async fn whisper_adapter_rejects_empty_payload() {
        let config = OpenAiConfig::new("https://api.openai.com/v1", "sk-test");
        let stt = WhisperApiTranscriber::new(&config).unwrap();
        let audio = AudioPayload::new(vec![], AudioEncoding::Wav);
        let err = stt.transcribe(&audio).await.unwrap_err();
        assert!(matches!(err, VoiceError::Transcription(_)));
    }
}
