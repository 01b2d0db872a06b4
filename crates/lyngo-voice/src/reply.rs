//! **ReplyGenerator** — turn a transcript plus a persona into reply text.
//!
//! The production adapter speaks the OpenAI-compatible chat-completion
//! protocol: an ordered `{role, content}` message list and a model id in,
//! the first choice's message content out. Calls for different personas are
//! independent and share no mutable state, so branches may run in any order.

use crate::config::{OpenAiConfig, PersonaConfig};
use crate::error::{VoiceError, VoiceResult};
use crate::turn::{ReplyResult, Transcript};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backend for generating a persona-flavored reply to a transcript.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Generate one reply. An empty reply after trimming is an error.
    async fn generate(
        &self,
        transcript: &Transcript,
        persona: &PersonaConfig,
    ) -> VoiceResult<ReplyResult>;
}

// OpenAI-compatible chat request/response
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

/// Production reply adapter: OpenAI-compatible `POST {base}/chat/completions`.
#[derive(Debug, Clone)]
pub struct ChatApiGenerator {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl ChatApiGenerator {
    pub fn new(config: &OpenAiConfig) -> VoiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.chat_model.clone(),
            client,
        })
    }
}

#[async_trait]
impl ReplyGenerator for ChatApiGenerator {
    async fn generate(
        &self,
        transcript: &Transcript,
        persona: &PersonaConfig,
    ) -> VoiceResult<ReplyResult> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: persona.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: transcript.text.clone(),
                },
            ],
        };
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VoiceError::Generation(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(VoiceError::Generation(format!(
                "chat API error {}: {}",
                status, body
            )));
        }
        let parsed: ChatResponse = res
            .json()
            .await
            .map_err(|e| VoiceError::Generation(e.to_string()))?;
        // Verbatim top choice, trimmed of surrounding whitespace.
        let text = parsed
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(VoiceError::Generation(format!(
                "model returned an empty reply for persona '{}'",
                persona.language_label
            )));
        }
        Ok(ReplyResult::new(text))
    }
}

/// Placeholder generator: canned reply, or an echo of the transcript.
#[derive(Debug, Default)]
pub struct PlaceholderGenerator {
    /// If set, return this as the reply for every transcript.
    pub response: Option<String>,
}

impl PlaceholderGenerator {
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
impl ReplyGenerator for PlaceholderGenerator {
    async fn generate(
        &self,
        transcript: &Transcript,
        persona: &PersonaConfig,
    ) -> VoiceResult<ReplyResult> {
        if let Some(ref r) = self.response {
            return Ok(ReplyResult::new(r.clone()));
        }
        Ok(ReplyResult::new(format!(
            "[{} placeholder reply to: {}]",
            persona.language_label, transcript.text
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn placeholder_echoes_transcript_and_persona() {
        let generator = PlaceholderGenerator::new();
        let reply = generator
            .generate(
                &Transcript::new("book a table"),
                &PersonaConfig::egyptian_receptionist(),
            )
            .await
            .unwrap();
        assert!(reply.text.contains("book a table"));
        assert!(reply.text.contains("Egyptian Arabic"));
    }

    #[tokio::test]
    async fn placeholder_with_fixed_response() {
        let generator = PlaceholderGenerator::with_response("أهلاً بيك!");
        let reply = generator
            .generate(
                &Transcript::new("hello"),
                &PersonaConfig::msa_receptionist(),
            )
            .await
            .unwrap();
        assert_eq!(reply.text, "أهلاً بيك!");
    }

    #[test]
    fn chat_response_takes_first_choice() {
        let raw = r#"{"choices":[{"message":{"content":"  first  "}},{"message":{"content":"second"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.trim(), "first");
    }
}
