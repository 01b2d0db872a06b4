//! Receptionist Demo — one full turn with optional production backends.
//!
//! - **STT/Reply**: real OpenAI-compatible adapters if `OPENAI_API_KEY` is set, else placeholders.
//! - **TTS**: ElevenLabs if `ELEVENLABS_API_KEY` and `ELEVENLABS_VOICE_ID` are set, else placeholder.
//!
//! Pass an utterance as the first argument (default: "book a table for two");
//! add `--alternate` to also request the Modern Standard Arabic register.
//! Set keys in `.env` to hear the receptionist for real.

use lyngo_voice::{
    CancelToken, ChatApiGenerator, ElevenLabsConfig, ElevenLabsSynthesizer, OpenAiConfig,
    PersonaConfig, PlaceholderGenerator, PlaceholderSynthesizer, PlaceholderTranscriber,
    ReplyGenerator, SpeechSynthesizer, Transcriber, TurnInput, TurnOrchestrator, TurnRequest,
    VoiceConfig,
};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Receptionist Demo — transcript → persona reply → synthesized speech");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let want_alternate = args.iter().any(|a| a == "--alternate");
    let utterance = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .cloned()
        .unwrap_or_else(|| "book a table for two".to_string());

    let (transcriber, generator): (Arc<dyn Transcriber>, Arc<dyn ReplyGenerator>) =
        match OpenAiConfig::from_env() {
            Ok(openai) => {
                info!("Using OpenAI-compatible STT ({}) and chat ({}).", openai.stt_model, openai.chat_model);
                (
                    Arc::new(lyngo_voice::WhisperApiTranscriber::new(&openai)?),
                    Arc::new(ChatApiGenerator::new(&openai)?),
                )
            }
            Err(e) => {
                warn!("{e}; using placeholder transcriber and generator.");
                (
                    Arc::new(PlaceholderTranscriber::new()),
                    Arc::new(PlaceholderGenerator::new()),
                )
            }
        };

    let (synthesizer, voice): (Arc<dyn SpeechSynthesizer>, VoiceConfig) =
        match ElevenLabsConfig::from_env() {
            Ok(eleven) => {
                info!("Using ElevenLabs synthesis (voice {}).", eleven.voice.voice_id);
                let voice = eleven.voice.clone();
                (Arc::new(ElevenLabsSynthesizer::new(&eleven)?), voice)
            }
            Err(e) => {
                warn!("{e}; using placeholder synthesizer.");
                (
                    Arc::new(PlaceholderSynthesizer),
                    VoiceConfig::elevenlabs_default("placeholder-voice"),
                )
            }
        };

    let orchestrator = TurnOrchestrator::new(transcriber, generator, synthesizer);

    let mut request = TurnRequest::new(
        TurnInput::text(utterance.clone()),
        PersonaConfig::egyptian_receptionist(),
        voice,
    );
    if want_alternate {
        request = request.with_alternate(PersonaConfig::msa_receptionist());
    }

    let result = orchestrator.run_turn(request, CancelToken::new()).await?;

    info!("You said: {}", result.transcript.text);
    info!("Agent: {}", result.primary_reply.text);
    if result.booking_signal {
        info!("Booking signal detected — forwarding to the reservation boundary.");
    }

    match result.primary_audio {
        Ok(artifact) => {
            let path = std::env::temp_dir().join("lyngo_reply.mp3");
            std::fs::write(&path, &artifact.bytes)?;
            info!("Spoken reply ({}, {} bytes) written to {}", artifact.mime_type, artifact.bytes.len(), path.display());
        }
        Err(failure) => warn!("Audio unavailable: {failure}"),
    }

    if let Some(alt) = result.alternate_reply {
        info!("MSA reply: {}", alt.text);
        match result.alternate_audio {
            Some(Ok(artifact)) => {
                let path = std::env::temp_dir().join("lyngo_reply_msa.mp3");
                std::fs::write(&path, &artifact.bytes)?;
                info!("MSA spoken reply written to {}", path.display());
            }
            Some(Err(failure)) => warn!("MSA audio unavailable: {failure}"),
            None => {}
        }
    }

    Ok(())
}
