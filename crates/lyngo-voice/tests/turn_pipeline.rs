//! Integration tests for the turn pipeline, using stub backends that
//! record their calls so short-circuit and isolation behavior is provable.

use async_trait::async_trait;
use lyngo_voice::{
    AudioArtifact, AudioEncoding, CancelToken, PersonaConfig, ReplyGenerator, ReplyResult,
    SpeechSynthesizer, Stage, Transcript, Transcriber, TurnInput, TurnOrchestrator, TurnRequest,
    VoiceConfig, VoiceError, VoiceResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Stub backends
// ---------------------------------------------------------------------------

struct StubTranscriber {
    outcome: Result<String, String>,
    calls: AtomicUsize,
}

impl StubTranscriber {
    fn ok(text: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for StubTranscriber {
    async fn transcribe(&self, _audio: &lyngo_voice::AudioPayload) -> VoiceResult<Transcript> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(text) => Ok(Transcript::new(text.clone())),
            Err(message) => Err(VoiceError::Transcription(message.clone())),
        }
    }
}

struct StubGenerator {
    reply: String,
    /// Persona label whose generation fails, if any.
    fail_for: Option<String>,
    /// Persona label whose generation stalls until cancelled, if any.
    stall_for: Option<String>,
    calls: AtomicUsize,
}

impl StubGenerator {
    fn ok(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            fail_for: None,
            stall_for: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing_for(reply: &str, label: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            fail_for: Some(label.to_string()),
            stall_for: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn stalling_for(reply: &str, label: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            fail_for: None,
            stall_for: Some(label.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReplyGenerator for StubGenerator {
    async fn generate(
        &self,
        _transcript: &Transcript,
        persona: &PersonaConfig,
    ) -> VoiceResult<ReplyResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_for.as_deref() == Some(persona.language_label.as_str()) {
            return Err(VoiceError::Generation("rate limited".to_string()));
        }
        if self.stall_for.as_deref() == Some(persona.language_label.as_str()) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        Ok(ReplyResult::new(format!(
            "{} [{}]",
            self.reply, persona.language_label
        )))
    }
}

struct StubSynthesizer {
    /// When true, every synthesis returns a non-success outcome.
    fail: bool,
    calls: AtomicUsize,
}

impl StubSynthesizer {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for StubSynthesizer {
    async fn synthesize(
        &self,
        _reply: &ReplyResult,
        _voice: &VoiceConfig,
    ) -> VoiceResult<AudioArtifact> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(VoiceError::Synthesis(
                "TTS API error 500 Internal Server Error: upstream busy".to_string(),
            ));
        }
        Ok(AudioArtifact::new(b"stub-mp3".to_vec(), "audio/mpeg"))
    }
}

fn orchestrator(
    transcriber: Arc<StubTranscriber>,
    generator: Arc<StubGenerator>,
    synthesizer: Arc<StubSynthesizer>,
) -> TurnOrchestrator {
    TurnOrchestrator::new(transcriber, generator, synthesizer)
}

fn voice() -> VoiceConfig {
    VoiceConfig::elevenlabs_default("voice-1")
}

fn text_request(text: &str) -> TurnRequest {
    TurnRequest::new(
        TurnInput::text(text),
        PersonaConfig::egyptian_receptionist(),
        voice(),
    )
}

fn audio_request() -> TurnRequest {
    TurnRequest::new(
        TurnInput::audio(vec![1, 2, 3, 4], AudioEncoding::Wav),
        PersonaConfig::egyptian_receptionist(),
        voice(),
    )
}

// ---------------------------------------------------------------------------
// Pipeline laws
// ---------------------------------------------------------------------------

#[tokio::test]
async fn text_input_transcript_is_identity() {
    let stt = StubTranscriber::ok("unused");
    let orch = orchestrator(stt.clone(), StubGenerator::ok("reply"), StubSynthesizer::ok());

    let result = orch
        .run_turn(text_request("what's on the menu"), CancelToken::new())
        .await
        .unwrap();

    assert_eq!(result.transcript.text, "what's on the menu");
    // Text input never touches the transcriber.
    assert_eq!(stt.call_count(), 0);
}

#[tokio::test]
async fn audio_input_transcript_matches_stt_output() {
    let stt = StubTranscriber::ok("عايز أحجز ترابيزة");
    let orch = orchestrator(stt.clone(), StubGenerator::ok("reply"), StubSynthesizer::ok());

    let result = orch
        .run_turn(audio_request(), CancelToken::new())
        .await
        .unwrap();

    assert_eq!(result.transcript.text, "عايز أحجز ترابيزة");
    assert_eq!(stt.call_count(), 1);
}

#[tokio::test]
async fn transcription_failure_short_circuits() {
    let stt = StubTranscriber::failing("upstream unreachable");
    let generator = StubGenerator::ok("reply");
    let synthesizer = StubSynthesizer::ok();
    let orch = orchestrator(stt, generator.clone(), synthesizer.clone());

    let err = orch
        .run_turn(audio_request(), CancelToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, VoiceError::Transcription(_)));
    assert_eq!(generator.call_count(), 0, "no generation after fatal STT");
    assert_eq!(synthesizer.call_count(), 0, "no synthesis after fatal STT");
}

#[tokio::test]
async fn empty_transcript_short_circuits() {
    let stt = StubTranscriber::ok("   ");
    let generator = StubGenerator::ok("reply");
    let synthesizer = StubSynthesizer::ok();
    let orch = orchestrator(stt, generator.clone(), synthesizer.clone());

    let err = orch
        .run_turn(audio_request(), CancelToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, VoiceError::Transcription(_)));
    assert_eq!(generator.call_count(), 0);
    assert_eq!(synthesizer.call_count(), 0);
}

#[tokio::test]
async fn primary_synthesis_failure_is_isolated() {
    let orch = orchestrator(
        StubTranscriber::ok("unused"),
        StubGenerator::ok("تحت أمرك"),
        StubSynthesizer::failing(),
    );

    let result = orch
        .run_turn(text_request("hello there"), CancelToken::new())
        .await
        .unwrap();

    assert!(result.primary_reply.text.starts_with("تحت أمرك"));
    let failure = result.primary_audio.unwrap_err();
    assert_eq!(failure.stage, Stage::SynthesisPrimary);
    assert!(failure.message.contains("500"));
}

#[tokio::test]
async fn alternate_branch_is_opt_in() {
    let generator = StubGenerator::ok("reply");
    let orch = orchestrator(StubTranscriber::ok("unused"), generator.clone(), StubSynthesizer::ok());

    // Persona present but toggle off: the branch must not run.
    let mut request = text_request("hello");
    request.alternate_persona = Some(PersonaConfig::msa_receptionist());

    let result = orch.run_turn(request, CancelToken::new()).await.unwrap();

    assert!(result.alternate_reply.is_none());
    assert!(result.alternate_audio.is_none());
    assert_eq!(generator.call_count(), 1, "only the primary persona ran");
}

#[tokio::test]
async fn booking_scenario_text_turn() {
    let generator = StubGenerator::ok("اتفضل، نورتنا");
    let orch = orchestrator(StubTranscriber::ok("unused"), generator, StubSynthesizer::ok());

    let result = orch
        .run_turn(text_request("book a table for two"), CancelToken::new())
        .await
        .unwrap();

    assert_eq!(result.transcript.text, "book a table for two");
    assert!(result.booking_signal);
    assert!(result.primary_reply.text.starts_with("اتفضل، نورتنا"));
    assert!(result.primary_audio.is_ok());
}

#[tokio::test]
async fn menu_question_has_no_booking_signal() {
    let orch = orchestrator(
        StubTranscriber::ok("unused"),
        StubGenerator::ok("reply"),
        StubSynthesizer::ok(),
    );

    let result = orch
        .run_turn(text_request("what's on the menu"), CancelToken::new())
        .await
        .unwrap();

    assert!(!result.booking_signal);
}

#[tokio::test]
async fn alternate_turn_produces_both_branches() {
    let generator = StubGenerator::ok("reply");
    let synthesizer = StubSynthesizer::ok();
    let orch = orchestrator(StubTranscriber::ok("unused"), generator.clone(), synthesizer.clone());

    let request = text_request("book a table").with_alternate(PersonaConfig::msa_receptionist());
    let result = orch.run_turn(request, CancelToken::new()).await.unwrap();

    assert!(result.primary_reply.text.contains("Egyptian Arabic"));
    let alternate = result.alternate_reply.expect("alternate reply present");
    assert!(alternate.text.contains("Modern Standard Arabic"));
    assert!(result.alternate_audio.unwrap().is_ok());
    assert_eq!(generator.call_count(), 2);
    assert_eq!(synthesizer.call_count(), 2);
}

#[tokio::test]
async fn alternate_generation_failure_degrades_to_absent() {
    let generator = StubGenerator::failing_for("reply", "Modern Standard Arabic");
    let synthesizer = StubSynthesizer::ok();
    let orch = orchestrator(StubTranscriber::ok("unused"), generator, synthesizer.clone());

    let request = text_request("hello").with_alternate(PersonaConfig::msa_receptionist());
    let result = orch.run_turn(request, CancelToken::new()).await.unwrap();

    // Turn still completes; only the alternate branch is gone.
    assert!(result.primary_reply.text.contains("Egyptian Arabic"));
    assert!(result.alternate_reply.is_none());
    assert!(result.alternate_audio.is_none());
    assert_eq!(synthesizer.call_count(), 1, "no synthesis for a failed branch");
}

#[tokio::test]
async fn alternate_synthesis_failure_keeps_alternate_reply() {
    let orch = orchestrator(
        StubTranscriber::ok("unused"),
        StubGenerator::ok("reply"),
        StubSynthesizer::failing(),
    );

    let request = text_request("hello").with_alternate(PersonaConfig::msa_receptionist());
    let result = orch.run_turn(request, CancelToken::new()).await.unwrap();

    assert!(result.alternate_reply.is_some());
    let failure = result.alternate_audio.unwrap().unwrap_err();
    assert_eq!(failure.stage, Stage::SynthesisAlternate);
    // Primary synthesis failed too, but independently.
    assert_eq!(result.primary_audio.unwrap_err().stage, Stage::SynthesisPrimary);
}

#[tokio::test]
async fn cancelling_a_stalled_primary_is_fatal() {
    let generator = StubGenerator::stalling_for("reply", "Egyptian Arabic");
    let orch = orchestrator(StubTranscriber::ok("unused"), generator, StubSynthesizer::ok());

    let cancel = CancelToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let err = orch
        .run_turn(text_request("hello"), cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, VoiceError::Cancelled));
}

#[tokio::test]
async fn cancelling_a_stalled_alternate_keeps_the_primary_result() {
    let generator = StubGenerator::stalling_for("reply", "Modern Standard Arabic");
    let orch = orchestrator(StubTranscriber::ok("unused"), generator, StubSynthesizer::ok());

    let cancel = CancelToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let request = text_request("hello").with_alternate(PersonaConfig::msa_receptionist());
    let result = orch.run_turn(request, cancel).await.unwrap();

    assert!(result.primary_reply.text.contains("Egyptian Arabic"));
    assert!(result.primary_audio.is_ok());
    assert!(result.alternate_reply.is_none(), "abandoned alternate is absent");
    assert!(result.alternate_audio.is_none());
}
