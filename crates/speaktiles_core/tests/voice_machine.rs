use speaktiles_core::{
    Capability, PhraseBuffer, RecognitionFailure, RecognitionRequest, SpeechEngine, Utterance,
    VoiceConfig, VoiceController, VoiceError, VoiceState,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    StartRecognition(String),
    StopRecognition,
    Speak(Utterance),
    CancelSpeech,
}

struct FakeEngine {
    recognition: bool,
    synthesis: bool,
    refuse_speech: bool,
    calls: Vec<Call>,
}

impl FakeEngine {
    fn full() -> Self {
        Self {
            recognition: true,
            synthesis: true,
            refuse_speech: false,
            calls: Vec::new(),
        }
    }

    fn spoken(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Speak(utterance) => Some(utterance.text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl SpeechEngine for FakeEngine {
    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Recognition => self.recognition,
            Capability::Synthesis => self.synthesis,
        }
    }

    fn voice_lang(&self, voice_name: &str) -> Option<String> {
        (voice_name == "Amélie").then(|| "fr-CA".to_string())
    }

    fn start_recognition(&mut self, request: &RecognitionRequest) -> Result<(), String> {
        self.calls.push(Call::StartRecognition(request.lang.clone()));
        Ok(())
    }

    fn stop_recognition(&mut self) {
        self.calls.push(Call::StopRecognition);
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<(), String> {
        if self.refuse_speech {
            return Err("synthesis busy".to_string());
        }
        self.calls.push(Call::Speak(utterance.clone()));
        Ok(())
    }

    fn cancel_speech(&mut self) {
        self.calls.push(Call::CancelSpeech);
    }
}

fn controller() -> VoiceController<FakeEngine> {
    VoiceController::new(FakeEngine::full(), VoiceConfig::default())
}

#[test]
fn blank_text_is_rejected_and_state_stays_idle() {
    let mut voice = controller();
    assert!(matches!(voice.speak("   "), Err(VoiceError::EmptyText)));
    assert_eq!(voice.state(), VoiceState::Idle);
    assert!(voice.engine().calls.is_empty());
}

#[test]
fn speak_uses_configured_prosody_and_selected_voice() {
    let mut voice = controller();
    voice.select_voice(Some("Amélie"));
    voice.speak(" I want water ").unwrap();

    assert_eq!(voice.state(), VoiceState::Speaking);
    let Some(Call::Speak(utterance)) = voice.engine().calls.last() else {
        panic!("expected an utterance");
    };
    assert_eq!(utterance.text, "I want water");
    assert_eq!(utterance.voice.as_deref(), Some("Amélie"));
    assert_eq!(utterance.rate, 0.9);

    voice.on_speech_end();
    assert_eq!(voice.state(), VoiceState::Idle);
}

#[test]
fn new_utterance_cancels_the_previous_one() {
    let mut voice = controller();
    voice.speak("hello").unwrap();
    voice.speak("goodbye").unwrap();

    let calls = &voice.engine().calls;
    let second = calls
        .iter()
        .rposition(|call| matches!(call, Call::Speak(_)))
        .unwrap();
    assert_eq!(calls[second - 1], Call::CancelSpeech);
    assert_eq!(voice.state(), VoiceState::Speaking);
}

#[test]
fn missing_capabilities_are_reported() {
    let mut engine = FakeEngine::full();
    engine.recognition = false;
    engine.synthesis = false;
    let mut voice = VoiceController::new(engine, VoiceConfig::default());

    assert!(matches!(
        voice.start_listening(),
        Err(VoiceError::UnsupportedCapability(Capability::Recognition))
    ));
    assert!(matches!(
        voice.speak("hi"),
        Err(VoiceError::UnsupportedCapability(Capability::Synthesis))
    ));
    assert_eq!(voice.state(), VoiceState::Idle);
}

#[test]
fn recognized_words_land_in_phrase_and_are_echoed() {
    let mut voice = controller();
    let mut phrase = PhraseBuffer::default();
    phrase.push_word("I");

    voice.start_listening().unwrap();
    assert_eq!(voice.state(), VoiceState::Listening);
    assert_eq!(
        voice.engine().calls[0],
        Call::StartRecognition("en-US".to_string())
    );

    let words = voice.on_recognition_result("  want   more juice ", &mut phrase);
    assert_eq!(words, ["want", "more", "juice"]);
    assert_eq!(phrase.text(), "I want more juice");
    assert_eq!(voice.engine().spoken(), ["want more juice"]);
    assert_eq!(voice.state(), VoiceState::Speaking);
}

#[test]
fn echo_can_be_disabled() {
    let config = VoiceConfig {
        echo_recognized: false,
        ..VoiceConfig::default()
    };
    let mut voice = VoiceController::new(FakeEngine::full(), config);
    let mut phrase = PhraseBuffer::default();

    voice.start_listening().unwrap();
    voice.on_recognition_result("yes", &mut phrase);
    assert_eq!(voice.state(), VoiceState::Idle);
    assert!(voice.engine().spoken().is_empty());
    assert_eq!(phrase.words(), ["yes"]);
}

#[test]
fn late_result_after_stop_is_ignored() {
    let mut voice = controller();
    let mut phrase = PhraseBuffer::default();

    voice.start_listening().unwrap();
    voice.stop_listening();
    assert_eq!(voice.state(), VoiceState::Idle);
    assert!(voice.on_recognition_result("hello", &mut phrase).is_empty());
    assert!(phrase.is_empty());
}

#[test]
fn recognition_error_returns_to_idle_with_classification() {
    let mut voice = controller();
    voice.start_listening().unwrap();

    let err = voice.on_recognition_error("not-allowed");
    assert_eq!(err, VoiceError::Recognition(RecognitionFailure::NotAllowed));
    assert!(err.to_string().contains("Microphone access denied"));
    assert_eq!(voice.state(), VoiceState::Idle);

    voice.start_listening().unwrap();
    voice.on_recognition_end();
    assert_eq!(voice.state(), VoiceState::Idle);
}

#[test]
fn listening_twice_is_an_invalid_transition() {
    let mut voice = controller();
    voice.start_listening().unwrap();
    assert!(matches!(
        voice.start_listening(),
        Err(VoiceError::InvalidState {
            state: VoiceState::Listening,
            ..
        })
    ));
}

#[test]
fn listening_interrupts_speech_and_uses_voice_language() {
    let mut voice = controller();
    voice.select_voice(Some("Amélie"));
    voice.speak("bonjour").unwrap();

    voice.start_listening().unwrap();
    assert_eq!(voice.state(), VoiceState::Listening);
    let calls = &voice.engine().calls;
    assert_eq!(calls[calls.len() - 2], Call::CancelSpeech);
    assert_eq!(
        calls[calls.len() - 1],
        Call::StartRecognition("fr-CA".to_string())
    );
}

#[test]
fn speaking_while_listening_stops_recognition_first() {
    let mut voice = controller();
    voice.start_listening().unwrap();
    voice.speak("help").unwrap();

    let calls = &voice.engine().calls;
    assert_eq!(calls[1], Call::StopRecognition);
    assert_eq!(voice.state(), VoiceState::Speaking);
}

#[test]
fn engine_refusal_leaves_controller_idle() {
    let mut engine = FakeEngine::full();
    engine.refuse_speech = true;
    let mut voice = VoiceController::new(engine, VoiceConfig::default());

    assert!(matches!(voice.speak("hi"), Err(VoiceError::Engine(_))));
    assert_eq!(voice.state(), VoiceState::Idle);

    let mut phrase = PhraseBuffer::default();
    phrase.push_word("stop");
    assert!(voice.speak_phrase(&phrase).is_err());
    voice.on_speech_error("interrupted");
    assert_eq!(voice.state(), VoiceState::Idle);
}
