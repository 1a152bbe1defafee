//! Platform speech engine seam and recognition error classification.

/// Optional platform voice features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Recognition,
    Synthesis,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recognition => "speech recognition",
            Self::Synthesis => "speech synthesis",
        }
    }
}

/// Parameters of one recognition session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionRequest {
    pub lang: String,
    pub continuous: bool,
    pub interim_results: bool,
    pub max_alternatives: u32,
}

impl RecognitionRequest {
    /// Single final result, one alternative.
    pub fn single_shot(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            continuous: false,
            interim_results: false,
            max_alternatives: 1,
        }
    }
}

/// One synthesis request.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// Platform voice name; `None` uses the default voice.
    pub voice: Option<String>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// Platform speech engine. Completion and failures come back as
/// [`VoiceController`](crate::voice::machine::VoiceController) events.
pub trait SpeechEngine {
    fn supports(&self, capability: Capability) -> bool;

    /// Language of a named platform voice, if the voice exists.
    fn voice_lang(&self, voice_name: &str) -> Option<String>;

    fn start_recognition(&mut self, request: &RecognitionRequest) -> Result<(), String>;
    fn stop_recognition(&mut self);

    fn speak(&mut self, utterance: &Utterance) -> Result<(), String>;
    fn cancel_speech(&mut self);
}

/// Classified recognition failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionFailure {
    NoSpeech,
    AudioCapture,
    NotAllowed,
    Network,
    ServiceNotAllowed,
    /// Any other engine code, kept verbatim.
    Other(String),
}

impl RecognitionFailure {
    /// Maps an engine error code.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "no-speech" => Self::NoSpeech,
            "audio-capture" => Self::AudioCapture,
            "not-allowed" => Self::NotAllowed,
            "network" => Self::Network,
            "service-not-allowed" => Self::ServiceNotAllowed,
            other => Self::Other(other.to_string()),
        }
    }

    /// Stable code for logs and FFI.
    pub fn code(&self) -> &str {
        match self {
            Self::NoSpeech => "no-speech",
            Self::AudioCapture => "audio-capture",
            Self::NotAllowed => "not-allowed",
            Self::Network => "network",
            Self::ServiceNotAllowed => "service-not-allowed",
            Self::Other(code) => code.as_str(),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::NoSpeech => {
                "No speech detected. Please speak clearly and try again.".to_string()
            }
            Self::AudioCapture => {
                "Microphone not accessible. Please check permissions and try again.".to_string()
            }
            Self::NotAllowed => {
                "Microphone access denied. Please allow microphone access and try again."
                    .to_string()
            }
            Self::Network => {
                "Network error. Please check your connection and try again.".to_string()
            }
            Self::ServiceNotAllowed => {
                "Speech recognition service not available. Please try again later.".to_string()
            }
            Self::Other(code) => format!("Speech recognition error: {code}. Please try again."),
        }
    }
}
