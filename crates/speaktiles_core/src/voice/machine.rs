//! Voice controller: explicit states instead of nested engine callbacks.
//!
//! Foreground actions (`start_listening`, `speak`) and engine callbacks
//! (`on_recognition_result`, `on_speech_end`, ...) are plain method calls,
//! each handled as one atomic step.

use crate::config::VoiceConfig;
use crate::model::phrase::PhraseBuffer;
use crate::voice::engine::{
    Capability, RecognitionFailure, RecognitionRequest, SpeechEngine, Utterance,
};
use crate::voice::{VoiceError, VoiceState};
use log::{debug, info, warn};

pub struct VoiceController<E: SpeechEngine> {
    engine: E,
    config: VoiceConfig,
    state: VoiceState,
    selected_voice: Option<String>,
}

impl<E: SpeechEngine> VoiceController<E> {
    pub fn new(engine: E, config: VoiceConfig) -> Self {
        Self {
            engine,
            config,
            state: VoiceState::Idle,
            selected_voice: None,
        }
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Selects the synthesis voice; blank clears the selection.
    pub fn select_voice(&mut self, voice_name: Option<&str>) {
        self.selected_voice = voice_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
    }

    pub fn selected_voice(&self) -> Option<&str> {
        self.selected_voice.as_deref()
    }

    /// Starts a single-shot recognition session.
    ///
    /// # Errors
    /// - `InvalidState` when already listening.
    /// - `UnsupportedCapability` when the platform cannot recognize speech.
    /// - `Engine` when the engine refuses to start.
    pub fn start_listening(&mut self) -> Result<(), VoiceError> {
        if self.state == VoiceState::Listening {
            return Err(VoiceError::InvalidState {
                state: self.state,
                action: "start listening",
            });
        }
        if !self.engine.supports(Capability::Recognition) {
            return Err(VoiceError::UnsupportedCapability(Capability::Recognition));
        }
        if self.state == VoiceState::Speaking {
            self.engine.cancel_speech();
            self.state = VoiceState::Idle;
        }

        let request = RecognitionRequest::single_shot(self.recognition_lang());
        self.engine
            .start_recognition(&request)
            .map_err(VoiceError::Engine)?;
        self.state = VoiceState::Listening;
        info!(
            "event=voice_listen module=voice status=start lang={}",
            request.lang
        );
        Ok(())
    }

    /// Stops an active recognition session.
    pub fn stop_listening(&mut self) {
        if self.state != VoiceState::Listening {
            return;
        }
        self.engine.stop_recognition();
        self.state = VoiceState::Idle;
        info!("event=voice_listen module=voice status=stopped");
    }

    /// Handles a recognized transcript.
    ///
    /// Returns the words appended to `phrase`. Results arriving when not
    /// listening are dropped.
    pub fn on_recognition_result(
        &mut self,
        transcript: &str,
        phrase: &mut PhraseBuffer,
    ) -> Vec<String> {
        if self.state != VoiceState::Listening {
            debug!(
                "event=voice_result module=voice status=ignored state={}",
                self.state.as_str()
            );
            return Vec::new();
        }
        self.state = VoiceState::Idle;

        let words = phrase.push_transcript(transcript);
        info!(
            "event=voice_result module=voice status=ok words={}",
            words.len()
        );

        if self.config.echo_recognized && !words.is_empty() {
            if let Err(err) = self.speak(&words.join(" ")) {
                warn!("event=voice_echo module=voice status=error error={err}");
            }
        }
        words
    }

    /// Classifies an engine error code and returns to `Idle`.
    ///
    /// The returned error displays the message meant for the user.
    pub fn on_recognition_error(&mut self, code: &str) -> VoiceError {
        let failure = RecognitionFailure::from_code(code);
        if self.state == VoiceState::Listening {
            self.state = VoiceState::Idle;
        }
        warn!(
            "event=voice_listen module=voice status=error code={}",
            failure.code()
        );
        VoiceError::Recognition(failure)
    }

    /// Session ended without (further) results.
    pub fn on_recognition_end(&mut self) {
        if self.state == VoiceState::Listening {
            self.state = VoiceState::Idle;
        }
    }

    /// Speaks `text`, cancelling any in-flight utterance first.
    ///
    /// # Errors
    /// - `EmptyText` when `text` is blank.
    /// - `UnsupportedCapability` when the platform cannot synthesize speech.
    /// - `Engine` when the engine refuses the utterance.
    pub fn speak(&mut self, text: &str) -> Result<(), VoiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(VoiceError::EmptyText);
        }
        if !self.engine.supports(Capability::Synthesis) {
            return Err(VoiceError::UnsupportedCapability(Capability::Synthesis));
        }

        self.stop_listening();
        self.engine.cancel_speech();
        self.state = VoiceState::Idle;

        let utterance = Utterance {
            text: text.to_string(),
            voice: self.selected_voice.clone(),
            rate: self.config.rate,
            pitch: self.config.pitch,
            volume: self.config.volume,
        };
        self.engine.speak(&utterance).map_err(VoiceError::Engine)?;
        self.state = VoiceState::Speaking;
        info!(
            "event=voice_speak module=voice status=start chars={}",
            text.chars().count()
        );
        Ok(())
    }

    /// Speaks the assembled sentence.
    pub fn speak_phrase(&mut self, phrase: &PhraseBuffer) -> Result<(), VoiceError> {
        self.speak(&phrase.text())
    }

    pub fn on_speech_end(&mut self) {
        if self.state == VoiceState::Speaking {
            self.state = VoiceState::Idle;
            info!("event=voice_speak module=voice status=ok");
        }
    }

    pub fn on_speech_error(&mut self, reason: &str) {
        if self.state == VoiceState::Speaking {
            self.state = VoiceState::Idle;
        }
        warn!("event=voice_speak module=voice status=error reason={reason}");
    }

    fn recognition_lang(&self) -> String {
        self.selected_voice
            .as_deref()
            .and_then(|voice| self.engine.voice_lang(voice))
            .unwrap_or_else(|| self.config.default_lang.clone())
    }
}
