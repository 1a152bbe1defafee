//! Voice input/output state machine.
//!
//! # Responsibility
//! - Track whether the platform is listening, speaking, or idle.
//! - Turn recognized speech into phrase-buffer words.
//! - Classify recognition failures into stable reasons.
//!
//! # Invariants
//! - At most one of listening/speaking is active at a time.
//! - Every engine callback returns the machine to `Idle` unless it started
//!   something new.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod engine;
pub mod machine;

pub use engine::{Capability, RecognitionFailure};

/// Voice controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,
    Listening,
    Speaking,
}

impl VoiceState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Listening => "listening",
            Self::Speaking => "speaking",
        }
    }
}

/// Errors reported by voice operations. None of them change state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceError {
    UnsupportedCapability(Capability),
    InvalidState {
        state: VoiceState,
        action: &'static str,
    },
    /// Nothing to speak after trimming.
    EmptyText,
    /// The engine refused to start.
    Engine(String),
    Recognition(RecognitionFailure),
}

impl Display for VoiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedCapability(capability) => {
                write!(f, "{} is not supported on this platform", capability.as_str())
            }
            Self::InvalidState { state, action } => {
                write!(f, "cannot {action} while {}", state.as_str())
            }
            Self::EmptyText => write!(f, "no text to speak"),
            Self::Engine(details) => write!(f, "speech engine error: {details}"),
            Self::Recognition(failure) => write!(f, "{}", failure.user_message()),
        }
    }
}

impl Error for VoiceError {}
