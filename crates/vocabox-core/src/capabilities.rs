//! Speech and audio cue capabilities
//!
//! Both are fire-and-forget. A session never fails because sound failed:
//! errors returned here are logged at debug level and dropped.

use serde::{Deserialize, Serialize};

/// Capability failure
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    /// Capability not present on this device
    #[error("Capability unavailable: {0}")]
    Unavailable(String),
    /// Capability present but the call failed
    #[error("Capability failed: {0}")]
    Failed(String),
}

/// Short sound effects played at session moments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    /// Card turned over
    Flip,
    /// Practice answer correct
    Correct,
    /// Practice answer wrong
    Wrong,
    /// Session completed
    Win,
    /// Break started
    Relax,
}

impl std::fmt::Display for Cue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Cue::Flip => "flip",
            Cue::Correct => "correct",
            Cue::Wrong => "wrong",
            Cue::Win => "win",
            Cue::Relax => "relax",
        };
        write!(f, "{}", name)
    }
}

/// Text-to-speech
pub trait Speech: Send + Sync {
    fn speak(&self, text: &str, lang: &str) -> Result<(), CapabilityError>;
}

/// Sound effects
pub trait AudioCues: Send + Sync {
    fn play_cue(&self, cue: Cue) -> Result<(), CapabilityError>;
}

/// No-op speech and audio, for headless sessions
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Speech for Silent {
    fn speak(&self, _text: &str, _lang: &str) -> Result<(), CapabilityError> {
        Ok(())
    }
}

impl AudioCues for Silent {
    fn play_cue(&self, _cue: Cue) -> Result<(), CapabilityError> {
        Ok(())
    }
}
