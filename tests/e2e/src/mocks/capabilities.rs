//! Recording speech and audio cues

use std::sync::Mutex;

use vocabox_core::{AudioCues, CapabilityError, Cue, Speech};

/// Remembers every utterance; optionally refuses them all
#[derive(Debug, Default)]
pub struct RecordingSpeech {
    spoken: Mutex<Vec<String>>,
    unavailable: bool,
}

impl RecordingSpeech {
    /// Speech that always reports itself missing
    pub fn unavailable() -> Self {
        Self {
            spoken: Mutex::new(Vec::new()),
            unavailable: true,
        }
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

impl Speech for RecordingSpeech {
    fn speak(&self, text: &str, _lang: &str) -> Result<(), CapabilityError> {
        if self.unavailable {
            return Err(CapabilityError::Unavailable("no voice installed".into()));
        }
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Remembers every cue played; optionally fails each one after recording it
#[derive(Debug, Default)]
pub struct RecordingCues {
    played: Mutex<Vec<Cue>>,
    broken: bool,
}

impl RecordingCues {
    /// Cues that reach the recorder but report a failed audio device
    pub fn broken() -> Self {
        Self {
            played: Mutex::new(Vec::new()),
            broken: true,
        }
    }

    pub fn played(&self) -> Vec<Cue> {
        self.played.lock().unwrap().clone()
    }

    pub fn count(&self, cue: Cue) -> usize {
        self.played().iter().filter(|c| **c == cue).count()
    }
}

impl AudioCues for RecordingCues {
    fn play_cue(&self, cue: Cue) -> Result<(), CapabilityError> {
        self.played.lock().unwrap().push(cue);
        if self.broken {
            return Err(CapabilityError::Failed("audio device gone".into()));
        }
        Ok(())
    }
}
