//! Terminal speech and cues

use std::io::Write;
use std::process::{Command, Stdio};

use vocabox_core::{AudioCues, CapabilityError, Cue, Speech};

/// Speaks by running an external program with the text as its last argument
#[derive(Debug, Clone)]
pub struct CommandSpeech {
    program: String,
}

impl CommandSpeech {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Speech for CommandSpeech {
    fn speak(&self, text: &str, _lang: &str) -> Result<(), CapabilityError> {
        let mut child = Command::new(&self.program)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| CapabilityError::Unavailable(format!("{}: {}", self.program, e)))?;
        // reap in the background so the session never waits on audio
        std::thread::spawn(move || child.wait());
        Ok(())
    }
}

/// Rings the terminal bell on a wrong answer and at the end of a session
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl AudioCues for TerminalBell {
    fn play_cue(&self, cue: Cue) -> Result<(), CapabilityError> {
        if matches!(cue, Cue::Wrong | Cue::Win) {
            let mut stderr = std::io::stderr();
            stderr
                .write_all(b"\x07")
                .and_then(|_| stderr.flush())
                .map_err(|e| CapabilityError::Failed(e.to_string()))?;
        }
        Ok(())
    }
}
