use anyhow::{Context, Result};
use std::process::{Command, Stdio};

use crate::voice::SpeechEngine;

/// Speaks by launching a text-to-speech program with the text as its argument
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

    /// `say` on macOS, `espeak` elsewhere
    pub fn system_default() -> Self {
        if cfg!(target_os = "macos") {
            Self::new("say")
        } else {
            Self::new("espeak")
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl SpeechEngine for CommandSpeech {
    fn speak(&self, text: &str) -> Result<()> {
        let mut child = Command::new(&self.program)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start speech program '{}'", self.program))?;

        // Reap in the background; the caller never waits for speech to end
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_an_error() {
        let speech = CommandSpeech::new("definitely-not-a-real-tts-binary");
        let err = speech.speak("hello").unwrap_err();
        assert!(err.to_string().contains("definitely-not-a-real-tts-binary"));
    }

    #[test]
    fn test_system_default_picks_a_program() {
        assert!(!CommandSpeech::system_default().program().is_empty());
    }
}
