//! Spoken prompt cue
//!
//! No speech recognition happens here: pressing the voice control only reads
//! a fixed cue aloud through the platform speech engine.

use anyhow::Result;

pub const PROMPT_CUE: &str = "Say your prompt and I’ll fill it in for you.";

/// Platform text-to-speech
pub trait SpeechEngine: Send + Sync {
    fn speak(&self, text: &str) -> Result<()>;
}

pub struct VoicePrompt<S> {
    engine: S,
}

impl<S: SpeechEngine> VoicePrompt<S> {
    pub fn new(engine: S) -> Self {
        Self { engine }
    }

    /// Speak [`PROMPT_CUE`]. Engine failures are logged and dropped.
    pub fn speak(&self) {
        if let Err(e) = self.engine.speak(PROMPT_CUE) {
            tracing::warn!("speech engine failed: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingEngine {
        spoken: Mutex<Vec<String>>,
        broken: bool,
    }

    impl SpeechEngine for RecordingEngine {
        fn speak(&self, text: &str) -> Result<()> {
            self.spoken.lock().unwrap().push(text.to_string());
            if self.broken {
                return Err(anyhow!("no audio device"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_speaks_fixed_cue() {
        let voice = VoicePrompt::new(RecordingEngine::default());
        voice.speak();
        assert_eq!(*voice.engine.spoken.lock().unwrap(), vec![PROMPT_CUE.to_string()]);
    }

    #[test]
    fn test_engine_failure_is_swallowed() {
        let voice = VoicePrompt::new(RecordingEngine {
            broken: true,
            ..Default::default()
        });
        voice.speak();
        assert_eq!(voice.engine.spoken.lock().unwrap().len(), 1);
    }
}
