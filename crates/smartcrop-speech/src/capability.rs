//! One-time detection of what speech the host can do.

use smartcrop_core::config::SpeechConfig;

/// Which speech capabilities are available. Detected once at startup and
/// passed around by value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpeechCapabilities {
    pub synthesis: bool,
    pub recognition: bool,
}

impl SpeechCapabilities {
    pub fn none() -> Self {
        Self::default()
    }

    /// Probe `PATH` for the configured programs.
    pub fn detect(config: &SpeechConfig) -> Self {
        if !config.enabled {
            tracing::info!("Speech disabled by configuration");
            return Self::none();
        }

        let synthesis = program_available(&config.synth_program);
        if !synthesis {
            tracing::warn!(
                program = %config.synth_program,
                "Speech synthesis unavailable; answers will not be read aloud"
            );
        }

        let recognition = match config.recognizer_program.as_deref() {
            Some(program) => {
                let found = program_available(program);
                if !found {
                    tracing::warn!(program = %program, "Speech recognizer not found; voice input disabled");
                }
                found
            }
            None => {
                tracing::info!("No speech recognizer configured; voice input disabled");
                false
            }
        };

        let caps = Self {
            synthesis,
            recognition,
        };
        tracing::debug!(?caps, "Speech capabilities detected");
        caps
    }
}

fn program_available(program: &str) -> bool {
    !program.trim().is_empty() && which::which(program.trim()).is_ok()
}
