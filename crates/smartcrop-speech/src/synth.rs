//! Text-to-speech backends.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::SpeechError;

/// Default espeak speaking rate in words per minute.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;
/// Default espeak pitch on its 0-99 scale.
const BASE_PITCH: f32 = 50.0;

/// One synthesis request.
#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub locale: String,
    /// Rate multiplier, 1.0 = normal.
    pub rate: f32,
    /// Pitch multiplier, 1.0 = normal.
    pub pitch: f32,
}

/// Plays an utterance to completion.
///
/// Dropping the returned future must stop playback; the bridge relies on this
/// to cancel an utterance when a newer one starts.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError>;
}

/// Runs an espeak-compatible program once per utterance.
pub struct CommandSynthesizer {
    program: String,
}

impl CommandSynthesizer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    async fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError> {
        let status = Command::new(&self.program)
            .args(espeak_args(utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| SpeechError::Spawn {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(SpeechError::Failed(format!("{} exited with {}", self.program, status)))
        }
    }
}

/// espeak voice name for a BCP 47 locale: `en-US` -> `en-us`, `hi-IN` -> `hi`.
pub fn voice_for_locale(locale: &str) -> String {
    let lowered = locale.trim().to_lowercase().replace('_', "-");
    match lowered.split_once('-') {
        Some(("en", _)) => lowered,
        Some((lang, _)) => lang.to_string(),
        None => lowered,
    }
}

/// Command-line arguments for an espeak-compatible synthesizer.
pub fn espeak_args(utterance: &Utterance) -> Vec<String> {
    let wpm = (BASE_WORDS_PER_MINUTE * utterance.rate).round().max(80.0) as u32;
    let pitch = (BASE_PITCH * utterance.pitch).round().clamp(0.0, 99.0) as u32;
    vec![
        "-v".to_string(),
        voice_for_locale(&utterance.locale),
        "-s".to_string(),
        wpm.to_string(),
        "-p".to_string(),
        pitch.to_string(),
        "--".to_string(),
        utterance.text.clone(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utterance(locale: &str) -> Utterance {
        Utterance {
            text: "Apply nitrogen fertilizer".to_string(),
            locale: locale.to_string(),
            rate: 0.8,
            pitch: 1.0,
        }
    }

    #[test]
    fn test_voice_for_locale() {
        assert_eq!(voice_for_locale("en-US"), "en-us");
        assert_eq!(voice_for_locale("hi-IN"), "hi");
        assert_eq!(voice_for_locale("pa_IN"), "pa");
        assert_eq!(voice_for_locale("pa"), "pa");
    }

    #[test]
    fn test_espeak_args_scale_rate_and_pitch() {
        let args = espeak_args(&utterance("hi-IN"));
        assert_eq!(
            args,
            vec!["-v", "hi", "-s", "140", "-p", "50", "--", "Apply nitrogen fertilizer"]
        );
    }

    #[test]
    fn test_espeak_args_clamp_extremes() {
        let mut u = utterance("en-US");
        u.rate = 0.1;
        u.pitch = 5.0;
        let args = espeak_args(&u);
        assert_eq!(args[3], "80");
        assert_eq!(args[5], "99");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_synthesizer_success_and_failure() {
        assert!(CommandSynthesizer::new("true")
            .speak(&utterance("en-US"))
            .await
            .is_ok());

        let err = CommandSynthesizer::new("false")
            .speak(&utterance("en-US"))
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::Failed(_)));
    }

    #[tokio::test]
    async fn test_command_synthesizer_missing_program() {
        let err = CommandSynthesizer::new("smartcrop-no-such-tts")
            .speak(&utterance("en-US"))
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::Spawn { .. }));
    }
}
