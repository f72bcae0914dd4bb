//! Error types for speech synthesis and recognition.

use smartcrop_core::error::SmartCropError;

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("Failed to start {program}: {message}")]
    Spawn { program: String, message: String },
    #[error("Speech program failed: {0}")]
    Failed(String),
    #[error("Speech I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Already listening")]
    AlreadyListening,
    #[error("Not listening")]
    NotListening,
}

impl From<SpeechError> for SmartCropError {
    fn from(err: SpeechError) -> Self {
        SmartCropError::Speech(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_error_display() {
        let err = SpeechError::Spawn {
            program: "espeak-ng".to_string(),
            message: "No such file or directory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to start espeak-ng: No such file or directory"
        );
        assert_eq!(SpeechError::AlreadyListening.to_string(), "Already listening");
    }

    #[test]
    fn test_speech_error_into_smartcrop_error() {
        let err: SmartCropError = SpeechError::NotListening.into();
        assert!(matches!(err, SmartCropError::Speech(_)));
    }
}
