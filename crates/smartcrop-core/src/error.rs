use thiserror::Error;

/// Top-level error type for Smart Crop Advisor.
///
/// Subsystem crates define their own error enums and implement
/// `From<SubsystemError> for SmartCropError` so that `?` works across crate
/// boundaries. Nothing here is fatal to the process: every variant ends up
/// as a dismissible notice or a log line.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SmartCropError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Chat error: {0}")]
    Chat(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for SmartCropError {
    fn from(err: toml::de::Error) -> Self {
        SmartCropError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SmartCropError {
    fn from(err: toml::ser::Error) -> Self {
        SmartCropError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SmartCropError {
    fn from(err: serde_json::Error) -> Self {
        SmartCropError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Smart Crop Advisor operations.
pub type Result<T> = std::result::Result<T, SmartCropError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SmartCropError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SmartCropError = io_err.into();
        assert!(matches!(err, SmartCropError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(SmartCropError, &str)> = vec![
            (
                SmartCropError::Backend("503".into()),
                "Backend error: 503",
            ),
            (
                SmartCropError::Auth("Invalid login credentials".into()),
                "Authentication error: Invalid login credentials",
            ),
            (SmartCropError::Chat("empty".into()), "Chat error: empty"),
            (
                SmartCropError::Speech("no synthesizer".into()),
                "Speech error: no synthesizer",
            ),
            (
                SmartCropError::Validation("email is required".into()),
                "Validation failed: email is required",
            ),
            (
                SmartCropError::Serialization("eof".into()),
                "Serialization error: eof",
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn test_toml_error_maps_to_config() {
        let parse: std::result::Result<toml::Value, _> = toml::from_str("not = {{ toml");
        let err: SmartCropError = parse.unwrap_err().into();
        assert!(matches!(err, SmartCropError::Config(_)));
    }

    #[test]
    fn test_json_error_maps_to_serialization() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: SmartCropError = parse.unwrap_err().into();
        assert!(matches!(err, SmartCropError::Serialization(_)));
    }
}
