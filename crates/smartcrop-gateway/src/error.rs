//! Error types for backend calls.

use smartcrop_core::error::SmartCropError;

/// Errors from the hosted backend or the transport to it.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("backend is not configured: {0}")]
    NotConfigured(String),
    #[error("request failed: {0}")]
    Http(String),
    /// Non-success status; `message` is the backend's own error text.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("not signed in")]
    NotSignedIn,
}

impl GatewayError {
    /// Text suitable for a user-facing notice.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Whether the backend rejected the credentials or token.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            GatewayError::Status { status, .. } => matches!(status, 400 | 401 | 403 | 422),
            GatewayError::NotSignedIn => true,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

impl From<GatewayError> for SmartCropError {
    fn from(err: GatewayError) -> Self {
        if err.is_auth_failure() {
            SmartCropError::Auth(err.to_string())
        } else {
            SmartCropError::Backend(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_displays_backend_message_only() {
        let err = GatewayError::Status {
            status: 400,
            message: "Invalid login credentials".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid login credentials");
        assert_eq!(err.user_message(), "Invalid login credentials");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(GatewayError::NotSignedIn.to_string(), "not signed in");
        assert_eq!(
            GatewayError::Http("connection refused".into()).to_string(),
            "request failed: connection refused"
        );
        assert_eq!(
            GatewayError::Decode("missing field `id`".into()).to_string(),
            "could not decode response: missing field `id`"
        );
        assert_eq!(
            GatewayError::NotConfigured("empty url".into()).to_string(),
            "backend is not configured: empty url"
        );
    }

    #[test]
    fn test_auth_failure_classification() {
        assert!(GatewayError::NotSignedIn.is_auth_failure());
        assert!(GatewayError::Status {
            status: 401,
            message: String::new()
        }
        .is_auth_failure());
        assert!(!GatewayError::Status {
            status: 503,
            message: String::new()
        }
        .is_auth_failure());
        assert!(!GatewayError::Http("timeout".into()).is_auth_failure());
    }

    #[test]
    fn test_into_smartcrop_error() {
        let err: SmartCropError = GatewayError::Status {
            status: 400,
            message: "Email not confirmed".into(),
        }
        .into();
        assert!(matches!(err, SmartCropError::Auth(_)));

        let err: SmartCropError = GatewayError::Http("dns".into()).into();
        assert!(matches!(err, SmartCropError::Backend(_)));
    }

    #[test]
    fn test_json_error_is_decode() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("[");
        let err: GatewayError = parse.unwrap_err().into();
        assert!(matches!(err, GatewayError::Decode(_)));
    }
}
