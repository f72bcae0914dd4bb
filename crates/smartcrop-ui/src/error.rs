//! Error types for the view layer.

use smartcrop_core::error::SmartCropError;
use smartcrop_gateway::GatewayError;

/// Errors from submitting the sign-in / sign-up form.
#[derive(Debug, thiserror::Error)]
pub enum AuthFormError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl From<AuthFormError> for SmartCropError {
    fn from(err: AuthFormError) -> Self {
        match err {
            AuthFormError::Gateway(e) => e.into(),
            other => SmartCropError::Validation(other.to_string()),
        }
    }
}
