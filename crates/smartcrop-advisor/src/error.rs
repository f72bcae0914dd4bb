//! Error types for the farming assistant.

use smartcrop_core::error::SmartCropError;
use smartcrop_gateway::GatewayError;

/// Errors from sending a question or loading chat history.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("You need to be signed in to ask questions.")]
    NotSignedIn,
    #[error("Question is empty")]
    EmptyQuestion,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl From<ChatError> for SmartCropError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::NotSignedIn => SmartCropError::Auth(err.to_string()),
            ChatError::EmptyQuestion => SmartCropError::Validation(err.to_string()),
            ChatError::Gateway(e) => e.into(),
        }
    }
}
