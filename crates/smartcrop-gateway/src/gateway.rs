//! The contract every backend implementation fulfils.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use smartcrop_core::types::{
    AuthSession, AuthUser, ChatMessage, CropFilter, CropRecord, Language, UserMetadata,
    WeatherRecord,
};

use crate::error::GatewayError;

/// What changed in the backend's auth state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthEventKind {
    SignedIn,
    SignedOut,
}

/// Auth state change pushed to subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    pub user: Option<AuthUser>,
}

impl AuthEvent {
    pub fn signed_in(user: AuthUser) -> Self {
        Self {
            kind: AuthEventKind::SignedIn,
            user: Some(user),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            kind: AuthEventKind::SignedOut,
            user: None,
        }
    }
}

/// Result of a sign-up call.
///
/// When the backend requires e-mail confirmation it returns the new user but
/// no session.
#[derive(Clone, Debug, Default)]
pub struct SignUpOutcome {
    pub user: Option<AuthUser>,
    pub session: Option<AuthSession>,
}

impl SignUpOutcome {
    pub fn needs_confirmation(&self) -> bool {
        self.user.is_some() && self.session.is_none()
    }
}

/// Body of the remote "chatbot" function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatbotRequest {
    pub question: String,
    pub language: Language,
    pub user_id: String,
}

/// Answer payload returned by the remote "chatbot" function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatbotReply {
    pub answer: String,
}

/// Authentication, read-only record queries, and remote function calls.
///
/// Implementations hold the current session themselves; callers never pass
/// tokens around.
#[async_trait]
pub trait SessionGateway: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: &UserMetadata,
    ) -> Result<SignUpOutcome, GatewayError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, GatewayError>;

    async fn sign_out(&self) -> Result<(), GatewayError>;

    /// Session currently held, if any.
    async fn current_session(&self) -> Option<AuthSession>;

    /// Stream of sign-in / sign-out notifications.
    fn auth_events(&self) -> broadcast::Receiver<AuthEvent>;

    /// Crops matching `filter`, ordered by name.
    async fn fetch_crops(&self, filter: &CropFilter) -> Result<Vec<CropRecord>, GatewayError>;

    /// Forecast rows ordered by date ascending, at most `limit`.
    async fn fetch_weather(&self, limit: usize) -> Result<Vec<WeatherRecord>, GatewayError>;

    /// A user's chat history, newest first, at most `limit`.
    async fn fetch_chat_history(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, GatewayError>;

    /// Ask the remote "chatbot" function.
    async fn invoke_chatbot(&self, request: &ChatbotRequest) -> Result<ChatbotReply, GatewayError>;

    /// Ask the remote "weather" function to refresh forecasts for `location`.
    async fn invoke_weather(&self, location: &str) -> Result<serde_json::Value, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_up_outcome_needs_confirmation() {
        let user = AuthUser {
            id: "u1".into(),
            email: Some("a@b.c".into()),
            user_metadata: UserMetadata::default(),
        };
        let outcome = SignUpOutcome {
            user: Some(user),
            session: None,
        };
        assert!(outcome.needs_confirmation());
        assert!(!SignUpOutcome::default().needs_confirmation());
    }

    #[test]
    fn test_chatbot_request_wire_shape() {
        let req = ChatbotRequest {
            question: "When to sow wheat?".into(),
            language: Language::Punjabi,
            user_id: "u1".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["language"], "punjabi");
        assert_eq!(json["user_id"], "u1");
    }

    #[test]
    fn test_auth_event_constructors() {
        assert_eq!(AuthEvent::signed_out().kind, AuthEventKind::SignedOut);
        assert!(AuthEvent::signed_out().user.is_none());
    }
}
