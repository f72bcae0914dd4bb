//! Where answers come from.
//!
//! A deployment picks exactly one [`AnswerSource`]: the local keyword matcher,
//! whose history lives only in memory, or the remote "chatbot" function, whose
//! history the backend persists.

use std::sync::Arc;

use async_trait::async_trait;

use smartcrop_core::config::AnswerSourceKind;
use smartcrop_core::types::{AuthUser, Language};
use smartcrop_gateway::{ChatbotRequest, GatewayError, SessionGateway};

use crate::matcher::AdvisoryMatcher;

/// Produces an answer for a signed-in user's question.
#[async_trait]
pub trait AnswerSource: Send + Sync {
    async fn answer(
        &self,
        question: &str,
        language: Language,
        user: &AuthUser,
    ) -> Result<String, GatewayError>;

    /// Whether answered questions are stored by the backend, so history
    /// should be re-read instead of kept locally.
    fn persists_history(&self) -> bool;

    fn kind(&self) -> AnswerSourceKind;
}

/// Answers from the built-in advisory rules. Never fails.
#[derive(Default)]
pub struct LocalAnswerSource {
    matcher: AdvisoryMatcher,
}

impl LocalAnswerSource {
    pub fn new(matcher: AdvisoryMatcher) -> Self {
        Self { matcher }
    }
}

#[async_trait]
impl AnswerSource for LocalAnswerSource {
    async fn answer(
        &self,
        question: &str,
        _language: Language,
        _user: &AuthUser,
    ) -> Result<String, GatewayError> {
        Ok(self.matcher.answer(question).to_string())
    }

    fn persists_history(&self) -> bool {
        false
    }

    fn kind(&self) -> AnswerSourceKind {
        AnswerSourceKind::Local
    }
}

/// Answers from the backend's "chatbot" function.
pub struct RemoteAnswerSource {
    gateway: Arc<dyn SessionGateway>,
}

impl RemoteAnswerSource {
    pub fn new(gateway: Arc<dyn SessionGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl AnswerSource for RemoteAnswerSource {
    async fn answer(
        &self,
        question: &str,
        language: Language,
        user: &AuthUser,
    ) -> Result<String, GatewayError> {
        let request = ChatbotRequest {
            question: question.to_string(),
            language,
            user_id: user.id.clone(),
        };
        let reply = self.gateway.invoke_chatbot(&request).await?;
        Ok(reply.answer)
    }

    fn persists_history(&self) -> bool {
        true
    }

    fn kind(&self) -> AnswerSourceKind {
        AnswerSourceKind::Remote
    }
}

/// Build the source selected by configuration.
pub fn answer_source_for(
    kind: AnswerSourceKind,
    gateway: Arc<dyn SessionGateway>,
) -> Arc<dyn AnswerSource> {
    match kind {
        AnswerSourceKind::Local => Arc::new(LocalAnswerSource::default()),
        AnswerSourceKind::Remote => Arc::new(RemoteAnswerSource::new(gateway)),
    }
}
