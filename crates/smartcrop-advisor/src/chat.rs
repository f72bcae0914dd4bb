//! Chat service: sends questions and keeps the visible history.
//!
//! History is newest first. With a local answer source it lives only in this
//! service; with a remote source the backend owns it and it is re-read after
//! every send.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use smartcrop_core::config::AssistantConfig;
use smartcrop_core::types::{ChatMessage, Language};
use smartcrop_gateway::SessionContext;

use crate::error::ChatError;
use crate::source::AnswerSource;

pub struct ChatService {
    session: Arc<SessionContext>,
    source: Arc<dyn AnswerSource>,
    history_limit: usize,
    messages: Mutex<Vec<ChatMessage>>,
    loading: AtomicBool,
}

/// Clears the loading flag when a send finishes, however it finishes.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ChatService {
    pub fn new(
        session: Arc<SessionContext>,
        source: Arc<dyn AnswerSource>,
        config: &AssistantConfig,
    ) -> Self {
        Self {
            session,
            source,
            history_limit: config.history_limit,
            messages: Mutex::new(Vec::new()),
            loading: AtomicBool::new(false),
        }
    }

    pub fn source(&self) -> &Arc<dyn AnswerSource> {
        &self.source
    }

    /// Visible history, newest first.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ChatMessage>> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Ask a question as the signed-in user.
    ///
    /// Fails with [`ChatError::NotSignedIn`] before doing anything when nobody
    /// is signed in.
    pub async fn send_message(
        &self,
        question: &str,
        language: Language,
    ) -> Result<ChatMessage, ChatError> {
        let user = self.session.current_user().ok_or(ChatError::NotSignedIn)?;
        let question = question.trim();
        if question.is_empty() {
            return Err(ChatError::EmptyQuestion);
        }

        let _loading = LoadingGuard::start(&self.loading);
        let answer = self.source.answer(question, language, &user).await?;
        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            question: question.to_string(),
            answer,
            question_language: language,
            answer_language: language,
            created_at: Utc::now(),
        };
        tracing::debug!(
            source = ?self.source.kind(),
            language = %language,
            "Question answered"
        );

        if self.source.persists_history() {
            if let Err(e) = self.fetch_history().await {
                // The answer still reached the user; show it locally.
                tracing::warn!(error = %e, "Chat history refresh failed after send");
                self.lock().insert(0, message.clone());
            }
        } else {
            self.lock().insert(0, message.clone());
        }
        Ok(message)
    }

    /// Replace the visible history with the backend's rows for the signed-in
    /// user. Does nothing when signed out.
    pub async fn fetch_history(&self) -> Result<(), ChatError> {
        let Some(user) = self.session.current_user() else {
            return Ok(());
        };
        let rows = self
            .session
            .gateway()
            .fetch_chat_history(&user.id, self.history_limit)
            .await?;
        tracing::debug!(count = rows.len(), "Chat history loaded");
        *self.lock() = rows;
        Ok(())
    }

    /// Drop the in-memory history, e.g. after sign-out.
    pub fn clear(&self) {
        self.lock().clear();
    }
}
