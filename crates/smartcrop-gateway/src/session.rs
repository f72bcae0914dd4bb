//! Owned authentication context.
//!
//! One [`SessionContext`] per process holds the current user and a loading
//! flag. Views receive it by `Arc` and read or watch it; nothing else keeps
//! auth state. [`SessionContext::subscribe`] starts following the gateway's
//! auth events and returns an [`AuthSubscription`] that must be dropped or
//! explicitly unsubscribed on teardown.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use smartcrop_core::types::{AuthSession, AuthUser, UserMetadata};

use crate::error::GatewayError;
use crate::gateway::{AuthEvent, AuthEventKind, SessionGateway, SignUpOutcome};

/// Snapshot of who is signed in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<AuthUser>,
    /// True until the initial session lookup has completed.
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

/// Single owner of process-wide auth state.
pub struct SessionContext {
    gateway: Arc<dyn SessionGateway>,
    state: watch::Sender<SessionState>,
}

impl SessionContext {
    pub fn new(gateway: Arc<dyn SessionGateway>) -> Arc<Self> {
        let (state, _) = watch::channel(SessionState::default());
        Arc::new(Self { gateway, state })
    }

    pub fn gateway(&self) -> &Arc<dyn SessionGateway> {
        &self.gateway
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.state.borrow().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Load the initial session and follow auth events until the returned
    /// subscription is dropped.
    pub async fn subscribe(self: &Arc<Self>) -> AuthSubscription {
        // Subscribe before reading so no event between the two is lost.
        let mut events = self.gateway.auth_events();
        let initial = self.gateway.current_session().await;
        self.set_user(initial.map(|s| s.user));

        let ctx = Arc::clone(self);
        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => ctx.apply(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Auth events lagged; resyncing");
                        let current = ctx.gateway.current_session().await;
                        ctx.set_user(current.map(|s| s.user));
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        tracing::debug!("Auth subscription started");
        AuthSubscription { task: Some(task) }
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: &UserMetadata,
    ) -> Result<SignUpOutcome, GatewayError> {
        let outcome = self.gateway.sign_up(email, password, profile).await?;
        if let Some(session) = &outcome.session {
            self.set_user(Some(session.user.clone()));
        }
        Ok(outcome)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, GatewayError> {
        let session = self.gateway.sign_in(email, password).await?;
        self.set_user(Some(session.user.clone()));
        Ok(session)
    }

    pub async fn sign_out(&self) -> Result<(), GatewayError> {
        self.gateway.sign_out().await?;
        self.set_user(None);
        Ok(())
    }

    fn apply(&self, event: AuthEvent) {
        match event.kind {
            AuthEventKind::SignedIn => self.set_user(event.user),
            AuthEventKind::SignedOut => self.set_user(None),
        }
    }

    fn set_user(&self, user: Option<AuthUser>) {
        self.state.send_if_modified(|state| {
            let changed = state.user != user || state.loading;
            state.user = user;
            state.loading = false;
            changed
        });
    }
}

/// Live subscription to auth events. Dropping it stops the listener.
pub struct AuthSubscription {
    task: Option<JoinHandle<()>>,
}

impl AuthSubscription {
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn unsubscribe(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Auth subscription stopped");
        }
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}
