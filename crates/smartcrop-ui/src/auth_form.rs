//! Sign-in / sign-up form with voice entry for name and location.

use std::fmt;

use smartcrop_core::types::UserMetadata;
use smartcrop_gateway::SessionContext;
use smartcrop_speech::{SpeechBridge, SpeechError};

use crate::error::AuthFormError;
use crate::notice::{self, Notifier};

pub const SIGN_UP_INSTRUCTIONS: &str = "Please fill in your details to create an account. You can use voice input for name and location.";
pub const SIGN_IN_INSTRUCTIONS: &str = "Please enter your email and password to sign in.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

impl AuthMode {
    pub fn title(&self) -> &'static str {
        match self {
            AuthMode::SignIn => "Sign In",
            AuthMode::SignUp => "Create Account",
        }
    }

    pub fn instructions(&self) -> &'static str {
        match self {
            AuthMode::SignIn => SIGN_IN_INSTRUCTIONS,
            AuthMode::SignUp => SIGN_UP_INSTRUCTIONS,
        }
    }
}

/// Fields that accept voice input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceField {
    Name,
    Location,
}

impl VoiceField {
    pub fn prompt(&self) -> &'static str {
        match self {
            VoiceField::Name => "Please say your name",
            VoiceField::Location => "Please say your location",
        }
    }
}

impl fmt::Display for VoiceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceField::Name => write!(f, "name"),
            VoiceField::Location => write!(f, "location"),
        }
    }
}

/// What a voice toggle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceToggle {
    /// Prompt spoken, listening started.
    Listening,
    /// Listening stopped; the field now holds this transcript.
    Filled(String),
    /// No recognizer on this host.
    Unavailable,
}

/// What a successful submission led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    SignedIn,
    /// Account created; the user must confirm their e-mail before signing in.
    ConfirmationSent,
}

#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub name: String,
    pub location: String,
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Speak the instructions for the current mode.
    pub fn speak_instructions(&self, speech: &SpeechBridge, locale: &str) {
        speech.speak(self.mode.instructions(), locale);
    }

    /// First toggle speaks the field prompt and starts listening; the next
    /// one stops and writes the transcript into `field`.
    pub async fn toggle_voice(
        &mut self,
        field: VoiceField,
        speech: &SpeechBridge,
        locale: &str,
    ) -> Result<VoiceToggle, SpeechError> {
        if speech.is_listening() {
            let transcript = speech.stop_listening().await?;
            match field {
                VoiceField::Name => self.name = transcript.clone(),
                VoiceField::Location => self.location = transcript.clone(),
            }
            tracing::debug!(field = %field, "Field filled from voice");
            return Ok(VoiceToggle::Filled(transcript));
        }

        if !speech.capabilities().recognition {
            tracing::debug!(field = %field, "Voice input unavailable");
            return Ok(VoiceToggle::Unavailable);
        }
        speech.speak(field.prompt(), locale);
        speech.start_listening(locale).await?;
        Ok(VoiceToggle::Listening)
    }

    /// Check required fields before anything is sent.
    pub fn validate(&self) -> Result<(), AuthFormError> {
        if self.mode == AuthMode::SignUp && self.name.trim().is_empty() {
            return Err(AuthFormError::MissingField("Name"));
        }
        if self.email.trim().is_empty() {
            return Err(AuthFormError::MissingField("Email"));
        }
        if self.password.is_empty() {
            return Err(AuthFormError::MissingField("Password"));
        }
        Ok(())
    }

    fn profile(&self) -> UserMetadata {
        let location = self.location.trim();
        UserMetadata {
            name: Some(self.name.trim().to_string()),
            location: (!location.is_empty()).then(|| location.to_string()),
        }
    }

    /// Sign in or sign up, raising the matching notice either way.
    pub async fn submit(
        &mut self,
        session: &SessionContext,
        notifier: &Notifier,
    ) -> Result<AuthOutcome, AuthFormError> {
        self.validate()?;
        let result = self.send(session, notifier).await;
        if result.is_ok() {
            self.password.clear();
        }
        result
    }

    async fn send(
        &self,
        session: &SessionContext,
        notifier: &Notifier,
    ) -> Result<AuthOutcome, AuthFormError> {
        let email = self.email.trim();
        match self.mode {
            AuthMode::SignUp => match session.sign_up(email, &self.password, &self.profile()).await {
                Ok(outcome) if outcome.needs_confirmation() => {
                    notifier.info(notice::CHECK_EMAIL, notice::CHECK_EMAIL_DETAIL);
                    Ok(AuthOutcome::ConfirmationSent)
                }
                Ok(_) => Ok(AuthOutcome::SignedIn),
                Err(e) => {
                    tracing::warn!(error = %e, "Sign-up failed");
                    notifier.destructive(notice::SIGN_UP_FAILED, &e.user_message());
                    Err(e.into())
                }
            },
            AuthMode::SignIn => match session.sign_in(email, &self.password).await {
                Ok(_) => {
                    notifier.info(notice::WELCOME_BACK, notice::WELCOME_BACK_DETAIL);
                    Ok(AuthOutcome::SignedIn)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Sign-in failed");
                    notifier.destructive(notice::SIGN_IN_FAILED, &e.user_message());
                    Err(e.into())
                }
            },
        }
    }
}
