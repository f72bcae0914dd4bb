//! Dismissible notices shown after user actions.

use std::fmt;
use std::sync::Mutex;

pub const CHECK_EMAIL: &str = "Check your email";
pub const CHECK_EMAIL_DETAIL: &str = "Please check your email for verification link.";
pub const SIGN_UP_FAILED: &str = "Sign up failed";
pub const WELCOME_BACK: &str = "Welcome back!";
pub const WELCOME_BACK_DETAIL: &str = "Successfully signed in.";
pub const SIGN_IN_FAILED: &str = "Sign in failed";
pub const SIGNED_OUT: &str = "Signed out";
pub const SIGNED_OUT_DETAIL: &str = "You have been signed out successfully.";
pub const SIGN_OUT_FAILED: &str = "Sign out failed";
pub const PLEASE_SIGN_IN: &str = "Please sign in";
pub const PLEASE_SIGN_IN_DETAIL: &str = "You need to be signed in to ask questions.";
pub const CROPS_FETCH_FAILED: &str = "Failed to fetch crops";
pub const WEATHER_FETCH_FAILED: &str = "Weather fetch failed";
pub const HISTORY_FETCH_FAILED: &str = "Failed to fetch chat history";
pub const SEND_FAILED: &str = "Failed to send message";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeVariant {
    Default,
    /// Something failed.
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn info(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            variant: NoticeVariant::Default,
        }
    }

    pub fn destructive(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            variant: NoticeVariant::Destructive,
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.variant == NoticeVariant::Destructive
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.variant {
            NoticeVariant::Default => "*",
            NoticeVariant::Destructive => "!",
        };
        if self.description.is_empty() {
            write!(f, "{} {}", marker, self.title)
        } else {
            write!(f, "{} {}: {}", marker, self.title, self.description)
        }
    }
}

/// Queue of pending notices. Views push; the shell drains and prints.
#[derive(Debug, Default)]
pub struct Notifier {
    pending: Mutex<Vec<Notice>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, notice: Notice) {
        if notice.is_destructive() {
            tracing::debug!(title = %notice.title, "Error notice raised");
        }
        self.lock().push(notice);
    }

    pub fn info(&self, title: &str, description: &str) {
        self.push(Notice::info(title, description));
    }

    pub fn destructive(&self, title: &str, description: &str) {
        self.push(Notice::destructive(title, description));
    }

    /// Take every pending notice, oldest first.
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.lock())
    }

    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    pub fn latest(&self) -> Option<Notice> {
        self.lock().last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notice>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}
