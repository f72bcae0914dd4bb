//! View layer for Smart Crop Advisor.
//!
//! Holds the tab state and wires user actions to the assistant, the record
//! stores, speech, and the session. Output is plain text so any front end
//! (the interactive shell in `smartcrop-app`, tests) can drive it.
//!
//! # Modules
//!
//! - [`view`]: the [`ViewController`] and text rendering per tab
//! - [`records`]: crop and weather stores with sample fallback
//! - [`auth_form`]: sign-in / sign-up form with voice entry
//! - [`notice`]: user-visible notices raised by failed or completed actions

pub mod auth_form;
pub mod error;
pub mod notice;
pub mod records;
pub mod samples;
pub mod view;

pub use auth_form::{AuthForm, AuthMode, AuthOutcome, VoiceField, VoiceToggle};
pub use error::AuthFormError;
pub use notice::{Notice, NoticeVariant, Notifier};
pub use records::RecordStore;
pub use samples::{sample_crops, WeatherSummary};
pub use view::{Tab, ViewController, QUICK_PROMPTS};
