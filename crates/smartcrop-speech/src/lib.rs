//! Speech input and output for Smart Crop Advisor.
//!
//! Synthesis and recognition are delegated to external programs found on
//! `PATH`. Availability is checked once, at startup; afterwards the
//! [`SpeechBridge`] silently skips whatever the host cannot do.

pub mod bridge;
pub mod capability;
pub mod error;
pub mod recognize;
pub mod synth;

pub use bridge::SpeechBridge;
pub use capability::SpeechCapabilities;
pub use error::SpeechError;
pub use recognize::{CommandRecognizer, RecognitionSession, SpeechRecognizer};
pub use synth::{CommandSynthesizer, SpeechSynthesizer, Utterance};
