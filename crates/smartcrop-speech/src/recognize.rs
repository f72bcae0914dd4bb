//! Speech-to-text backends.
//!
//! Recognition is toggled: [`SpeechRecognizer::start`] begins capturing and
//! [`RecognitionSession::finish`] stops it and yields the transcript.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::{Child, Command};

use crate::error::SpeechError;

/// Placeholder in recognizer arguments replaced by the session locale.
pub const LOCALE_PLACEHOLDER: &str = "{locale}";

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn start(&self, locale: &str) -> Result<Box<dyn RecognitionSession>, SpeechError>;
}

/// A capture in progress.
#[async_trait]
pub trait RecognitionSession: Send {
    /// Stop capturing and return what was heard, trimmed.
    async fn finish(self: Box<Self>) -> Result<String, SpeechError>;
}

/// Runs an external recognizer that records until its stdin is closed, then
/// prints the transcript on stdout.
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
}

impl CommandRecognizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn args_for(&self, locale: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.replace(LOCALE_PLACEHOLDER, locale))
            .collect()
    }
}

#[async_trait]
impl SpeechRecognizer for CommandRecognizer {
    async fn start(&self, locale: &str) -> Result<Box<dyn RecognitionSession>, SpeechError> {
        let child = Command::new(&self.program)
            .args(self.args_for(locale))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SpeechError::Spawn {
                program: self.program.clone(),
                message: e.to_string(),
            })?;
        tracing::debug!(program = %self.program, locale, "Recognizer started");
        Ok(Box::new(CommandSession { child }))
    }
}

struct CommandSession {
    child: Child,
}

#[async_trait]
impl RecognitionSession for CommandSession {
    async fn finish(mut self: Box<Self>) -> Result<String, SpeechError> {
        // Closing stdin tells the recognizer to stop recording.
        drop(self.child.stdin.take());
        let output = self.child.wait_with_output().await?;
        if !output.status.success() {
            return Err(SpeechError::Failed(format!(
                "recognizer exited with {}",
                output.status
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
