//! Speech bridge: the single entry point views use for voice.
//!
//! At most one utterance plays at a time; a new `speak` cancels the previous
//! one. At most one recognition session is open at a time, opened and closed
//! by explicit toggles. When a capability is unavailable its operations are
//! no-ops that log at debug level.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use smartcrop_core::config::SpeechConfig;

use crate::capability::SpeechCapabilities;
use crate::error::SpeechError;
use crate::recognize::{CommandRecognizer, RecognitionSession, SpeechRecognizer};
use crate::synth::{CommandSynthesizer, SpeechSynthesizer, Utterance};

/// Which utterance is current and whether it is still playing. Only the task
/// for the current generation may clear `speaking`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PlaybackStatus {
    generation: u64,
    speaking: bool,
}

pub struct SpeechBridge {
    capabilities: SpeechCapabilities,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    default_locale: String,
    rate: f32,
    pitch: f32,
    status: Arc<watch::Sender<PlaybackStatus>>,
    playback: Mutex<Option<JoinHandle<()>>>,
    listening: Mutex<Option<Box<dyn RecognitionSession>>>,
}

impl SpeechBridge {
    /// Bridge with explicit backends. A capability is only usable when both
    /// the flag is set and a backend is present.
    pub fn new(
        capabilities: SpeechCapabilities,
        synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
        recognizer: Option<Arc<dyn SpeechRecognizer>>,
        config: &SpeechConfig,
    ) -> Self {
        let capabilities = SpeechCapabilities {
            synthesis: capabilities.synthesis && synthesizer.is_some(),
            recognition: capabilities.recognition && recognizer.is_some(),
        };
        Self {
            capabilities,
            synthesizer,
            recognizer,
            default_locale: config.locale.clone(),
            rate: config.rate,
            pitch: config.pitch,
            status: Arc::new(watch::Sender::new(PlaybackStatus::default())),
            playback: Mutex::new(None),
            listening: Mutex::new(None),
        }
    }

    /// Detect capabilities once and wire up the configured programs.
    pub fn from_config(config: &SpeechConfig) -> Self {
        let caps = SpeechCapabilities::detect(config);
        let synthesizer = caps.synthesis.then(|| {
            Arc::new(CommandSynthesizer::new(config.synth_program.trim()))
                as Arc<dyn SpeechSynthesizer>
        });
        let recognizer: Option<Arc<dyn SpeechRecognizer>> = match &config.recognizer_program {
            Some(program) if caps.recognition => Some(Arc::new(CommandRecognizer::new(
                program.trim(),
                config.recognizer_args.clone(),
            ))),
            _ => None,
        };
        Self::new(caps, synthesizer, recognizer, config)
    }

    /// Bridge with no speech at all.
    pub fn disabled() -> Self {
        Self::new(SpeechCapabilities::none(), None, None, &SpeechConfig::default())
    }

    pub fn capabilities(&self) -> SpeechCapabilities {
        self.capabilities
    }

    /// Locale for text that is not tied to the user's language.
    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn is_speaking(&self) -> bool {
        self.status.borrow().speaking
    }

    pub fn is_listening(&self) -> bool {
        self.listening_slot().is_some()
    }

    fn playback_slot(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.playback.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn listening_slot(&self) -> std::sync::MutexGuard<'_, Option<Box<dyn RecognitionSession>>> {
        self.listening.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start speaking `text`, cancelling whatever is playing. Returns
    /// immediately; playback runs in the background.
    pub fn speak(&self, text: &str, locale: &str) {
        let Some(synth) = self.synthesizer.as_ref().filter(|_| self.capabilities.synthesis) else {
            tracing::debug!("Speech synthesis unavailable; not speaking");
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime; not speaking");
            return;
        };

        let utterance = Utterance {
            text: text.to_string(),
            locale: locale.to_string(),
            rate: self.rate,
            pitch: self.pitch,
        };

        let mut slot = self.playback_slot();
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        let mut generation = 0;
        self.status.send_modify(|s| {
            s.generation += 1;
            s.speaking = true;
            generation = s.generation;
        });

        let synth = Arc::clone(synth);
        let status = Arc::clone(&self.status);
        *slot = Some(runtime.spawn(async move {
            if let Err(e) = synth.speak(&utterance).await {
                tracing::warn!(error = %e, "Speech synthesis failed");
            }
            status.send_if_modified(|s| {
                let current = s.generation == generation && s.speaking;
                if current {
                    s.speaking = false;
                }
                current
            });
        }));
        tracing::debug!(locale = %locale, chars = text.len(), "Utterance started");
    }

    /// Cancel the current utterance, if any.
    pub fn stop(&self) {
        if let Some(task) = self.playback_slot().take() {
            task.abort();
        }
        self.status.send_modify(|s| {
            s.generation += 1;
            s.speaking = false;
        });
    }

    /// Wait until nothing is playing. An utterance started while waiting
    /// still replaces the current one and is waited for in turn.
    pub async fn finish_speaking(&self) {
        let mut status = self.status.subscribe();
        // The sender lives as long as `self`, so this only ends on idle.
        let _ = status.wait_for(|s| !s.speaking).await;
    }

    /// Open a recognition session. Returns `Ok(false)` without doing anything
    /// when recognition is unavailable.
    pub async fn start_listening(&self, locale: &str) -> Result<bool, SpeechError> {
        let Some(recognizer) = self.recognizer.as_ref().filter(|_| self.capabilities.recognition)
        else {
            tracing::debug!("Speech recognition unavailable; not listening");
            return Ok(false);
        };
        if self.is_listening() {
            return Err(SpeechError::AlreadyListening);
        }
        let session = recognizer.start(locale).await?;
        let mut slot = self.listening_slot();
        if slot.is_some() {
            return Err(SpeechError::AlreadyListening);
        }
        *slot = Some(session);
        Ok(true)
    }

    /// Close the open recognition session and return its transcript.
    pub async fn stop_listening(&self) -> Result<String, SpeechError> {
        let session = self.listening_slot().take();
        match session {
            Some(session) => session.finish().await,
            None => Err(SpeechError::NotListening),
        }
    }

    /// Start listening if idle, otherwise stop and return the transcript.
    /// Returns `Ok(None)` when a session was just opened or recognition is
    /// unavailable.
    pub async fn toggle_listening(&self, locale: &str) -> Result<Option<String>, SpeechError> {
        if self.is_listening() {
            return self.stop_listening().await.map(Some);
        }
        self.start_listening(locale).await?;
        Ok(None)
    }
}
