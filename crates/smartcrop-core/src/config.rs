use std::path::Path;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SmartCropError};
use crate::types::Language;

/// Top-level configuration for Smart Crop Advisor.
///
/// Loaded from `~/.smartcrop/config.toml` by default. Every section is
/// optional; missing sections take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmartCropConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
}

impl SmartCropConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SmartCropConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SmartCropError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Apply `SMARTCROP_BACKEND_URL` / `SMARTCROP_ANON_KEY` overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var("SMARTCROP_BACKEND_URL").ok(),
            std::env::var("SMARTCROP_ANON_KEY").ok(),
        );
    }

    fn apply_overrides(&mut self, url: Option<String>, anon_key: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.backend.url = url;
        }
        if let Some(key) = anon_key.filter(|k| !k.trim().is_empty()) {
            self.backend.anon_key = key;
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Language used for questions and spoken answers.
    pub default_language: Language,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            default_language: Language::English,
        }
    }
}

/// Hosted backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://your-project.supabase.co`.
    pub url: String,
    /// Public anonymous API key sent with every request.
    pub anon_key: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl BackendConfig {
    /// The anon key wrapped so it never shows up in `Debug` output.
    pub fn anon_key_secret(&self) -> SecretString {
        SecretString::from(self.anon_key.clone())
    }

    /// Whether a usable backend URL and key are configured.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
            && !self.anon_key.trim().is_empty()
            && self.url != DEFAULT_BACKEND_URL
    }
}

/// Placeholder URL shipped in the default config.
pub const DEFAULT_BACKEND_URL: &str = "https://your-project.supabase.co";

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BACKEND_URL.to_string(),
            anon_key: String::new(),
            timeout_secs: 15,
        }
    }
}

/// Speech synthesis and recognition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Master switch; when false both capabilities report unavailable.
    pub enabled: bool,
    /// Default synthesis locale.
    pub locale: String,
    /// Speaking rate multiplier (1.0 = normal).
    pub rate: f32,
    /// Pitch multiplier (1.0 = normal).
    pub pitch: f32,
    /// Text-to-speech program invoked per utterance.
    pub synth_program: String,
    /// Speech-to-text program. Records until its stdin closes, then prints
    /// the transcript on stdout.
    pub recognizer_program: Option<String>,
    /// Arguments for the recognizer; `{locale}` is replaced per session.
    pub recognizer_args: Vec<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            locale: "en-US".to_string(),
            rate: 0.8,
            pitch: 1.0,
            synth_program: "espeak-ng".to_string(),
            recognizer_program: None,
            recognizer_args: Vec::new(),
        }
    }
}

/// Which component answers farming questions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSourceKind {
    /// Keyword matcher, history kept in memory.
    #[default]
    Local,
    /// Hosted "chatbot" function, history persisted by the backend.
    Remote,
}

/// Farming assistant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub source: AnswerSourceKind,
    /// Maximum chat history rows fetched from the backend.
    pub history_limit: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            source: AnswerSourceKind::Local,
            history_limit: 20,
        }
    }
}

/// Weather forecast settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Location sent to the weather function when none is given.
    pub default_location: String,
    /// Number of forecast rows to read.
    pub forecast_days: usize,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            default_location: "Delhi".to_string(),
            forecast_days: 7,
        }
    }
}
