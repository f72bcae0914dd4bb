//! CLI argument definitions for the `smartcrop` binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use smartcrop_core::types::Language;
use std::path::PathBuf;

/// Smart Crop Advisor: voice-first farming guidance in the terminal.
#[derive(Parser, Debug)]
#[command(name = "smartcrop", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Language for questions and spoken answers (english, hindi, punjabi).
    #[arg(long = "language")]
    pub language: Option<Language>,

    /// Disable speech synthesis and recognition.
    #[arg(long = "no-speech")]
    pub no_speech: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Ask the built-in farming assistant one question.
    Ask {
        question: Vec<String>,
        /// Read the answer aloud.
        #[arg(long)]
        speak: bool,
    },
    /// List crops, optionally filtered.
    Crops {
        #[arg(long)]
        soil: Option<String>,
        #[arg(long)]
        season: Option<String>,
    },
    /// Refresh and show the weather forecast.
    Weather {
        #[arg(long)]
        location: Option<String>,
    },
    /// Interactive shell (the default).
    Shell,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > SMARTCROP_CONFIG env var > ~/.smartcrop/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("SMARTCROP_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }

    pub fn resolve_language(&self, config_language: Language) -> Language {
        self.language.unwrap_or(config_language)
    }

    pub fn command(&self) -> CliCommand {
        self.command.clone().unwrap_or(CliCommand::Shell)
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".smartcrop").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".smartcrop").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_defaults_to_shell() {
        let cli = parse(&["smartcrop"]);
        assert_eq!(cli.command(), CliCommand::Shell);
        assert!(!cli.no_speech);
        assert_eq!(cli.resolve_log_level("warn"), "warn");
        assert_eq!(cli.resolve_language(Language::Hindi), Language::Hindi);
    }

    #[test]
    fn test_global_flags() {
        let cli = parse(&[
            "smartcrop",
            "-c",
            "/tmp/sc.toml",
            "-l",
            "debug",
            "--language",
            "punjabi",
            "--no-speech",
        ]);
        assert_eq!(cli.resolve_config_path(), PathBuf::from("/tmp/sc.toml"));
        assert_eq!(cli.resolve_log_level("info"), "debug");
        assert_eq!(cli.resolve_language(Language::English), Language::Punjabi);
        assert!(cli.no_speech);
    }

    #[test]
    fn test_unknown_language_rejected() {
        assert!(CliArgs::try_parse_from(["smartcrop", "--language", "french"]).is_err());
    }

    #[test]
    fn test_ask_collects_words() {
        let cli = parse(&["smartcrop", "ask", "--speak", "how", "much", "water?"]);
        assert_eq!(
            cli.command(),
            CliCommand::Ask {
                question: vec!["how".into(), "much".into(), "water?".into()],
                speak: true,
            }
        );
    }

    #[test]
    fn test_crops_and_weather_options() {
        let cli = parse(&["smartcrop", "crops", "--soil", "loamy"]);
        assert_eq!(
            cli.command(),
            CliCommand::Crops {
                soil: Some("loamy".into()),
                season: None,
            }
        );

        let cli = parse(&["smartcrop", "weather", "--location", "Ludhiana"]);
        assert_eq!(
            cli.command(),
            CliCommand::Weather {
                location: Some("Ludhiana".into()),
            }
        );
    }
}
