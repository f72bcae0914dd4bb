//! Smart Crop Advisor binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing
//! 3. Build the backend gateway, session, speech bridge and answer source
//! 4. Run one subcommand, or the interactive shell

mod cli;
mod shell;

use std::sync::Arc;

use clap::Parser;
use smartcrop_advisor::{answer_source_for, AdvisoryMatcher, ChatService};
use smartcrop_core::config::{BackendConfig, SmartCropConfig};
use smartcrop_core::types::CropFilter;
use smartcrop_gateway::{GatewayError, RestGateway, SessionContext, SessionGateway};
use smartcrop_speech::SpeechBridge;
use smartcrop_ui::{Notifier, RecordStore, Tab, ViewController};

use cli::{CliArgs, CliCommand};

fn build_gateway(config: &BackendConfig) -> Result<Arc<dyn SessionGateway>, GatewayError> {
    if !config.is_configured() {
        return Err(GatewayError::NotConfigured(
            "set backend.url and backend.anon_key in the config file, or SMARTCROP_BACKEND_URL and SMARTCROP_ANON_KEY"
                .to_string(),
        ));
    }
    Ok(Arc::new(RestGateway::new(config)?))
}

fn print_notices(notifier: &Notifier) {
    for notice in notifier.drain() {
        println!("{notice}");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = SmartCropConfig::load_or_default(&config_file);
    config.apply_env_overrides();
    if args.no_speech {
        config.speech.enabled = false;
    }
    let language = args.resolve_language(config.general.default_language);

    // Tracing.
    let level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Smart Crop Advisor v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), language = %language, "Configuration loaded");

    // Speech.
    let speech = Arc::new(SpeechBridge::from_config(&config.speech));
    let caps = speech.capabilities();
    tracing::info!(
        synthesis = caps.synthesis,
        recognition = caps.recognition,
        "Speech bridge ready"
    );

    if let CliCommand::Ask { question, speak } = args.command() {
        // The keyword assistant needs no backend.
        let question = question.join(" ");
        let answer = AdvisoryMatcher::new().answer(&question);
        println!("{answer}");
        if speak {
            speech.speak(answer, language.speech_locale());
            speech.finish_speaking().await;
        }
        return Ok(());
    }

    // Backend.
    let gateway = match build_gateway(&config.backend) {
        Ok(gw) => gw,
        Err(e) => {
            tracing::error!(error = %e, "Backend unavailable");
            return Err(e.into());
        }
    };
    let session = SessionContext::new(Arc::clone(&gateway));
    let notifier = Arc::new(Notifier::new());
    let records = RecordStore::new(Arc::clone(&gateway), Arc::clone(&notifier), &config.weather);
    let source = answer_source_for(config.assistant.source, Arc::clone(&gateway));
    let chat = ChatService::new(Arc::clone(&session), source, &config.assistant);
    let mut view = ViewController::new(session, chat, records, speech, notifier, language);

    match args.command() {
        CliCommand::Crops { soil, season } => {
            let filter = CropFilter {
                soil_type: soil,
                season,
            };
            view.fetch_crops(&filter).await;
            view.set_tab(Tab::Crops);
            print_notices(view.notifier());
            println!("{}", view.render());
        }
        CliCommand::Weather { location } => {
            view.refresh_weather(location.as_deref()).await;
            print_notices(view.notifier());
            println!("{}", view.render());
        }
        CliCommand::Ask { .. } | CliCommand::Shell => shell::run(view).await?,
    }

    Ok(())
}
