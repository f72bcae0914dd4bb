//! View controller: tab state, user actions, and plain-text rendering.
//!
//! Every collaborator failure ends up as a [`Notice`](crate::notice::Notice);
//! nothing here returns a backend error to the caller except the auth form,
//! whose validation errors the caller shows itself.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use smartcrop_advisor::{ChatError, ChatService};
use smartcrop_core::error::SmartCropError;
use smartcrop_core::types::{ChatMessage, CropFilter, CropRecord, Language};
use smartcrop_gateway::SessionContext;
use smartcrop_speech::{SpeechBridge, SpeechError};

use crate::auth_form::{AuthForm, AuthMode, AuthOutcome, VoiceField, VoiceToggle};
use crate::error::AuthFormError;
use crate::notice::{self, Notifier};
use crate::records::RecordStore;
use crate::samples::WeatherSummary;

pub const WELCOME_SIGNED_IN: &str = "Welcome back to Smart Crop Advisor! You can check weather, browse crops, or ask our farming assistant.";
pub const WELCOME_SIGNED_OUT: &str = "Welcome to Smart Crop Advisor! Please sign in to access all features including weather forecast and personalized crop advice.";

/// Canned questions offered on the chat tab.
pub const QUICK_PROMPTS: [&str; 4] = [
    "Best crops for this season",
    "Pest control advice",
    "Fertilizer tips",
    "Weather forecast",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tab {
    #[default]
    Home,
    Crops,
    Chat,
    Profile,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Home, Tab::Crops, Tab::Chat, Tab::Profile];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::Crops => "Crops",
            Tab::Chat => "Chat",
            Tab::Profile => "Profile",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tab {
    type Err = SmartCropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "home" => Ok(Tab::Home),
            "crops" => Ok(Tab::Crops),
            "chat" => Ok(Tab::Chat),
            "profile" => Ok(Tab::Profile),
            other => Err(SmartCropError::Validation(format!("unknown tab: {other}"))),
        }
    }
}

pub struct ViewController {
    session: Arc<SessionContext>,
    chat: ChatService,
    records: RecordStore,
    speech: Arc<SpeechBridge>,
    notifier: Arc<Notifier>,
    auth: AuthForm,
    tab: Tab,
    language: Language,
}

impl ViewController {
    pub fn new(
        session: Arc<SessionContext>,
        chat: ChatService,
        records: RecordStore,
        speech: Arc<SpeechBridge>,
        notifier: Arc<Notifier>,
        language: Language,
    ) -> Self {
        Self {
            session,
            chat,
            records,
            speech,
            notifier,
            auth: AuthForm::default(),
            tab: Tab::Home,
            language,
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: Tab) {
        tracing::debug!(from = %self.tab, to = %tab, "Tab changed");
        self.tab = tab;
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn chat(&self) -> &ChatService {
        &self.chat
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn speech(&self) -> &Arc<SpeechBridge> {
        &self.speech
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    pub fn auth_form(&mut self) -> &mut AuthForm {
        &mut self.auth
    }

    fn locale(&self) -> &'static str {
        self.language.speech_locale()
    }

    /// Initial loads: all crops, today's weather for the default location,
    /// and chat history when already signed in.
    pub async fn load(&self) {
        let _ = self.records.fetch_crops(&CropFilter::default()).await;
        let _ = self.records.refresh_weather(None).await;
        if self.session.current_user().is_some() {
            self.load_history().await;
        }
    }

    pub async fn fetch_crops(&self, filter: &CropFilter) {
        let _ = self.records.fetch_crops(filter).await;
    }

    pub async fn refresh_weather(&self, location: Option<&str>) {
        let _ = self.records.refresh_weather(location).await;
    }

    /// Speak the greeting for the current auth state and return it.
    pub fn speak_welcome(&self) -> &'static str {
        let text = if self.session.current_user().is_some() {
            WELCOME_SIGNED_IN
        } else {
            WELCOME_SIGNED_OUT
        };
        self.speech.speak(text, self.speech.default_locale());
        text
    }

    /// Switch the auth form to `mode` and speak its instructions.
    pub fn speak_auth_instructions(&mut self, mode: AuthMode) -> &'static str {
        self.auth.mode = mode;
        self.auth
            .speak_instructions(&self.speech, self.speech.default_locale());
        mode.instructions()
    }

    /// Voice entry for an auth form field. The first call prompts and starts
    /// listening; the next one fills the field with what was heard.
    pub async fn voice_field(&mut self, field: VoiceField) -> Result<VoiceToggle, SpeechError> {
        let locale = self.locale();
        self.auth.toggle_voice(field, &self.speech, locale).await
    }

    /// "Listen to Tips" for the crop at `index` in the crops tab.
    pub fn listen_to_tip(&self, index: usize) -> Option<String> {
        let crop = self.records.display_crops().into_iter().nth(index)?;
        let tip = crop.tip_in(self.language).to_string();
        self.speech.speak(&tip, self.locale());
        Some(tip)
    }

    /// Ask the assistant and read the answer aloud.
    pub async fn ask(&self, question: &str) -> Option<ChatMessage> {
        match self.chat.send_message(question, self.language).await {
            Ok(message) => {
                self.speech.speak(&message.answer, self.locale());
                Some(message)
            }
            Err(ChatError::NotSignedIn) => {
                self.notifier
                    .destructive(notice::PLEASE_SIGN_IN, notice::PLEASE_SIGN_IN_DETAIL);
                None
            }
            Err(ChatError::EmptyQuestion) => {
                tracing::debug!("Ignoring empty question");
                None
            }
            Err(ChatError::Gateway(e)) => {
                tracing::warn!(error = %e, "Sending question failed");
                self.notifier
                    .destructive(notice::SEND_FAILED, &e.user_message());
                None
            }
        }
    }

    /// Send quick prompt `index` (zero-based) as a question.
    pub async fn quick_prompt(&self, index: usize) -> Option<ChatMessage> {
        let prompt = QUICK_PROMPTS.get(index)?;
        self.ask(prompt).await
    }

    /// Toggle voice input for a question. The second toggle asks whatever
    /// was heard.
    pub async fn voice_question(&self) -> Option<ChatMessage> {
        match self.speech.toggle_listening(self.locale()).await {
            Ok(Some(transcript)) if !transcript.trim().is_empty() => self.ask(&transcript).await,
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Voice input failed");
                None
            }
        }
    }

    pub async fn load_history(&self) {
        if let Err(e) = self.chat.fetch_history().await {
            tracing::warn!(error = %e, "Loading chat history failed");
            self.notifier
                .destructive(notice::HISTORY_FETCH_FAILED, &e.to_string());
        }
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<AuthOutcome, AuthFormError> {
        self.auth.mode = AuthMode::SignIn;
        self.auth.email = email.to_string();
        self.auth.password = password.to_string();
        let outcome = self.auth.submit(&self.session, &self.notifier).await?;
        self.load_history().await;
        Ok(outcome)
    }

    /// Sign up. A missing `name` or `location` keeps whatever the form
    /// already holds, e.g. from voice entry.
    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        name: Option<&str>,
        location: Option<&str>,
    ) -> Result<AuthOutcome, AuthFormError> {
        self.auth.mode = AuthMode::SignUp;
        self.auth.email = email.to_string();
        self.auth.password = password.to_string();
        if let Some(name) = name {
            self.auth.name = name.to_string();
        }
        if let Some(location) = location {
            self.auth.location = location.to_string();
        }
        let outcome = self.auth.submit(&self.session, &self.notifier).await?;
        self.auth.name.clear();
        self.auth.location.clear();
        Ok(outcome)
    }

    pub async fn sign_out(&self) {
        match self.session.sign_out().await {
            Ok(()) => {
                self.chat.clear();
                self.notifier
                    .info(notice::SIGNED_OUT, notice::SIGNED_OUT_DETAIL);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Sign-out failed");
                self.notifier
                    .destructive(notice::SIGN_OUT_FAILED, &e.user_message());
            }
        }
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// The current tab as plain text.
    pub fn render(&self) -> String {
        let mut lines = vec![self.render_header(), String::new()];
        match self.tab {
            Tab::Home => self.render_home(&mut lines),
            Tab::Crops => self.render_crops(&mut lines),
            Tab::Chat => self.render_chat(&mut lines),
            Tab::Profile => self.render_profile(&mut lines),
        }
        lines.join("\n")
    }

    fn render_header(&self) -> String {
        let tabs: Vec<String> = Tab::ALL
            .iter()
            .map(|t| {
                if *t == self.tab {
                    format!("[{}]", t.label())
                } else {
                    t.label().to_string()
                }
            })
            .collect();
        let account = match self.session.current_user() {
            Some(user) => user.display_email().to_string(),
            None if self.session.is_loading() => "loading...".to_string(),
            None => "signed out".to_string(),
        };
        format!("Smart Crop Advisor | {} | {}", tabs.join(" "), account)
    }

    fn render_home(&self, lines: &mut Vec<String>) {
        match self.session.current_user() {
            Some(user) => lines.push(format!("Welcome back, {}!", user.display_email())),
            None => lines.push("Welcome to Smart Crop Advisor".to_string()),
        }
        lines.push("Voice-first farming guidance for better crops".to_string());
        lines.push(String::new());

        lines.push("Today's Weather".to_string());
        lines.extend(weather_lines(&self.records.today()));
        lines.push(String::new());

        lines.push("Featured Crops This Season".to_string());
        for crop in self.records.featured_crops() {
            lines.push(format!("  {}{}", crop.name_in(self.language), badges(&crop)));
            let tip = crop.tip_in(self.language);
            if !tip.is_empty() {
                lines.push(format!("    {}", tip));
            }
        }
    }

    fn render_crops(&self, lines: &mut Vec<String>) {
        lines.push("Crop Advisory".to_string());
        for (i, crop) in self.records.display_crops().iter().enumerate() {
            let localized = crop.name_in(self.language);
            let name = if localized == crop.crop_name {
                crop.crop_name.clone()
            } else {
                format!("{} ({})", crop.crop_name, localized)
            };
            lines.push(format!("{:>2}. {}{}", i + 1, name, badges(crop)));
            let tip = crop.tip_in(self.language);
            if !tip.is_empty() {
                lines.push(format!("    {}", tip));
            }
        }
        lines.push(String::new());
        lines.push("Use `say <n>` to listen to a crop's tips.".to_string());
    }

    fn render_chat(&self, lines: &mut Vec<String>) {
        lines.push("Farming Assistant".to_string());
        lines.push(
            "Ask questions about farming, crops, weather, and get instant advice".to_string(),
        );
        lines.push(String::new());
        for (i, prompt) in QUICK_PROMPTS.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, prompt));
        }
        if self.session.current_user().is_none() {
            lines.push(String::new());
            lines.push("Sign in to ask questions.".to_string());
            return;
        }
        if self.chat.is_loading() {
            lines.push("Thinking...".to_string());
        }
        let messages = self.chat.messages();
        if !messages.is_empty() {
            lines.push(String::new());
            lines.push("Recent questions".to_string());
            for message in messages {
                lines.push(format!(
                    "  Q ({}): {}",
                    message.question_language, message.question
                ));
                lines.push(format!("  A: {}", message.answer));
            }
        }
    }

    fn render_profile(&self, lines: &mut Vec<String>) {
        lines.push("Profile & Settings".to_string());
        let Some(user) = self.session.current_user() else {
            lines.push("Sign in to access profile".to_string());
            lines.push(
                "Create an account to save your preferences and get personalized advice"
                    .to_string(),
            );
            return;
        };

        lines.push("Profile Information".to_string());
        lines.push(format!("  Email: {}", user.display_email()));
        if let Some(name) = &user.user_metadata.name {
            lines.push(format!("  Name: {}", name));
        }
        lines.push("Language Settings".to_string());
        for language in Language::ALL {
            let marker = if language == self.language { ">" } else { " " };
            lines.push(format!("  {} {}", marker, language.label()));
        }
        lines.push("Location Settings".to_string());
        lines.push(format!(
            "  Location: {}",
            user.user_metadata
                .location
                .as_deref()
                .unwrap_or(self.records.default_location())
        ));
        lines.push("Notifications".to_string());
        lines.push("  Weather Alerts: ON".to_string());
        lines.push("  Crop Tips: ON".to_string());
    }
}

fn badges(crop: &CropRecord) -> String {
    let mut out = String::new();
    for value in [&crop.soil_type, &crop.season].into_iter().flatten() {
        out.push_str(&format!(" [{}]", value));
    }
    out
}

fn weather_lines(today: &WeatherSummary) -> Vec<String> {
    vec![
        format!(
            "  {} {}°C {}",
            today.icon.glyph(),
            number(today.temperature),
            today.condition.as_deref().unwrap_or("")
        )
        .trim_end()
        .to_string(),
        format!(
            "  Wind: {} km/h  Humidity: {}%",
            number(today.wind_speed),
            number(today.humidity)
        ),
    ]
}

fn number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("{:.0}", v),
        Some(v) => format!("{:.1}", v),
        None => "--".to_string(),
    }
}
