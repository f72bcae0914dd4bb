use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::SmartCropError;

// =============================================================================
// Enums
// =============================================================================

/// Language a farmer asks in and hears answers in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Punjabi,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Hindi, Language::Punjabi];

    /// Wire tag used by the backend (`english`, `hindi`, `punjabi`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Hindi => "hindi",
            Language::Punjabi => "punjabi",
        }
    }

    /// BCP 47 locale handed to the speech synthesizer.
    pub fn speech_locale(&self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Hindi => "hi-IN",
            Language::Punjabi => "pa-IN",
        }
    }

    /// Label shown in the language picker.
    pub fn label(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "हिंदी (Hindi)",
            Language::Punjabi => "ਪੰਜਾਬੀ (Punjabi)",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = SmartCropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "hindi" | "hi" => Ok(Language::Hindi),
            "punjabi" | "pa" => Ok(Language::Punjabi),
            other => Err(SmartCropError::Validation(format!(
                "unsupported language: {other}"
            ))),
        }
    }
}

/// Icon picked for a weather condition string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeatherIcon {
    Sun,
    Cloud,
    Rain,
}

impl WeatherIcon {
    /// Classify a free-form condition. Rain wins over cloud; anything else,
    /// including no condition at all, is sunny.
    pub fn classify(condition: Option<&str>) -> Self {
        let Some(condition) = condition else {
            return WeatherIcon::Sun;
        };
        let cond = condition.to_lowercase();
        if cond.contains("rain") {
            WeatherIcon::Rain
        } else if cond.contains("cloud") {
            WeatherIcon::Cloud
        } else {
            WeatherIcon::Sun
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            WeatherIcon::Sun => "☀",
            WeatherIcon::Cloud => "☁",
            WeatherIcon::Rain => "🌧",
        }
    }
}

// =============================================================================
// Backend-owned records
// =============================================================================

/// One question/answer exchange with the farming assistant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub question_language: Language,
    pub answer_language: Language,
    pub created_at: DateTime<Utc>,
}

/// Crop advisory record, read-only.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CropRecord {
    pub id: String,
    pub crop_name: String,
    #[serde(default)]
    pub crop_name_hindi: Option<String>,
    #[serde(default)]
    pub crop_name_punjabi: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub soil_type: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub fertilizer_tip: Option<String>,
    #[serde(default)]
    pub fertilizer_tip_hindi: Option<String>,
    #[serde(default)]
    pub fertilizer_tip_punjabi: Option<String>,
    #[serde(default)]
    pub planting_months: Option<Vec<String>>,
    #[serde(default)]
    pub harvest_months: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl CropRecord {
    /// Crop name in `language`, falling back to English.
    pub fn name_in(&self, language: Language) -> &str {
        let localized = match language {
            Language::English => None,
            Language::Hindi => self.crop_name_hindi.as_deref(),
            Language::Punjabi => self.crop_name_punjabi.as_deref(),
        };
        localized
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.crop_name)
    }

    /// Fertilizer tip in `language`, falling back to English, or empty.
    pub fn tip_in(&self, language: Language) -> &str {
        let localized = match language {
            Language::English => None,
            Language::Hindi => self.fertilizer_tip_hindi.as_deref(),
            Language::Punjabi => self.fertilizer_tip_punjabi.as_deref(),
        };
        localized
            .filter(|s| !s.is_empty())
            .or(self.fertilizer_tip.as_deref())
            .unwrap_or("")
    }
}

/// Daily forecast row, read-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub id: String,
    pub location: String,
    pub forecast_date: NaiveDate,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub rain_chance: Option<f64>,
    #[serde(default)]
    pub weather_condition: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl WeatherRecord {
    pub fn icon(&self) -> WeatherIcon {
        WeatherIcon::classify(self.weather_condition.as_deref())
    }
}

/// Filters accepted by the crop collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CropFilter {
    pub soil_type: Option<String>,
    pub season: Option<String>,
}

impl CropFilter {
    pub fn is_empty(&self) -> bool {
        self.soil_type.is_none() && self.season.is_none()
    }
}

// =============================================================================
// Authentication
// =============================================================================

/// Profile fields attached to a user at sign-up.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Authenticated user as reported by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

impl AuthUser {
    pub fn display_email(&self) -> &str {
        self.email.as_deref().unwrap_or("unknown")
    }
}

/// A live backend session. Tokens never appear in `Debug` output.
#[derive(Clone, Debug, Deserialize)]
pub struct AuthSession {
    pub access_token: SecretString,
    #[serde(default)]
    pub refresh_token: Option<SecretString>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

// =============================================================================
// Tests
// =============================================================================
