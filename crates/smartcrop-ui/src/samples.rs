//! Built-in records shown when the backend has none.

use smartcrop_core::types::{CropRecord, WeatherIcon, WeatherRecord};

/// How many crops the home tab features.
pub const FEATURED_CROP_COUNT: usize = 3;

fn sample_crop(id: &str, name: &str, hindi: &str, soil: &str, season: &str, tip: &str) -> CropRecord {
    CropRecord {
        id: id.to_string(),
        crop_name: name.to_string(),
        crop_name_hindi: Some(hindi.to_string()),
        soil_type: Some(soil.to_string()),
        season: Some(season.to_string()),
        fertilizer_tip: Some(tip.to_string()),
        ..CropRecord::default()
    }
}

/// The five sample crops, in display order.
pub fn sample_crops() -> Vec<CropRecord> {
    vec![
        sample_crop("1", "Wheat", "गेहूं", "loamy", "winter", "Apply nitrogen fertilizer during tillering stage"),
        sample_crop("2", "Rice", "चावल", "clay", "monsoon", "Use urea fertilizer in split doses"),
        sample_crop("3", "Cotton", "कपास", "black", "summer", "Apply balanced NPK fertilizer"),
        sample_crop("4", "Sugarcane", "गन्ना", "loamy", "year-round", "Heavy nitrogen requirement, apply in stages"),
        sample_crop("5", "Maize", "मक्का", "sandy-loam", "summer", "Side dress with nitrogen at knee-high stage"),
    ]
}

/// Today's weather as the home tab shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSummary {
    pub temperature: Option<f64>,
    pub condition: Option<String>,
    pub wind_speed: Option<f64>,
    pub humidity: Option<f64>,
    pub icon: WeatherIcon,
}

impl WeatherSummary {
    /// Shown when no forecast rows exist.
    pub fn sample() -> Self {
        Self {
            temperature: Some(25.0),
            condition: Some("Sunny".to_string()),
            wind_speed: Some(12.0),
            humidity: Some(65.0),
            icon: WeatherIcon::Sun,
        }
    }

    pub fn from_record(record: &WeatherRecord) -> Self {
        Self {
            temperature: record.temperature,
            condition: record.weather_condition.clone(),
            wind_speed: record.wind_speed,
            humidity: record.humidity,
            icon: record.icon(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartcrop_core::types::Language;

    #[test]
    fn test_sample_crops_exact_set() {
        let crops = sample_crops();
        let names: Vec<_> = crops.iter().map(|c| c.crop_name.as_str()).collect();
        assert_eq!(names, vec!["Wheat", "Rice", "Cotton", "Sugarcane", "Maize"]);
        assert_eq!(crops[3].season.as_deref(), Some("year-round"));
        assert_eq!(crops[4].soil_type.as_deref(), Some("sandy-loam"));
        assert_eq!(crops[1].name_in(Language::Hindi), "चावल");
        assert_eq!(
            crops[0].tip_in(Language::Punjabi),
            "Apply nitrogen fertilizer during tillering stage"
        );
    }

    #[test]
    fn test_sample_weather() {
        let w = WeatherSummary::sample();
        assert_eq!(w.temperature, Some(25.0));
        assert_eq!(w.condition.as_deref(), Some("Sunny"));
        assert_eq!(w.wind_speed, Some(12.0));
        assert_eq!(w.humidity, Some(65.0));
        assert_eq!(w.icon, WeatherIcon::Sun);
    }
}
