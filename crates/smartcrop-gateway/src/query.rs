//! Query-string builders for the backend's REST collections.
//!
//! Filters use the `column=eq.value` form and ordering the
//! `order=column.asc|desc` form.

use smartcrop_core::types::CropFilter;

pub const CROPS_TABLE: &str = "crops";
pub const WEATHER_TABLE: &str = "weather";
pub const CHAT_HISTORY_TABLE: &str = "chat_history";

pub type QueryParams = Vec<(String, String)>;

fn param(key: &str, value: impl Into<String>) -> (String, String) {
    (key.to_string(), value.into())
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

/// Crops filtered by soil type and season, ordered by name.
pub fn crops_query(filter: &CropFilter) -> QueryParams {
    let mut params = vec![param("select", "*")];
    if let Some(soil) = filter.soil_type.as_deref().filter(|s| !s.is_empty()) {
        params.push(param("soil_type", eq(soil)));
    }
    if let Some(season) = filter.season.as_deref().filter(|s| !s.is_empty()) {
        params.push(param("season", eq(season)));
    }
    params.push(param("order", "crop_name.asc"));
    params
}

/// Forecast rows, earliest first.
pub fn weather_query(limit: usize) -> QueryParams {
    vec![
        param("select", "*"),
        param("order", "forecast_date.asc"),
        param("limit", limit.to_string()),
    ]
}

/// A user's chat history, newest first.
pub fn chat_history_query(user_id: &str, limit: usize) -> QueryParams {
    vec![
        param("select", "*"),
        param("user_id", eq(user_id)),
        param("order", "created_at.desc"),
        param("limit", limit.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get<'a>(params: &'a QueryParams, key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_crops_query_without_filters() {
        let q = crops_query(&CropFilter::default());
        assert_eq!(get(&q, "select"), Some("*"));
        assert_eq!(get(&q, "order"), Some("crop_name.asc"));
        assert!(get(&q, "soil_type").is_none());
        assert!(get(&q, "season").is_none());
    }

    #[test]
    fn test_crops_query_with_filters() {
        let q = crops_query(&CropFilter {
            soil_type: Some("loamy".into()),
            season: Some("winter".into()),
        });
        assert_eq!(get(&q, "soil_type"), Some("eq.loamy"));
        assert_eq!(get(&q, "season"), Some("eq.winter"));
    }

    #[test]
    fn test_crops_query_ignores_empty_filter_values() {
        let q = crops_query(&CropFilter {
            soil_type: Some(String::new()),
            season: None,
        });
        assert!(get(&q, "soil_type").is_none());
    }

    #[test]
    fn test_weather_query() {
        let q = weather_query(7);
        assert_eq!(get(&q, "order"), Some("forecast_date.asc"));
        assert_eq!(get(&q, "limit"), Some("7"));
    }

    #[test]
    fn test_chat_history_query() {
        let q = chat_history_query("user-9", 20);
        assert_eq!(get(&q, "user_id"), Some("eq.user-9"));
        assert_eq!(get(&q, "order"), Some("created_at.desc"));
        assert_eq!(get(&q, "limit"), Some("20"));
    }
}
