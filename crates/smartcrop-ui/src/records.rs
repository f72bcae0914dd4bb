//! Crop and weather records as the views see them.
//!
//! Fetch failures raise a notice and leave the previous records in place.
//! Empty results are shown as the built-in samples, never as an empty list.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use smartcrop_core::config::WeatherConfig;
use smartcrop_core::types::{CropFilter, CropRecord, WeatherRecord};
use smartcrop_gateway::{GatewayError, SessionGateway};

use crate::notice::{self, Notifier};
use crate::samples::{self, WeatherSummary, FEATURED_CROP_COUNT};

pub struct RecordStore {
    gateway: Arc<dyn SessionGateway>,
    notifier: Arc<Notifier>,
    default_location: String,
    forecast_days: usize,
    crops: Mutex<Vec<CropRecord>>,
    weather: Mutex<Vec<WeatherRecord>>,
    crops_loading: AtomicBool,
    weather_loading: AtomicBool,
}

impl RecordStore {
    pub fn new(
        gateway: Arc<dyn SessionGateway>,
        notifier: Arc<Notifier>,
        config: &WeatherConfig,
    ) -> Self {
        Self {
            gateway,
            notifier,
            default_location: config.default_location.clone(),
            forecast_days: config.forecast_days,
            crops: Mutex::new(Vec::new()),
            weather: Mutex::new(Vec::new()),
            crops_loading: AtomicBool::new(false),
            weather_loading: AtomicBool::new(false),
        }
    }

    pub fn default_location(&self) -> &str {
        &self.default_location
    }

    pub fn is_loading(&self) -> bool {
        self.crops_loading.load(Ordering::SeqCst) || self.weather_loading.load(Ordering::SeqCst)
    }

    /// Reload crops matching `filter`. Returns how many rows came back.
    pub async fn fetch_crops(&self, filter: &CropFilter) -> Result<usize, GatewayError> {
        self.crops_loading.store(true, Ordering::SeqCst);
        let result = self.gateway.fetch_crops(filter).await;
        self.crops_loading.store(false, Ordering::SeqCst);

        match result {
            Ok(rows) => {
                let count = rows.len();
                tracing::debug!(count, "Crops loaded");
                *lock(&self.crops) = rows;
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Crop fetch failed");
                self.notifier
                    .destructive(notice::CROPS_FETCH_FAILED, &e.user_message());
                Err(e)
            }
        }
    }

    /// Ask the backend to refresh forecasts for `location` (or the default
    /// location), then reload the stored forecast rows.
    pub async fn refresh_weather(&self, location: Option<&str>) -> Result<usize, GatewayError> {
        let location = location
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(self.default_location.as_str())
            .to_string();

        self.weather_loading.store(true, Ordering::SeqCst);
        let result = self.load_weather(&location).await;
        self.weather_loading.store(false, Ordering::SeqCst);

        match result {
            Ok(rows) => {
                let count = rows.len();
                tracing::debug!(count, location = %location, "Weather loaded");
                *lock(&self.weather) = rows;
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, location = %location, "Weather refresh failed");
                self.notifier
                    .destructive(notice::WEATHER_FETCH_FAILED, &e.user_message());
                Err(e)
            }
        }
    }

    async fn load_weather(&self, location: &str) -> Result<Vec<WeatherRecord>, GatewayError> {
        self.gateway.invoke_weather(location).await?;
        self.gateway.fetch_weather(self.forecast_days).await
    }

    /// Crops exactly as last fetched.
    pub fn crops(&self) -> Vec<CropRecord> {
        lock(&self.crops).clone()
    }

    /// Forecast rows exactly as last fetched.
    pub fn weather(&self) -> Vec<WeatherRecord> {
        lock(&self.weather).clone()
    }

    /// Crops to display: the fetched rows, or the samples when there are none.
    pub fn display_crops(&self) -> Vec<CropRecord> {
        let crops = self.crops();
        if crops.is_empty() {
            samples::sample_crops()
        } else {
            crops
        }
    }

    pub fn featured_crops(&self) -> Vec<CropRecord> {
        self.display_crops()
            .into_iter()
            .take(FEATURED_CROP_COUNT)
            .collect()
    }

    /// The first forecast row, or the sample weather.
    pub fn today(&self) -> WeatherSummary {
        lock(&self.weather)
            .first()
            .map(WeatherSummary::from_record)
            .unwrap_or_else(WeatherSummary::sample)
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}
