//! Live WBGT readings, the sample cache and the short-term forecast.

mod feed;
mod http;
mod safety;
mod samples;
mod station;
mod store;
mod trend;

use chrono::NaiveDateTime;
use log::info;
use serde::Serialize;

pub use feed::{FeedPage, FeedQuery, FeedRecord, WeatherFeed};
pub use http::HttpWeatherFeed;
pub use safety::{SafetyAdvice, SafetyLevel, safety};
pub use samples::{DayFetch, FetchStop, SampleCollector, SampleFetch, SampleOrigin, minute_of_day};
pub use station::{StationReading, StationSource, nearest_station};
pub use store::{FileSampleStore, MemorySampleStore, SampleSeries, SampleStore, cache_key};
pub use trend::{Confidence, LinearFit, Trend, TrendForecast, forecast};

use crate::config::WeatherConfig;

/// Current conditions, forecast and advice for one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatReport {
    pub station: StationReading,
    pub current_temp: f64,
    pub forecast: TrendForecast,
    /// Larger of the current reading and the forecast
    pub effective_temp: f64,
    pub safety: SafetyAdvice,
    /// Samples behind the forecast
    pub samples: usize,
}

/// Feed and cache bundled with their configuration.
pub struct WeatherService {
    feed: Box<dyn WeatherFeed>,
    store: Box<dyn SampleStore>,
    config: WeatherConfig,
}

impl WeatherService {
    pub fn new(
        feed: Box<dyn WeatherFeed>,
        store: Box<dyn SampleStore>,
        config: WeatherConfig,
    ) -> Self {
        Self {
            feed,
            store,
            config,
        }
    }

    pub fn config(&self) -> &WeatherConfig {
        &self.config
    }

    pub fn nearest_station(&self, lat: f64, lon: f64) -> StationReading {
        nearest_station(self.feed.as_ref(), lat, lon, self.config.fallback_value)
    }

    pub fn fetch_samples(&self, station: &str, now: NaiveDateTime) -> SampleFetch {
        SampleCollector::new(self.feed.as_ref(), self.store.as_ref(), &self.config)
            .fetch_samples(station, now)
    }

    /// Forecast for `station`, plus the number of samples it rests on.
    pub fn predict_trend(
        &self,
        station: &str,
        current: f64,
        now: NaiveDateTime,
    ) -> (TrendForecast, usize) {
        let fetch = self.fetch_samples(station, now);
        let prediction = forecast(&fetch.series, current, minute_of_day(&now), &self.config);
        (prediction, fetch.series.len())
    }

    pub fn heat_report(&self, lat: f64, lon: f64, now: NaiveDateTime) -> HeatReport {
        let station = self.nearest_station(lat, lon);
        let current = station.value;
        // A fallback reading has no history to learn from
        let (prediction, samples) = if station.is_fallback() {
            (TrendForecast::low_data(current), 0)
        } else {
            self.predict_trend(station.station_name(), current, now)
        };

        let effective_temp = current.max(prediction.predicted_value);
        let advice = safety(effective_temp);
        info!(
            "WBGT at {}: {current:.1}, forecast {:.1} ({}), {}",
            station.station_name(),
            prediction.predicted_value,
            prediction.trend,
            advice.status
        );

        HeatReport {
            station,
            current_temp: current,
            forecast: prediction,
            effective_temp,
            safety: advice,
            samples,
        }
    }
}
