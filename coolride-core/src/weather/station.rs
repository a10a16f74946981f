use log::{info, warn};
use serde::Serialize;

use super::feed::{FeedQuery, WeatherFeed};
use crate::overlay::METERS_PER_DEGREE;

/// Where a current reading came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StationSource {
    Sensor { name: String, distance_km: f64 },
    /// Feed unreachable or without usable readings
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationReading {
    pub source: StationSource,
    pub value: f64,
}

impl StationReading {
    pub fn station_name(&self) -> &str {
        match &self.source {
            StationSource::Sensor { name, .. } => name,
            StationSource::Fallback => "System Fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, StationSource::Fallback)
    }
}

/// Current reading of the sensor closest to `(lat, lon)`.
///
/// Distance is planar in degrees. Records with a zero coordinate or without
/// a value are skipped. Any feed failure yields `fallback_value`.
pub fn nearest_station(
    feed: &dyn WeatherFeed,
    lat: f64,
    lon: f64,
    fallback_value: f64,
) -> StationReading {
    let fallback = StationReading {
        source: StationSource::Fallback,
        value: fallback_value,
    };

    let page = match feed.fetch_page(&FeedQuery::latest()) {
        Ok(page) => page,
        Err(e) => {
            warn!("WBGT sensor lookup failed: {e}. Using fallback value {fallback_value}");
            return fallback;
        }
    };

    let nearest = page
        .latest_records()
        .filter(|record| record.lat != 0.0 && record.lon != 0.0)
        .filter_map(|record| {
            let value = record.value.filter(|v| v.is_finite())?;
            let distance = (lat - record.lat).hypot(lon - record.lon);
            Some((record, value, distance))
        })
        .min_by(|a, b| a.2.total_cmp(&b.2));

    match nearest {
        Some((record, value, distance)) => {
            let distance_km = distance * METERS_PER_DEGREE / 1000.0;
            info!(
                "Nearest WBGT sensor: {} ({distance_km:.2} km), {value}",
                record.station
            );
            StationReading {
                source: StationSource::Sensor {
                    name: record.station.clone(),
                    distance_km,
                },
                value,
            }
        }
        None => {
            warn!("No usable WBGT readings. Using fallback value {fallback_value}");
            fallback
        }
    }
}
