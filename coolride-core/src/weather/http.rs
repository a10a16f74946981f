//! data.gov.sg v2 real-time weather API

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime};
use log::{debug, trace};
use reqwest::blocking::Client;
use serde::Deserialize;

use super::feed::{FeedPage, FeedQuery, FeedRecord, WeatherFeed};
use crate::Error;
use crate::config::WeatherConfig;

#[derive(Debug, Deserialize)]
struct RawResponse {
    data: Option<RawData>,
}

#[derive(Debug, Deserialize)]
struct RawData {
    #[serde(default)]
    records: Vec<RawRecord>,
    #[serde(rename = "paginationToken")]
    pagination_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    datetime: String,
    item: RawItem,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    readings: Vec<RawReading>,
}

#[derive(Debug, Deserialize)]
struct RawReading {
    station: Option<RawStation>,
    location: Option<RawLocation>,
    wbgt: Option<RawValue>,
    value: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct RawStation {
    name: Option<String>,
    location: Option<RawLocation>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    latitude: Option<RawValue>,
    // Some payloads misspell the key
    #[serde(alias = "longtitude")]
    longitude: Option<RawValue>,
}

/// Numbers arrive either as JSON numbers or as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Number(value) => Some(*value),
            RawValue::Text(text) => text.trim().parse().ok(),
        }
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.naive_local())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").ok())
}

fn flatten(data: RawData) -> FeedPage {
    let mut records = Vec::new();
    for record in data.records {
        let Some(timestamp) = parse_timestamp(&record.datetime) else {
            debug!("Skipping record with timestamp '{}'", record.datetime);
            continue;
        };
        for reading in record.item.readings {
            let Some(station) = reading.station.as_ref().and_then(|s| s.name.clone()) else {
                continue;
            };
            let location = reading
                .location
                .as_ref()
                .or_else(|| reading.station.as_ref().and_then(|s| s.location.as_ref()));
            let coordinate = |pick: fn(&RawLocation) -> Option<&RawValue>| {
                location
                    .and_then(pick)
                    .and_then(RawValue::as_f64)
                    .unwrap_or(0.0)
            };
            let value = reading
                .wbgt
                .as_ref()
                .and_then(RawValue::as_f64)
                .filter(|v| *v != 0.0)
                .or_else(|| reading.value.as_ref().and_then(RawValue::as_f64));

            records.push(FeedRecord {
                station,
                lat: coordinate(|l| l.latitude.as_ref()),
                lon: coordinate(|l| l.longitude.as_ref()),
                value,
                timestamp,
            });
        }
    }
    FeedPage {
        records,
        continuation_token: data.pagination_token.filter(|token| !token.is_empty()),
    }
}

/// Blocking HTTP client for the WBGT endpoint.
pub struct HttpWeatherFeed {
    client: Client,
    endpoint: String,
    api: String,
    page_timeout: Duration,
    station_timeout: Duration,
}

impl HttpWeatherFeed {
    pub fn new(config: &WeatherConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::WeatherFeedUnavailable(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api: config.api.clone(),
            page_timeout: Duration::from_secs(config.page_timeout_secs),
            station_timeout: Duration::from_secs(config.station_timeout_secs),
        })
    }

    /// Latest-reading lookups get the station timeout, dated history pages
    /// the page timeout.
    fn timeout_for(&self, query: &FeedQuery) -> Duration {
        if query.date.is_some() {
            self.page_timeout
        } else {
            self.station_timeout
        }
    }
}

impl WeatherFeed for HttpWeatherFeed {
    fn fetch_page(&self, query: &FeedQuery) -> Result<FeedPage, Error> {
        let mut params = vec![("api", self.api.clone())];
        if let Some(date) = query.date {
            params.push(("date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(token) = &query.continuation_token {
            params.push(("paginationToken", token.clone()));
        }
        trace!("GET {} {:?}", self.endpoint, params);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .timeout(self.timeout_for(query))
            .send()
            .map_err(|e| Error::WeatherFeedUnavailable(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::WeatherFeedUnavailable(format!(
                "{} answered {status}",
                self.endpoint
            )));
        }
        let body: RawResponse = response
            .json()
            .map_err(|e| Error::WeatherFeedUnavailable(e.to_string()))?;
        let data = body.data.ok_or_else(|| {
            Error::WeatherFeedUnavailable("response carries no data".to_string())
        })?;
        Ok(flatten(data))
    }
}
