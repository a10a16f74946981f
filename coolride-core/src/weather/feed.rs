//! Live weather feed abstraction

use chrono::{NaiveDate, NaiveDateTime};

use crate::Error;

/// One station reading.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRecord {
    pub station: String,
    pub lat: f64,
    pub lon: f64,
    /// `None` when the station reported no usable value
    pub value: Option<f64>,
    /// Local time of the observation
    pub timestamp: NaiveDateTime,
}

/// Page request. Without a date the feed returns its latest readings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedQuery {
    pub date: Option<NaiveDate>,
    pub continuation_token: Option<String>,
}

impl FeedQuery {
    pub fn latest() -> Self {
        Self::default()
    }

    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            continuation_token: None,
        }
    }

    pub fn continued(&self, token: String) -> Self {
        Self {
            date: self.date,
            continuation_token: Some(token),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedPage {
    /// Records in feed order, newest observation group first
    pub records: Vec<FeedRecord>,
    pub continuation_token: Option<String>,
}

impl FeedPage {
    /// Records of the first observation group on the page.
    pub fn latest_records(&self) -> impl Iterator<Item = &FeedRecord> {
        let first = self.records.first().map(|record| record.timestamp);
        self.records
            .iter()
            .filter(move |record| Some(record.timestamp) == first)
    }
}

/// Source of WBGT readings.
pub trait WeatherFeed: Send + Sync {
    fn fetch_page(&self, query: &FeedQuery) -> Result<FeedPage, Error>;
}
