//! Historical sample collection around the current time of day.

use std::time::{Duration, Instant};

use chrono::{Days, NaiveDate, NaiveDateTime, Timelike};
use log::{debug, info, warn};
use serde::Serialize;

use super::feed::{FeedQuery, WeatherFeed};
use super::store::{SampleSeries, SampleStore, cache_key};
use crate::config::WeatherConfig;

/// Why paging of one day ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stop", content = "reason", rename_all = "snake_case")]
pub enum FetchStop {
    /// No continuation token left
    Exhausted,
    PageLimit,
    Deadline,
    PageError(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayFetch {
    pub date: NaiveDate,
    pub pages: usize,
    pub samples: usize,
    pub stop: FetchStop,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum SampleOrigin {
    Cache,
    Feed { days: Vec<DayFetch>, persisted: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleFetch {
    pub series: SampleSeries,
    pub origin: SampleOrigin,
}

pub fn minute_of_day(time: &NaiveDateTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Gathers samples of one station from the feed, backed by a sample store.
pub struct SampleCollector<'a> {
    feed: &'a dyn WeatherFeed,
    store: &'a dyn SampleStore,
    config: &'a WeatherConfig,
}

impl<'a> SampleCollector<'a> {
    pub fn new(
        feed: &'a dyn WeatherFeed,
        store: &'a dyn SampleStore,
        config: &'a WeatherConfig,
    ) -> Self {
        Self {
            feed,
            store,
            config,
        }
    }

    /// Samples of `station` within the time-of-day window around `now`,
    /// for today and the configured look-back days.
    ///
    /// A cached entry for today is reused when rich enough; a fresh series
    /// is persisted under the same condition. Store failures only log.
    pub fn fetch_samples(&self, station: &str, now: NaiveDateTime) -> SampleFetch {
        let today = now.date();
        let key = cache_key(station, today);

        match self.store.load(&key) {
            Ok(Some(series)) if series.len() > self.config.min_cached_samples => {
                info!("Sample cache hit for '{key}': {} samples", series.len());
                return SampleFetch {
                    series,
                    origin: SampleOrigin::Cache,
                };
            }
            Ok(_) => debug!("Sample cache miss for '{key}'"),
            Err(e) => warn!("Sample cache unreadable: {e}"),
        }

        info!(
            "Collecting {station} samples over the last {} days",
            self.config.lookback_days
        );
        let deadline = Instant::now() + Duration::from_secs(self.config.fetch_budget_secs);
        let now_minute = minute_of_day(&now);
        let mut series = SampleSeries::default();
        let mut days = Vec::new();

        for back in 0..=u64::from(self.config.lookback_days) {
            let Some(date) = today.checked_sub_days(Days::new(back)) else {
                break;
            };
            days.push(self.fetch_day(station, date, now_minute, deadline, &mut series));
        }

        let mut persisted = false;
        if series.len() > self.config.min_cached_samples {
            match self.store.store(&key, &series) {
                Ok(()) => {
                    persisted = true;
                    info!("Saved {} samples under '{key}'", series.len());
                }
                Err(e) => warn!("Could not persist samples: {e}"),
            }
        }

        SampleFetch {
            series,
            origin: SampleOrigin::Feed { days, persisted },
        }
    }

    fn fetch_day(
        &self,
        station: &str,
        date: NaiveDate,
        now_minute: u32,
        deadline: Instant,
        series: &mut SampleSeries,
    ) -> DayFetch {
        let window = i64::from(self.config.window_minutes);
        let mut query = FeedQuery::for_date(date);
        let mut pages = 0;
        let mut samples = 0;

        let stop = loop {
            if pages >= self.config.max_pages_per_day {
                break FetchStop::PageLimit;
            }
            if Instant::now() >= deadline {
                break FetchStop::Deadline;
            }

            let page = match self.feed.fetch_page(&query) {
                Ok(page) => page,
                Err(e) => break FetchStop::PageError(e.to_string()),
            };
            pages += 1;

            for record in page.records.iter().filter(|r| r.station == station) {
                let Some(value) = record.value else {
                    continue;
                };
                let minute = minute_of_day(&record.timestamp);
                if (i64::from(minute) - i64::from(now_minute)).abs() < window {
                    series.push(minute, value);
                    samples += 1;
                }
            }

            match page.continuation_token {
                Some(token) => query = query.continued(token),
                None => break FetchStop::Exhausted,
            }
        };

        if let FetchStop::PageError(reason) = &stop {
            warn!("Paging for {date} stopped after {pages} pages: {reason}");
        } else {
            debug!("{date}: {pages} pages, {samples} samples, {stop:?}");
        }
        DayFetch {
            date,
            pages,
            samples,
            stop,
        }
    }
}
