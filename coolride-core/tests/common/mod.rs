#![allow(dead_code)]

use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};
use coolride_core::Error;
use coolride_core::model::RoadNetwork;
use coolride_core::weather::{FeedPage, FeedQuery, FeedRecord, WeatherFeed};
use geo::{LineString, Point, coord};

pub const LAT: f64 = 1.35;
pub const LON: f64 = 103.94;
/// Roughly 100 m of longitude at 1.35 N
pub const STEP: f64 = 0.0009;

pub fn node_point(i: u32) -> Point<f64> {
    Point::new(LON + f64::from(i) * STEP, LAT)
}

/// Directed chain A(1) -> B(2) -> C(3) -> D(4), 100 m per edge.
pub fn chain() -> RoadNetwork {
    let mut network = RoadNetwork::new();
    for i in 0..4 {
        let p = node_point(i);
        network.add_node(u64::from(i) + 1, p.x(), p.y());
    }
    for i in 1..4 {
        network.add_edge(i, i + 1, 0, 100.0, None).unwrap();
    }
    network
}

/// The chain plus a direct A -> D edge of 250 m that bows north, away from
/// the middle of the chain.
pub fn chain_with_bypass() -> RoadNetwork {
    let mut network = chain();
    let a = node_point(0);
    let d = node_point(3);
    let bypass = LineString::new(vec![
        coord! { x: a.x(), y: a.y() },
        coord! { x: a.x(), y: a.y() + 0.001 },
        coord! { x: d.x(), y: d.y() + 0.001 },
        coord! { x: d.x(), y: d.y() },
    ]);
    network.add_edge(1, 4, 0, 250.0, Some(bypass)).unwrap();
    network
}

/// Midpoint of edge B -> C
pub fn between_b_and_c() -> Point<f64> {
    Point::new(LON + 1.5 * STEP, LAT)
}

pub fn afternoon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 22)
        .unwrap()
        .and_hms_opt(14, 0, 0)
        .unwrap()
}

pub fn night() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 22)
        .unwrap()
        .and_hms_opt(22, 0, 0)
        .unwrap()
}

/// Feed with one station whose readings are a fixed list of
/// `(minute_of_day, value)` pairs on every date.
pub struct ScriptedFeed {
    pub station: String,
    pub readings: Vec<(u32, f64)>,
    pub today: NaiveDate,
    pub calls: Mutex<usize>,
}

impl ScriptedFeed {
    pub fn new(readings: Vec<(u32, f64)>, today: NaiveDate) -> Self {
        Self {
            station: "Tampines".to_string(),
            readings,
            today,
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl WeatherFeed for ScriptedFeed {
    fn fetch_page(&self, query: &FeedQuery) -> Result<FeedPage, Error> {
        *self.calls.lock().unwrap() += 1;
        let date = query.date.unwrap_or(self.today);
        let records = self
            .readings
            .iter()
            .rev()
            .map(|&(minute, value)| FeedRecord {
                station: self.station.clone(),
                lat: LAT,
                lon: LON,
                value: Some(value),
                timestamp: date.and_hms_opt(minute / 60, minute % 60, 0).unwrap(),
            })
            .collect();
        Ok(FeedPage {
            records,
            continuation_token: None,
        })
    }
}
