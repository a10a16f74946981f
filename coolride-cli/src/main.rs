mod config;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Local, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use coolride_core::prelude::*;
use coolride_core::weather::{FeedPage, FeedQuery};
use geo::Point;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::config::load_config;

#[derive(Parser)]
#[command(name = "coolride")]
#[command(about = "Fast and shaded bicycle routes with a heat-stress forecast")]
struct Cli {
    /// TOML configuration; defaults to ./coolride.toml when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip the live weather feed and use the fallback reading
    #[arg(long, global = true)]
    offline: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Plan a fast and a cool route between two points
    Route {
        /// Origin as LAT,LON
        #[arg(long, value_parser = parse_point)]
        from: Point<f64>,
        /// Destination as LAT,LON
        #[arg(long, value_parser = parse_point)]
        to: Point<f64>,
        /// Departure time today as HH:MM, now when omitted
        #[arg(long, value_parser = parse_time)]
        time: Option<NaiveTime>,
        /// Also write both routes as a GeoJSON FeatureCollection
        #[arg(long)]
        geojson: Option<PathBuf>,
    },
    /// Current WBGT near a point with a 15 minute forecast
    Weather {
        /// Location as LAT,LON
        #[arg(long, value_parser = parse_point)]
        at: Point<f64>,
    },
    /// List the cached network areas
    Areas,
}

/// Parses `LAT,LON` into a `(lon, lat)` point.
fn parse_point(text: &str) -> Result<Point<f64>> {
    let (lat, lon) = text
        .split_once(',')
        .ok_or_else(|| anyhow!("expected LAT,LON, got '{text}'"))?;
    let lat: f64 = lat.trim().parse().context("invalid latitude")?;
    let lon: f64 = lon.trim().parse().context("invalid longitude")?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        bail!("coordinates out of range: {lat},{lon}");
    }
    Ok(Point::new(lon, lat))
}

fn parse_time(text: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M")
        .with_context(|| format!("expected HH:MM, got '{text}'"))
}

fn departure(now: NaiveDateTime, time: Option<NaiveTime>) -> NaiveDateTime {
    time.map_or(now, |time| now.date().and_time(time))
}

/// Feed used with `--offline`: every lookup fails over to the fallback.
struct OfflineFeed;

impl WeatherFeed for OfflineFeed {
    fn fetch_page(&self, _: &FeedQuery) -> Result<FeedPage, Error> {
        Err(Error::WeatherFeedUnavailable("offline mode".to_string()))
    }
}

fn weather_service(config: &CoolRideConfig, offline: bool) -> Result<WeatherService> {
    let feed: Box<dyn WeatherFeed> = if offline {
        Box::new(OfflineFeed)
    } else {
        Box::new(HttpWeatherFeed::new(&config.weather)?)
    };
    Ok(WeatherService::new(
        feed,
        Box::new(FileSampleStore::new(&config.cache_path)),
        config.weather.clone(),
    ))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let now = Local::now().naive_local();

    match cli.command {
        Command::Route {
            from,
            to,
            time,
            geojson,
        } => {
            let request = RideRequest {
                origin: from,
                destination: to,
                departure: departure(now, time),
            };
            tracing::info!(
                from = ?(from.y(), from.x()),
                to = ?(to.y(), to.x()),
                departure = %request.departure,
                "Planning ride"
            );
            let planner = RoutePlanner::new(&config)?;
            let weather = weather_service(&config, cli.offline)?;
            let response =
                plan_ride(&planner, &weather, &request, now).context("route calculation failed")?;

            if let Some(path) = geojson {
                fs::write(&path, response.plan.routes.to_geojson_string()?)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                tracing::info!(path = %path.display(), "Wrote route GeoJSON");
            }
            print_json(&response, cli.pretty)
        }
        Command::Weather { at } => {
            let weather = weather_service(&config, cli.offline)?;
            let report = weather.heat_report(at.y(), at.x(), now);
            print_json(&report, cli.pretty)
        }
        Command::Areas => print_json(&config.areas, cli.pretty),
    }
}
