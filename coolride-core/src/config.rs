//! Runtime configuration.
//!
//! Every tunable of the routing and forecasting pipeline lives here and is
//! passed explicitly to the component that needs it. All sections
//! deserialize with `#[serde(default)]`, so a partial TOML/JSON document only
//! overrides the values it names.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoolRideConfig {
    /// Directory holding network files and vector layers.
    pub data_dir: PathBuf,
    /// Whole-file JSON sample cache.
    pub cache_path: PathBuf,
    /// Riding speed used for duration estimates.
    pub cycling_speed_kmh: f64,
    pub layers: LayerFiles,
    pub cooling: CoolingWeights,
    pub overlay: OverlayConfig,
    pub weather: WeatherConfig,
    pub areas: Vec<AreaConfig>,
}

impl Default for CoolRideConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            cache_path: PathBuf::from("coolride_weather_memory.json"),
            cycling_speed_kmh: 15.0,
            layers: LayerFiles::default(),
            cooling: CoolingWeights::default(),
            overlay: OverlayConfig::default(),
            weather: WeatherConfig::default(),
            areas: default_areas(),
        }
    }
}

impl CoolRideConfig {
    /// Resolve a file name relative to [`data_dir`](Self::data_dir).
    pub fn data_file(&self, name: impl AsRef<Path>) -> PathBuf {
        self.data_dir.join(name)
    }
}

/// File names of the vector layers, relative to the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerFiles {
    pub park_connectors: PathBuf,
    /// CSV with `lat`/`lng` columns, or a GeoJSON point layer.
    pub trees: PathBuf,
    pub buildings: PathBuf,
    pub water: PathBuf,
    /// Point-of-interest layers, each tagged with a category label.
    pub amenities: Vec<AmenityLayer>,
}

impl Default for LayerFiles {
    fn default() -> Self {
        Self {
            park_connectors: PathBuf::from("ParkConnectorLoop.geojson"),
            trees: PathBuf::from("trees_downloaded.csv"),
            buildings: PathBuf::from("buildings.geojson"),
            water: PathBuf::from("URA_Waterbody.geojson"),
            amenities: vec![
                AmenityLayer::new("hawker_centres.geojson", "Hawker"),
                AmenityLayer::new("mrt_stations.geojson", "MRT"),
                AmenityLayer::new("landmarks.geojson", "Landmark"),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmenityLayer {
    pub path: PathBuf,
    /// Category used when a feature has no `type` property of its own.
    pub category: String,
}

impl AmenityLayer {
    pub fn new(path: impl Into<PathBuf>, category: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            category: category.into(),
        }
    }
}

/// Discount factors of the first-match cooling rule table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoolingWeights {
    /// Tree shade, building shadow and water all at once.
    pub ultimate: f64,
    pub tree_and_shadow: f64,
    pub water: f64,
    pub tree: f64,
    pub building_shadow: f64,
    pub park_connector: f64,
    /// Extra factor on building shadow while the sun is low.
    pub low_sun_factor: f64,
    /// Local hours strictly before this count as low sun.
    pub low_sun_before_hour: u32,
    /// Local hours strictly after this count as low sun.
    pub low_sun_after_hour: u32,
}

impl Default for CoolingWeights {
    fn default() -> Self {
        Self {
            ultimate: 0.35,
            tree_and_shadow: 0.45,
            water: 0.55,
            tree: 0.6,
            building_shadow: 0.7,
            park_connector: 0.5,
            low_sun_factor: 0.6,
            low_sun_before_hour: 10,
            low_sun_after_hour: 16,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub tree_buffer_m: f64,
    pub water_buffer_m: f64,
    /// Height assumed for every building without a usable `height` value.
    pub building_height_m: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            tree_buffer_m: 10.0,
            water_buffer_m: 100.0,
            building_height_m: 15.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub endpoint: String,
    /// Value of the `api` query parameter.
    pub api: String,
    pub lookback_days: u32,
    /// Samples are kept when strictly closer than this to now's time of day.
    pub window_minutes: u32,
    /// A cache entry is reused, and a fresh one persisted, above this size.
    pub min_cached_samples: usize,
    /// Below this many samples no regression is attempted.
    pub min_regression_samples: usize,
    pub horizon_minutes: u32,
    /// Largest plausible change over the forecast horizon.
    pub max_step: f64,
    /// Half-width of the "Stable" band around the current value.
    pub dead_band: f64,
    /// Reading used when no sensor can be reached.
    pub fallback_value: f64,
    /// Per-request timeout for dated history pages.
    pub page_timeout_secs: u64,
    /// Per-request timeout for the latest-readings lookup.
    pub station_timeout_secs: u64,
    pub max_pages_per_day: usize,
    /// Wall-clock budget for one multi-day sample fetch.
    pub fetch_budget_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-open.data.gov.sg/v2/real-time/api/weather".to_string(),
            api: "wbgt".to_string(),
            lookback_days: 3,
            window_minutes: 240,
            min_cached_samples: 20,
            min_regression_samples: 10,
            horizon_minutes: 15,
            max_step: 0.5,
            dead_band: 0.1,
            fallback_value: 30.0,
            page_timeout_secs: 5,
            station_timeout_secs: 10,
            max_pages_per_day: 50,
            fetch_budget_secs: 60,
        }
    }
}

/// A pre-cached network covering a disc around `(lat, lon)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaConfig {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub radius_m: f64,
    /// Network file; defaults to `{name}_network.json` in the data directory.
    #[serde(default)]
    pub network: Option<PathBuf>,
}

impl AreaConfig {
    pub fn new(name: &str, lat: f64, lon: f64, radius_m: f64) -> Self {
        Self {
            name: name.to_string(),
            lat,
            lon,
            radius_m,
            network: None,
        }
    }

    pub fn network_file(&self) -> PathBuf {
        self.network
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}_network.json", self.name)))
    }
}

fn default_areas() -> Vec<AreaConfig> {
    vec![
        AreaConfig::new("tampines", 1.3530, 103.9450, 2000.0),
        AreaConfig::new("orchard", 1.3048, 103.8318, 2000.0),
        AreaConfig::new("marina_bay", 1.2806, 103.8510, 2000.0),
        AreaConfig::new("city_hall", 1.2930, 103.8520, 2000.0),
        AreaConfig::new("chinatown", 1.2838, 103.8446, 2000.0),
        AreaConfig::new("botanic_gardens", 1.3138, 103.8159, 2000.0),
        AreaConfig::new("east_coast_park", 1.3010, 103.9140, 2500.0),
        AreaConfig::new("sentosa", 1.2494, 103.8303, 2000.0),
        AreaConfig::new("bedok", 1.3236, 103.9273, 2000.0),
        AreaConfig::new("pasir_ris", 1.3721, 103.9474, 2000.0),
        AreaConfig::new("changi", 1.3644, 103.9915, 2000.0),
        AreaConfig::new("bishan", 1.3521, 103.8484, 2000.0),
        AreaConfig::new("ang_mo_kio", 1.3691, 103.8454, 2000.0),
        AreaConfig::new("clementi", 1.3162, 103.7649, 2000.0),
        AreaConfig::new("jurong_east", 1.3329, 103.7436, 2000.0),
    ]
}
