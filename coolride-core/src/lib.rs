//! Thermally comfortable bicycle routing.
//!
//! A request loads the cached road network around its origin, builds shade
//! overlays (trees, building shadows, water, park connectors) for the
//! departure time, discounts every edge by the overlays it touches and
//! returns a fastest and a coolest route. A separate weather service reports
//! the WBGT heat-stress level near the origin with a 15 minute forecast.

pub mod config;
pub mod error;
pub mod loading;
pub mod model;
pub mod overlay;
pub mod planner;
pub mod prelude;
pub mod routing;
pub mod shadow;
pub mod weather;

pub use config::CoolRideConfig;
pub use error::Error;
pub use planner::{RidePlan, RideRequest, RideResponse, RoutePlanner, plan_ride};

/// Source node identifier (OSM id in the cached networks)
pub type NodeId = u64;
