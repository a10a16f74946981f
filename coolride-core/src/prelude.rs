// Re-export key components
pub use crate::config::{CoolRideConfig, CoolingWeights, OverlayConfig, WeatherConfig};
pub use crate::loading::{load_area_network, load_layers, load_network};
pub use crate::model::{RoadEdge, RoadNetwork, RoadNode};
pub use crate::overlay::{LayerStatus, OverlayBuilder, OverlayReport, OverlaySet, RawLayers};
pub use crate::planner::{RidePlan, RideRequest, RideResponse, RoutePlanner, plan_ride};
pub use crate::routing::{CoolingPolicy, DualRoute, annotate, solve_dual};
pub use crate::shadow::{SunPosition, sun_position};
pub use crate::weather::{
    FileSampleStore, HeatReport, HttpWeatherFeed, MemorySampleStore, SampleStore, WeatherFeed,
    WeatherService,
};

// Core types
pub use crate::Error;
pub use crate::NodeId;
