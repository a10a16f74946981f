//! End-to-end ride planning: network, overlays, costs, routes and heat.

use chrono::{NaiveDateTime, Timelike};
use geo::Point;
use log::info;
use serde::Serialize;

use crate::Error;
use crate::config::CoolRideConfig;
use crate::loading::{PointOfInterest, load_amenities, load_area_network, load_layers};
use crate::model::RoadNetwork;
use crate::overlay::{OverlayBuilder, OverlayReport, RawLayers};
use crate::routing::{
    AnnotationSummary, CoolingPolicy, DualRoute, RoutePath, annotate, format_minutes, solve_dual,
};
use crate::shadow::{SunPosition, sun_position};
use crate::weather::{HeatReport, WeatherService};

#[derive(Debug, Clone, PartialEq)]
pub struct RideRequest {
    /// `(lon, lat)`
    pub origin: Point<f64>,
    /// `(lon, lat)`
    pub destination: Point<f64>,
    /// Local departure time, also used for the sun position
    pub departure: NaiveDateTime,
}

/// Length and riding time of one route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStats {
    pub length_m: f64,
    pub duration_secs: f64,
    /// `m:ss`
    pub duration: String,
}

impl RouteStats {
    fn new(route: &RoutePath, speed_kmh: f64) -> Self {
        let duration_secs = route.duration_secs(speed_kmh);
        Self {
            length_m: route.length_m,
            duration_secs,
            duration: format_minutes(duration_secs),
        }
    }
}

/// Routing half of a ride response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RidePlan {
    pub area: String,
    pub sun: SunPosition,
    pub overlays: OverlayReport,
    pub annotation: AnnotationSummary,
    pub routes: DualRoute,
    pub fast: RouteStats,
    pub cool: RouteStats,
    pub shade_gain: u32,
    pub interchangeable: bool,
    pub points_of_interest: Vec<PointOfInterest>,
}

/// Complete answer to a ride request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RideResponse {
    pub plan: RidePlan,
    pub heat: HeatReport,
    pub insight: String,
}

pub struct RoutePlanner<'a> {
    config: &'a CoolRideConfig,
    policy: CoolingPolicy,
}

impl<'a> RoutePlanner<'a> {
    pub fn new(config: &'a CoolRideConfig) -> Result<Self, Error> {
        Ok(Self {
            config,
            policy: CoolingPolicy::from_weights(&config.cooling)?,
        })
    }

    /// Loads the covering area network and all layers from the data
    /// directory, then plans on them.
    pub fn plan(&self, request: &RideRequest) -> Result<RidePlan, Error> {
        let (area, network) =
            load_area_network(self.config, request.origin.y(), request.origin.x())?;
        let bounds = network.bounds();
        let layers = load_layers(self.config);
        let mut plan = self.plan_on(area, network, layers, request)?;

        if let Some(bounds) = bounds {
            plan.points_of_interest =
                load_amenities(self.config, &self.config.layers.amenities, &bounds);
        }
        Ok(plan)
    }

    /// Plans on an already loaded network. The network is consumed: its
    /// edges are annotated for this request only.
    pub fn plan_on(
        &self,
        area: String,
        mut network: RoadNetwork,
        layers: RawLayers,
        request: &RideRequest,
    ) -> Result<RidePlan, Error> {
        let bounds = network
            .bounds()
            .ok_or_else(|| Error::GraphLoadFailure("network has no nodes".to_string()))?;
        let sun = sun_position(request.origin.y(), request.origin.x(), &request.departure);
        info!(
            "Sun at {:.1} deg elevation, {:.1} deg azimuth",
            sun.elevation, sun.azimuth
        );

        let overlays = OverlayBuilder::new(&self.config.overlay, bounds).build(layers, &sun);
        let annotation = annotate(
            &mut network,
            &overlays,
            &self.policy,
            request.departure.hour(),
        )?;
        let routes = solve_dual(&network, &request.origin, &request.destination)?;

        let speed = self.config.cycling_speed_kmh;
        Ok(RidePlan {
            area,
            sun,
            overlays: overlays.report,
            annotation,
            fast: RouteStats::new(&routes.fast, speed),
            cool: RouteStats::new(&routes.cool, speed),
            shade_gain: routes.shade_gain(),
            interchangeable: routes.is_interchangeable(),
            routes,
            points_of_interest: Vec::new(),
        })
    }
}

/// Plans the routes and attaches the heat report for the origin.
pub fn plan_ride(
    planner: &RoutePlanner<'_>,
    weather: &WeatherService,
    request: &RideRequest,
    now: NaiveDateTime,
) -> Result<RideResponse, Error> {
    let plan = planner.plan(request)?;
    let heat = weather.heat_report(request.origin.y(), request.origin.x(), now);
    let insight = insight(&plan, &heat);
    Ok(RideResponse {
        plan,
        heat,
        insight,
    })
}

/// Short human-readable summary of a plan and its heat advice.
pub fn insight(plan: &RidePlan, heat: &HeatReport) -> String {
    let route = if plan.interchangeable {
        "The fastest path is also the coolest.".to_string()
    } else {
        format!(
            "The cool route has {}% more shade; the fast route saves time but is more exposed.",
            plan.shade_gain
        )
    };
    format!("{route}\n\n{}: {}", heat.safety.status, heat.safety.advice)
}
