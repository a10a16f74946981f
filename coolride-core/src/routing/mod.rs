//! Edge costing and route search.

pub mod cost;
mod dijkstra;
pub mod dual;
mod to_geojson;

pub use cost::{AnnotationSummary, Condition, CoolRule, CoolingPolicy, WeightRule, annotate};
pub use dijkstra::TracedPath;
pub use dual::{DualRoute, RoutePath, format_minutes, jaccard, solve_dual};
