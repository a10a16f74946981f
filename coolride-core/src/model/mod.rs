//! Data model for thermal bicycle routing
//!
//! Contains the road network the cost annotator mutates and the dual-path
//! solver searches.

pub mod components;
pub mod network;

pub use components::{RoadEdge, RoadNode};
pub use network::{IndexedPoint, RoadGraph, RoadNetwork};
