//! Sun geometry and approximate building shadows

mod caster;
pub mod sun;

use geo::Polygon;

pub use caster::{cast_building_shadows, cast_shadow};
pub use sun::{SunPosition, sun_position};

/// Building footprint with its height, when the source layer has one.
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub footprint: Polygon<f64>,
    pub height: Option<f64>,
}

impl Building {
    pub fn new(footprint: Polygon<f64>, height: Option<f64>) -> Self {
        Self { footprint, height }
    }

    /// Height in metres, or the assumed constant when none is known.
    pub fn height_or(&self, assumed: f64) -> f64 {
        self.height
            .filter(|height| height.is_finite() && *height > 0.0)
            .unwrap_or(assumed)
    }
}
