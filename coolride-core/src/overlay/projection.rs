//! Local metric projection used for buffering.
//!
//! An equirectangular projection centred on the network's bounding box.
//! Over the few kilometres a cached network spans, its distortion is far
//! below the buffer radii it is used for.

use geo::{Coord, MapCoords, Rect};

/// Metres per degree of latitude, shared by every degree/metre conversion.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalProjection {
    origin: Coord<f64>,
    meters_per_degree_lon: f64,
}

impl LocalProjection {
    pub fn new(origin_lon: f64, origin_lat: f64) -> Self {
        Self {
            origin: Coord {
                x: origin_lon,
                y: origin_lat,
            },
            meters_per_degree_lon: METERS_PER_DEGREE * origin_lat.to_radians().cos(),
        }
    }

    /// Projection centred on the middle of `bounds`.
    pub fn centered_on(bounds: &Rect<f64>) -> Self {
        let center = bounds.center();
        Self::new(center.x, center.y)
    }

    pub fn forward(&self, coord: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (coord.x - self.origin.x) * self.meters_per_degree_lon,
            y: (coord.y - self.origin.y) * METERS_PER_DEGREE,
        }
    }

    pub fn inverse(&self, coord: Coord<f64>) -> Coord<f64> {
        Coord {
            x: coord.x / self.meters_per_degree_lon + self.origin.x,
            y: coord.y / METERS_PER_DEGREE + self.origin.y,
        }
    }

    pub fn to_metric<G>(&self, geometry: &G) -> G::Output
    where
        G: MapCoords<f64, f64>,
    {
        let projection = *self;
        geometry.map_coords(move |coord| projection.forward(coord))
    }

    pub fn to_geographic<G>(&self, geometry: &G) -> G::Output
    where
        G: MapCoords<f64, f64>,
    {
        let projection = *self;
        geometry.map_coords(move |coord| projection.inverse(coord))
    }
}
