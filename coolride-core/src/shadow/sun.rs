//! Approximate solar position.
//!
//! Declination from the day of year and an hour angle from local clock time.
//! No equation-of-time or longitude correction is applied: local clock noon
//! is treated as solar noon.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;

/// Sun angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SunPosition {
    pub elevation: f64,
    /// Clockwise from north.
    pub azimuth: f64,
}

impl SunPosition {
    pub fn is_above_horizon(&self) -> bool {
        self.elevation > 0.0
    }
}

/// Fractional local hour, e.g. 14:30 is `14.5`.
pub fn local_hour(timestamp: &NaiveDateTime) -> f64 {
    f64::from(timestamp.hour()) + f64::from(timestamp.minute()) / 60.0
}

/// Solar declination in degrees for a day of the year (1-based).
pub fn declination(day_of_year: u32) -> f64 {
    23.45 * ((360.0 / 365.0) * (f64::from(day_of_year) - 81.0)).to_radians().sin()
}

/// Sun elevation and azimuth at `timestamp` (local time) for a location.
///
/// Longitude is accepted for symmetry with the callers but not used, see the
/// module documentation.
pub fn sun_position(lat: f64, _lon: f64, timestamp: &NaiveDateTime) -> SunPosition {
    let hour = local_hour(timestamp);
    let hour_angle = 15.0 * (hour - 12.0);

    let lat_rad = lat.to_radians();
    let dec_rad = declination(timestamp.ordinal()).to_radians();
    let ha_rad = hour_angle.to_radians();

    let sin_elevation =
        lat_rad.sin() * dec_rad.sin() + lat_rad.cos() * dec_rad.cos() * ha_rad.cos();
    let elevation = sin_elevation.clamp(-1.0, 1.0).asin().to_degrees();

    let cos_azimuth = (dec_rad.sin() - lat_rad.sin() * sin_elevation)
        / (lat_rad.cos() * elevation.to_radians().cos());
    let mut azimuth = cos_azimuth.clamp(-1.0, 1.0).acos().to_degrees();
    if hour > 12.0 {
        azimuth = 360.0 - azimuth;
    }

    SunPosition { elevation, azimuth }
}
