//! Short-horizon WBGT forecast from a linear fit over time of day.

use std::fmt;

use serde::Serialize;

use super::store::SampleSeries;
use crate::config::WeatherConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Trend::Rising => "Rising",
            Trend::Falling => "Falling",
            Trend::Stable => "Stable",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Confidence {
    High,
    /// The fitted change exceeded the plausible step and was clamped
    #[serde(rename = "High (Physics Clamped)")]
    HighClamped,
    #[serde(rename = "Low Data")]
    LowData,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Confidence::High => "High",
            Confidence::HighClamped => "High (Physics Clamped)",
            Confidence::LowData => "Low Data",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendForecast {
    pub predicted_value: f64,
    pub trend: Trend,
    pub confidence: Confidence,
}

impl TrendForecast {
    /// Echo of the current value, used whenever no fit is possible.
    pub fn low_data(current: f64) -> Self {
        Self {
            predicted_value: current,
            trend: Trend::Stable,
            confidence: Confidence::LowData,
        }
    }
}

/// Ordinary least squares line `value = slope · minute + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// `None` for fewer than two points or when every minute is identical.
    pub fn fit(minutes: &[u32], values: &[f64]) -> Option<Self> {
        let n = minutes.len().min(values.len());
        if n < 2 {
            return None;
        }
        let xs = minutes[..n].iter().map(|&m| f64::from(m));
        let mean_x = xs.clone().sum::<f64>() / n as f64;
        let mean_y = values[..n].iter().sum::<f64>() / n as f64;

        let (mut sxx, mut sxy) = (0.0, 0.0);
        for (x, y) in xs.zip(&values[..n]) {
            sxx += (x - mean_x) * (x - mean_x);
            sxy += (x - mean_x) * (y - mean_y);
        }
        if sxx <= f64::EPSILON {
            return None;
        }
        let slope = sxy / sxx;
        let fit = Self {
            slope,
            intercept: mean_y - slope * mean_x,
        };
        (fit.slope.is_finite() && fit.intercept.is_finite()).then_some(fit)
    }

    pub fn predict(&self, minute: f64) -> f64 {
        self.slope * minute + self.intercept
    }
}

/// Forecast `horizon_minutes` after `now_minute`.
///
/// The prediction never moves more than `max_step` away from `current`;
/// changes within `dead_band` are labelled stable.
pub fn forecast(
    series: &SampleSeries,
    current: f64,
    now_minute: u32,
    config: &WeatherConfig,
) -> TrendForecast {
    if series.len() < config.min_regression_samples {
        return TrendForecast::low_data(current);
    }
    let Some(fit) = LinearFit::fit(&series.timestamps, &series.values) else {
        return TrendForecast::low_data(current);
    };

    let raw = fit.predict(f64::from(now_minute + config.horizon_minutes));
    let delta = raw - current;
    let (predicted_value, confidence) = if delta.abs() > config.max_step {
        (
            current + config.max_step.copysign(delta),
            Confidence::HighClamped,
        )
    } else {
        (raw, Confidence::High)
    };

    let trend = if predicted_value > current + config.dead_band {
        Trend::Rising
    } else if predicted_value < current - config.dead_band {
        Trend::Falling
    } else {
        Trend::Stable
    };

    TrendForecast {
        predicted_value,
        trend,
        confidence,
    }
}
