use serde::Serialize;

/// Heat-stress band of a WBGT value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyLevel {
    Safe,
    Caution,
    HighRisk,
}

impl SafetyLevel {
    /// `< 29` safe, `[29, 31)` caution, `≥ 31` high risk.
    pub fn classify(wbgt: f64) -> Self {
        if wbgt < 29.0 {
            SafetyLevel::Safe
        } else if wbgt < 31.0 {
            SafetyLevel::Caution
        } else {
            SafetyLevel::HighRisk
        }
    }

    pub fn status(self) -> &'static str {
        match self {
            SafetyLevel::Safe => "Safe to Ride",
            SafetyLevel::Caution => "CAUTION",
            SafetyLevel::HighRisk => "HIGH RISK",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            SafetyLevel::Safe => "green",
            SafetyLevel::Caution => "orange",
            SafetyLevel::HighRisk => "red",
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            SafetyLevel::Safe => "Normal hydration recommended.",
            SafetyLevel::Caution => {
                "Seek shade frequently. Increase hydration. Take breaks every 20-30 minutes."
            }
            SafetyLevel::HighRisk => {
                "Avoid outdoor activities. If riding is essential, take frequent breaks in air-conditioned areas."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetyAdvice {
    pub level: SafetyLevel,
    pub status: &'static str,
    pub color: &'static str,
    pub advice: &'static str,
}

pub fn safety(wbgt: f64) -> SafetyAdvice {
    let level = SafetyLevel::classify(wbgt);
    SafetyAdvice {
        level,
        status: level.status(),
        color: level.color(),
        advice: level.advice(),
    }
}
