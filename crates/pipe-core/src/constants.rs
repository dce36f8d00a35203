use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthesisError};

/// Temperature (°C) assumed when a ring has no temperature reading at all.
pub const DEFAULT_TEMPERATURE: f64 = 50.0;

/// Lower end of the temperature colour ramp (°C), rendered pure blue.
pub const TEMPERATURE_RANGE_MIN: f64 = 20.0;

/// Upper end of the temperature colour ramp (°C), rendered pure red.
pub const TEMPERATURE_RANGE_MAX: f64 = 80.0;

/// Added to the squared distance in the hazard weight `1 / (ε + d²)`.
/// Keeps the weight finite at an anchor and caps it at 1.
pub const HAZARD_WEIGHT_EPSILON: f64 = 1.0;

/// Fraction of the critical threshold where the warning band starts.
/// Shared by the hazard colour ramp and the status classifier.
pub const WARNING_RATIO: f64 = 0.8;

/// Two longitudinal positions closer than this are the same station.
pub const POSITION_TOLERANCE: f64 = 1e-9;

/// Evenly spaced fill positions merged into the station grid.
pub const DEFAULT_FILL_COUNT: usize = 20;

/// Domain constants that a calibration pass may need to change.
///
/// `Default` yields the values the engine was designed around; a JSON file
/// with any subset of the fields can override them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// Fallback ring temperature in °C.
    pub default_temperature: f64,
    /// Temperature mapped to blue (°C).
    pub temperature_min: f64,
    /// Temperature mapped to red (°C).
    pub temperature_max: f64,
    /// ε in the inverse-distance weight.
    pub hazard_epsilon: f64,
    /// Start of the warning band as a fraction of the critical threshold.
    pub warning_ratio: f64,
    /// Station merge tolerance on normalized positions.
    pub position_tolerance: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            default_temperature: DEFAULT_TEMPERATURE,
            temperature_min: TEMPERATURE_RANGE_MIN,
            temperature_max: TEMPERATURE_RANGE_MAX,
            hazard_epsilon: HAZARD_WEIGHT_EPSILON,
            warning_ratio: WARNING_RATIO,
            position_tolerance: POSITION_TOLERANCE,
        }
    }
}

impl Calibration {
    /// Width of the temperature reference range.
    pub fn temperature_span(&self) -> f64 {
        self.temperature_max - self.temperature_min
    }

    /// Reject calibrations that would divide by zero or invert a band.
    pub fn validate(&self) -> Result<()> {
        if !(self.temperature_span() > 0.0) {
            return Err(SynthesisError::invalid_calibration(
                "temperature_max",
                "must exceed temperature_min",
            ));
        }
        if !(self.hazard_epsilon > 0.0) {
            return Err(SynthesisError::invalid_calibration(
                "hazard_epsilon",
                "must be positive",
            ));
        }
        if !(self.warning_ratio > 0.0 && self.warning_ratio < 1.0) {
            return Err(SynthesisError::invalid_calibration(
                "warning_ratio",
                "must lie strictly between 0 and 1",
            ));
        }
        if !(self.position_tolerance >= 0.0) {
            return Err(SynthesisError::invalid_calibration(
                "position_tolerance",
                "must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Clamp a colour channel into `[0, 1]`.
pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
