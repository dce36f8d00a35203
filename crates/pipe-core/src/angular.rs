use std::f64::consts::{FRAC_PI_4, TAU};

use crate::constants::{clamp01, Calibration};
use crate::interpolation::RingSample;
use crate::reading::Location;

/// Angular sector of the pipe wall. Each sector takes its deformation from
/// one directional gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sector {
    /// `[-π/4, π/4)`
    Upper,
    /// `[π/4, 3π/4)`
    Right,
    /// `[3π/4, 5π/4)`
    Circular,
    /// `[5π/4, 7π/4)`
    Left,
}

impl Sector {
    /// Sector owning angle `theta`. Any finite angle is accepted and wrapped
    /// into `[0, 2π)` first; sector edges are closed below and open above.
    pub fn of(theta: f64) -> Sector {
        let theta = theta.rem_euclid(TAU);
        if theta < FRAC_PI_4 {
            Sector::Upper
        } else if theta < 3.0 * FRAC_PI_4 {
            Sector::Right
        } else if theta < 5.0 * FRAC_PI_4 {
            Sector::Circular
        } else if theta < 7.0 * FRAC_PI_4 {
            Sector::Left
        } else {
            Sector::Upper
        }
    }

    pub fn location(self) -> Location {
        match self {
            Sector::Upper => Location::Upper,
            Sector::Right => Location::Right,
            Sector::Circular => Location::Circular,
            Sector::Left => Location::Left,
        }
    }
}

/// The four directional deformations and the temperature of one ring, with
/// missing values already replaced by their neutral defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingProfile {
    pub upper: f64,
    pub right: f64,
    pub circular: f64,
    pub left: f64,
    pub temperature: f64,
}

impl RingProfile {
    /// Undeformed ring at the default temperature.
    pub fn neutral(calibration: &Calibration) -> Self {
        Self {
            upper: 0.0,
            right: 0.0,
            circular: 0.0,
            left: 0.0,
            temperature: calibration.default_temperature,
        }
    }

    /// Single-value policy: absent deformations are 0, an absent
    /// temperature is the calibrated default.
    pub fn from_sample(sample: &RingSample, calibration: &Calibration) -> Self {
        Self {
            upper: sample.upper.unwrap_or(0.0),
            right: sample.right.unwrap_or(0.0),
            circular: sample.circular.unwrap_or(0.0),
            left: sample.left.unwrap_or(0.0),
            temperature: sample
                .temperature
                .unwrap_or(calibration.default_temperature),
        }
    }

    pub fn deformation(&self, sector: Sector) -> f64 {
        match sector {
            Sector::Upper => self.upper,
            Sector::Right => self.right,
            Sector::Circular => self.circular,
            Sector::Left => self.left,
        }
    }

    /// Perturbed radius at `theta`: `base + cos θ · deformation(sector(θ))`.
    pub fn radius(&self, base_radius: f64, theta: f64) -> f64 {
        base_radius + theta.cos() * self.deformation(Sector::of(theta))
    }

    /// Ring colour from the temperature ramp.
    pub fn color(&self, calibration: &Calibration) -> [f64; 3] {
        temperature_color(self.temperature, calibration)
    }
}

/// Blue-to-red ramp over the calibrated temperature range, clamped at both
/// ends. Green is always 0.
pub fn temperature_color(temperature: f64, calibration: &Calibration) -> [f64; 3] {
    let r = clamp01((temperature - calibration.temperature_min) / calibration.temperature_span());
    [r, 0.0, 1.0 - r]
}
