//! Longitudinal interpolation of station readings.

use tracing::debug;

use crate::reading::{Location, QuantityKey, Station};

/// How a quantity was obtained at a grid position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Estimate {
    /// A station at this position carries the quantity.
    Observed(f64),
    /// Linear blend of the nearest stations on both sides.
    Interpolated(f64),
    /// Only one side has the quantity; its value is held, never extrapolated.
    Held(f64),
    /// No station carries the quantity.
    Absent,
}

impl Estimate {
    pub fn value(self) -> Option<f64> {
        match self {
            Estimate::Observed(v) | Estimate::Interpolated(v) | Estimate::Held(v) => Some(v),
            Estimate::Absent => None,
        }
    }

    /// True when a bracketing station was missing on at least one side.
    pub fn is_incomplete(self) -> bool {
        matches!(self, Estimate::Held(_) | Estimate::Absent)
    }
}

/// Every tracked quantity at one grid position. Missing quantities stay
/// `None`; consumers choose their own fallback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingSample {
    pub position: f64,
    pub upper: Option<f64>,
    pub right: Option<f64>,
    pub circular: Option<f64>,
    pub left: Option<f64>,
    pub temperature: Option<f64>,
    /// Number of quantities that were held or absent.
    pub incomplete: usize,
}

impl RingSample {
    pub fn directional(&self, location: Location) -> Option<f64> {
        match location {
            Location::Upper => self.upper,
            Location::Right => self.right,
            Location::Circular => self.circular,
            Location::Left => self.left,
            Location::Center => None,
        }
    }
}

/// Looks up or interpolates quantities between observed stations.
pub struct StationInterpolator<'s, 'a> {
    stations: &'s [Station<'a>],
    tolerance: f64,
}

impl<'s, 'a> StationInterpolator<'s, 'a> {
    /// `stations` must be sorted by position, as returned by
    /// [`ReadingSet::stations`](crate::reading::ReadingSet::stations).
    pub fn new(stations: &'s [Station<'a>], tolerance: f64) -> Self {
        Self {
            stations,
            tolerance,
        }
    }

    /// Estimate `key` at `position`.
    pub fn estimate(&self, key: QuantityKey, position: f64) -> Estimate {
        let tol = self.tolerance;
        let lo = self
            .stations
            .partition_point(|s| s.position < position - tol);
        let hi = self
            .stations
            .partition_point(|s| s.position <= position + tol);

        if let Some(v) = self.stations[lo..hi].iter().find_map(|s| s.value(key)) {
            return Estimate::Observed(v);
        }

        let prev = self.stations[..lo]
            .iter()
            .rev()
            .find_map(|s| s.value(key).map(|v| (s.position, v)));
        let next = self.stations[hi..]
            .iter()
            .find_map(|s| s.value(key).map(|v| (s.position, v)));

        match (prev, next) {
            (Some((p_prev, v_prev)), Some((p_next, v_next))) => Estimate::Interpolated(
                v_prev + (position - p_prev) / (p_next - p_prev) * (v_next - v_prev),
            ),
            (Some((_, v)), None) | (None, Some((_, v))) => Estimate::Held(v),
            (None, None) => Estimate::Absent,
        }
    }

    /// Estimate every tracked quantity at `position`.
    pub fn sample(&self, position: f64) -> RingSample {
        let mut incomplete = 0;
        let mut get = |key: QuantityKey| {
            let estimate = self.estimate(key, position);
            if estimate.is_incomplete() {
                incomplete += 1;
                debug!("{key} at {position:.4}: no bracketing station ({estimate:?})");
            }
            estimate.value()
        };

        let upper = get(QuantityKey::deformation(Location::Upper));
        let right = get(QuantityKey::deformation(Location::Right));
        let circular = get(QuantityKey::deformation(Location::Circular));
        let left = get(QuantityKey::deformation(Location::Left));
        let temperature = get(QuantityKey::TEMPERATURE);

        RingSample {
            position,
            upper,
            right,
            circular,
            left,
            temperature,
            incomplete,
        }
    }
}
