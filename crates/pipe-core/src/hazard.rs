//! Inverse-distance hazard field and threshold classification.
//!
//! Every placed gauge is anchored at a fixed point on the pipe. A vertex
//! takes the normalized inverse-squared-distance blend of all gauge values
//! and is coloured by where that blend falls against the critical threshold:
//!
//! ```text
//! ratio < w        green → yellow   (factor, 1, 0)
//! w ≤ ratio < 1    yellow → red     (1, 1 - factor, 0)
//! ratio ≥ 1        red              (1, 0, 0)
//! ```
//!
//! `w` is the warning ratio (0.8). The status classifier uses the very same
//! bands, so a vertex colour and a sensor status can never disagree.

use serde::{Deserialize, Serialize};

use crate::constants::{clamp01, Calibration};
use crate::reading::{Location, ReadingSet, SensorKind, SensorReading};
use crate::GeometryParameters;

/// Threshold band of a scalar value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Normal,
    Warning,
    Critical,
}

impl Status {
    /// Band of `ratio = value / critical_threshold`.
    pub fn from_ratio(ratio: f64, warning_ratio: f64) -> Status {
        if ratio >= 1.0 {
            Status::Critical
        } else if ratio >= warning_ratio {
            Status::Warning
        } else {
            Status::Normal
        }
    }

    /// Classify `value` against `critical_threshold`.
    pub fn classify(value: f64, critical_threshold: f64, calibration: &Calibration) -> Status {
        Status::from_ratio(value / critical_threshold, calibration.warning_ratio)
    }
}

/// Three-band hazard ramp. Channels are clamped to `[0, 1]`, so negative
/// values render as pure green.
pub fn hazard_color(value: f64, critical_threshold: f64, calibration: &Calibration) -> [f64; 3] {
    let ratio = value / critical_threshold;
    let w = calibration.warning_ratio;
    match Status::from_ratio(ratio, w) {
        Status::Critical => [1.0, 0.0, 0.0],
        Status::Warning => {
            let factor = (ratio - w) / (1.0 - w);
            [1.0, clamp01(1.0 - factor), 0.0]
        }
        Status::Normal => {
            let factor = ratio / w;
            [clamp01(factor), 1.0, 0.0]
        }
    }
}

/// Fixed 3D anchor of a placed gauge.
///
/// Directional gauges sit on the outer wall at the centre of their angular
/// sector (upper at θ = 0, right at π/2, left at 3π/2). Ring gauges measure
/// the whole circumference and sit on the axis, as do `Center` gauges.
/// The layout follows [`Sector`](crate::angular::Sector) so a gauge sits on
/// the wall it deforms, not where the logger's channel orientation puts it.
pub fn anchor(reading: &SensorReading, geometry: &GeometryParameters) -> [f64; 3] {
    let z = reading.longitudinal_position * geometry.length;
    let r = geometry.radius;
    match reading.location {
        Location::Upper => [r, 0.0, z],
        Location::Right => [0.0, r, z],
        Location::Left => [0.0, -r, z],
        Location::Circular | Location::Center => [0.0, 0.0, z],
    }
}

/// A gauge with its anchor.
#[derive(Debug, Clone, Copy)]
pub struct PlacedSensor<'a> {
    pub reading: &'a SensorReading,
    pub anchor: [f64; 3],
}

/// Inverse-distance blend of every placed gauge.
///
/// Gauges that are absent simply contribute nothing; with no gauges at all
/// the blended value is 0.
pub struct HazardField<'a> {
    sensors: Vec<PlacedSensor<'a>>,
    critical_threshold: f64,
    calibration: Calibration,
}

impl<'a> HazardField<'a> {
    pub fn new(
        readings: &'a ReadingSet,
        geometry: &GeometryParameters,
        calibration: &Calibration,
    ) -> Self {
        let sensors = readings
            .placed()
            .map(|reading| PlacedSensor {
                reading,
                anchor: anchor(reading, geometry),
            })
            .collect();
        Self {
            sensors,
            critical_threshold: geometry.critical_threshold,
            calibration: *calibration,
        }
    }

    pub fn sensors(&self) -> &[PlacedSensor<'a>] {
        &self.sensors
    }

    /// Normalized inverse-squared-distance blend at `vertex`.
    pub fn blended_value(&self, vertex: [f64; 3]) -> f64 {
        let eps = self.calibration.hazard_epsilon;
        let (weighted, total) = self
            .sensors
            .iter()
            .fold((0.0, 0.0), |(weighted, total), sensor| {
                let w = 1.0 / (eps + distance_squared(vertex, sensor.anchor));
                (weighted + w * sensor.reading.value, total + w)
            });
        if total > 0.0 {
            weighted / total
        } else {
            0.0
        }
    }

    pub fn color(&self, vertex: [f64; 3]) -> [f64; 3] {
        hazard_color(
            self.blended_value(vertex),
            self.critical_threshold,
            &self.calibration,
        )
    }
}

fn distance_squared(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

/// Summary of one gauge for tables and legends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorInfo {
    pub id: String,
    pub kind: SensorKind,
    pub location: Location,
    /// Human-readable type, e.g. "left side" or "temperature".
    pub label: String,
    pub latest_value: f64,
    pub status: Status,
}

/// Status of every reading in the batch, temperatures included, in input
/// order.
pub fn sensor_summary(
    readings: &ReadingSet,
    critical_threshold: f64,
    calibration: &Calibration,
) -> Vec<SensorInfo> {
    readings
        .readings()
        .iter()
        .map(|r| SensorInfo {
            id: r.id.clone(),
            kind: r.kind,
            location: r.location,
            label: match r.kind {
                SensorKind::Temperature => "temperature".to_string(),
                SensorKind::Deformation => r.location.label().to_string(),
            },
            latest_value: r.value,
            status: Status::classify(r.value, critical_threshold, calibration),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> GeometryParameters {
        GeometryParameters {
            length: 12.0,
            radius: 1.0,
            critical_threshold: 500.0,
            ..GeometryParameters::default()
        }
    }

    #[test]
    fn test_boundary_value_is_warning_yellow() {
        let cal = Calibration::default();
        assert_eq!(hazard_color(400.0, 500.0, &cal), [1.0, 1.0, 0.0]);
        assert_eq!(Status::classify(400.0, 500.0, &cal), Status::Warning);
    }

    #[test]
    fn test_color_bands() {
        let cal = Calibration::default();
        assert_eq!(hazard_color(0.0, 500.0, &cal), [0.0, 1.0, 0.0]);
        assert_eq!(hazard_color(200.0, 500.0, &cal), [0.5, 1.0, 0.0]);
        let mid_warning = hazard_color(450.0, 500.0, &cal);
        assert!((mid_warning[1] - 0.5).abs() < 1e-9, "got {mid_warning:?}");
        assert_eq!(hazard_color(500.0, 500.0, &cal), [1.0, 0.0, 0.0]);
        assert_eq!(hazard_color(9000.0, 500.0, &cal), [1.0, 0.0, 0.0]);
        assert_eq!(hazard_color(-250.0, 500.0, &cal), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_color_and_status_agree() {
        let cal = Calibration::default();
        let threshold = 500.0;
        let mut value = -100.0;
        while value <= 700.0 {
            let color = hazard_color(value, threshold, &cal);
            let expected = match Status::classify(value, threshold, &cal) {
                Status::Critical => color == [1.0, 0.0, 0.0],
                Status::Warning => color[0] == 1.0 && color[1] > 0.0,
                Status::Normal => color[1] == 1.0 && color[0] < 1.0,
            };
            assert!(expected, "value {value}: colour {color:?} disagrees with status");
            value += 0.5;
        }
    }

    #[test]
    fn test_anchors_follow_sectors() {
        let g = geometry();
        let up = SensorReading::deformation("U", Location::Upper, 0.5, 1.0);
        let left = SensorReading::deformation("L", Location::Left, 0.25, 1.0);
        let ring = SensorReading::deformation("K", Location::Circular, 1.0, 1.0);
        assert_eq!(anchor(&up, &g), [1.0, 0.0, 6.0]);
        assert_eq!(anchor(&left, &g), [0.0, -1.0, 3.0]);
        assert_eq!(anchor(&ring, &g), [0.0, 0.0, 12.0]);
    }

    #[test]
    fn test_empty_field_blends_to_zero() {
        let set = ReadingSet::default();
        let field = HazardField::new(&set, &geometry(), &Calibration::default());
        assert_eq!(field.blended_value([1.0, 0.0, 0.0]), 0.0);
        assert_eq!(field.color([1.0, 0.0, 0.0]), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_temperature_is_not_placed() {
        let set = ReadingSet::new(vec![
            SensorReading::temperature("T_3", 0.5, 900.0),
            SensorReading::deformation("U", Location::Upper, 0.5, 100.0),
        ]);
        let field = HazardField::new(&set, &geometry(), &Calibration::default());
        assert_eq!(field.sensors().len(), 1);
        assert!((field.blended_value([5.0, 5.0, 0.0]) - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_weights_favour_nearby_gauge() {
        let set = ReadingSet::new(vec![
            SensorReading::deformation("U", Location::Upper, 0.0, 100.0),
            SensorReading::deformation("R", Location::Right, 1.0, 0.0),
        ]);
        let field = HazardField::new(&set, &geometry(), &Calibration::default());
        // at the upper anchor: w_u = 1, w_r = 1 / (1 + 2 + 144)
        let expected = 100.0 / (1.0 + 1.0 / 147.0);
        let v = field.blended_value([1.0, 0.0, 0.0]);
        assert!((v - expected).abs() < 1e-9, "blend {v}, expected {expected}");
    }

    #[test]
    fn test_monotone_in_nearest_gauge() {
        let g = geometry();
        let cal = Calibration::default();
        let vertex = [0.9, 0.1, 1.0];
        let mut last = f64::NEG_INFINITY;
        for step in 0..20 {
            let set = ReadingSet::new(vec![
                SensorReading::deformation("U", Location::Upper, 0.1, step as f64 * 50.0),
                SensorReading::deformation("L", Location::Left, 0.9, 300.0),
                SensorReading::deformation("K", Location::Circular, 0.5, -40.0),
            ]);
            let v = HazardField::new(&set, &g, &cal).blended_value(vertex);
            assert!(v >= last, "blend decreased from {last} to {v} at step {step}");
            last = v;
        }
    }

    #[test]
    fn test_summary_labels_and_status() {
        let set = ReadingSet::new(vec![
            SensorReading::deformation("T3_L_1", Location::Left, 0.1, 740.2),
            SensorReading::deformation("T3_Up_1", Location::Upper, 0.1, -146.6),
            SensorReading::temperature("T_3", 0.5, 14.1),
        ]);
        let summary = sensor_summary(&set, 500.0, &Calibration::default());
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].status, Status::Critical);
        assert_eq!(summary[0].label, "left side");
        assert_eq!(summary[1].status, Status::Normal);
        assert_eq!(summary[2].label, "temperature");
    }
}
