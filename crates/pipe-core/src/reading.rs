//! Typed sensor readings for one sampled instant.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::Calibration;
use crate::error::{Result, SynthesisError};
use crate::grid::dedup_sorted;

/// Physical quantity a sensor measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Temperature,
    Deformation,
}

/// Placement of a sensor around the circumference.
///
/// `Circular` gauges measure ring strain and own the lower sector of the
/// angular field. Temperature sensors sit at `Center`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Upper,
    Right,
    Left,
    Circular,
    #[default]
    Center,
}

impl Location {
    /// The four locations that own an angular sector.
    pub const DIRECTIONAL: [Location; 4] = [
        Location::Upper,
        Location::Right,
        Location::Circular,
        Location::Left,
    ];

    /// Human-readable label used in sensor summaries.
    pub fn label(self) -> &'static str {
        match self {
            Location::Upper => "upper side",
            Location::Right => "right side",
            Location::Left => "left side",
            Location::Circular => "ring deformation",
            Location::Center => "center",
        }
    }
}

/// Identifies one tracked quantity along the pipe: a `(kind, location)` pair.
///
/// Temperature is uniform around the circumference, so every temperature
/// reading maps to the same key regardless of its location tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuantityKey {
    pub kind: SensorKind,
    pub location: Location,
}

impl QuantityKey {
    pub const TEMPERATURE: QuantityKey = QuantityKey {
        kind: SensorKind::Temperature,
        location: Location::Center,
    };

    pub const fn deformation(location: Location) -> Self {
        Self {
            kind: SensorKind::Deformation,
            location,
        }
    }
}

impl fmt::Display for QuantityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SensorKind::Temperature => write!(f, "temperature"),
            SensorKind::Deformation => write!(f, "deformation/{:?}", self.location),
        }
    }
}

/// One raw value with its placement on the pipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Unique within one sampled instant.
    pub id: String,
    pub kind: SensorKind,
    #[serde(default)]
    pub location: Location,
    /// Normalized position along the pipe axis, 0 at the inlet and 1 at the outlet.
    pub longitudinal_position: f64,
    pub value: f64,
}

impl SensorReading {
    pub fn deformation(
        id: impl Into<String>,
        location: Location,
        longitudinal_position: f64,
        value: f64,
    ) -> Self {
        Self {
            id: id.into(),
            kind: SensorKind::Deformation,
            location,
            longitudinal_position,
            value,
        }
    }

    pub fn temperature(id: impl Into<String>, longitudinal_position: f64, value: f64) -> Self {
        Self {
            id: id.into(),
            kind: SensorKind::Temperature,
            location: Location::Center,
            longitudinal_position,
            value,
        }
    }

    /// The quantity this reading contributes to.
    pub fn key(&self) -> QuantityKey {
        match self.kind {
            SensorKind::Temperature => QuantityKey::TEMPERATURE,
            SensorKind::Deformation => QuantityKey::deformation(self.location),
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.value.is_finite() {
            return Err(SynthesisError::invalid_reading(&self.id, "value is not finite"));
        }
        if !(0.0..=1.0).contains(&self.longitudinal_position) {
            return Err(SynthesisError::invalid_reading(
                &self.id,
                format!(
                    "longitudinal position {} outside [0, 1]",
                    self.longitudinal_position
                ),
            ));
        }
        Ok(())
    }
}

/// A longitudinal position and the readings observed exactly there.
///
/// Stations borrow from the reading batch; they are rebuilt on every call.
#[derive(Debug, Clone)]
pub struct Station<'a> {
    /// Normalized position along the pipe.
    pub position: f64,
    pub readings: Vec<&'a SensorReading>,
}

impl Station<'_> {
    /// Observed value of `key` at this station.
    ///
    /// Several gauges of the same quantity at one station are averaged.
    pub fn value(&self, key: QuantityKey) -> Option<f64> {
        let (sum, count) = self
            .readings
            .iter()
            .filter(|r| r.key() == key)
            .fold((0.0, 0usize), |(sum, count), r| (sum + r.value, count + 1));
        (count > 0).then(|| sum / count as f64)
    }
}

/// All readings of one sampled instant, observed or forecast alike.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadingSet {
    readings: Vec<SensorReading>,
}

impl ReadingSet {
    pub fn new(readings: Vec<SensorReading>) -> Self {
        Self { readings }
    }

    /// Decode a JSON array of readings.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn readings(&self) -> &[SensorReading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Reject non-finite values, positions outside `[0, 1]` and repeated ids.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.readings.len());
        for reading in &self.readings {
            reading.validate()?;
            if !seen.insert(reading.id.as_str()) {
                return Err(SynthesisError::invalid_reading(&reading.id, "duplicate id"));
            }
        }
        Ok(())
    }

    /// Readings with a spatial anchor, i.e. everything except temperature.
    pub fn placed(&self) -> impl Iterator<Item = &SensorReading> {
        self.readings
            .iter()
            .filter(|r| r.kind != SensorKind::Temperature)
    }

    /// Group readings into stations, sorted by position. Positions closer
    /// than `tolerance` share a station placed at the smallest of them.
    pub fn stations(&self, tolerance: f64) -> Vec<Station<'_>> {
        let mut sorted: Vec<&SensorReading> = self.readings.iter().collect();
        sorted.sort_by(|a, b| a.longitudinal_position.total_cmp(&b.longitudinal_position));

        let positions: Vec<f64> = sorted.iter().map(|r| r.longitudinal_position).collect();
        let mut stations: Vec<Station<'_>> = dedup_sorted(&positions, tolerance)
            .into_iter()
            .map(|position| Station {
                position,
                readings: Vec::new(),
            })
            .collect();

        let mut current = 0;
        for reading in sorted {
            while current + 1 < stations.len()
                && reading.longitudinal_position >= stations[current + 1].position
            {
                current += 1;
            }
            stations[current].readings.push(reading);
        }
        stations
    }

    /// Rescale deformation values so the largest magnitude equals
    /// `max_deflection` and clamp temperatures into the colour reference
    /// range. Used to keep the rendered bulge within a fraction of the
    /// radius when raw gauge units are much larger.
    pub fn normalized_for_display(&self, max_deflection: f64, calibration: &Calibration) -> Self {
        let max_abs = self
            .readings
            .iter()
            .filter(|r| r.kind == SensorKind::Deformation)
            .map(|r| r.value.abs())
            .fold(0.0, f64::max);

        let readings = self
            .readings
            .iter()
            .map(|r| {
                let mut r = r.clone();
                match r.kind {
                    SensorKind::Deformation if max_abs > 0.0 => {
                        r.value = r.value / max_abs * max_deflection;
                    }
                    SensorKind::Deformation => {}
                    SensorKind::Temperature => {
                        // bounds are unvalidated here and may be inverted or NaN
                        r.value = r
                            .value
                            .max(calibration.temperature_min)
                            .min(calibration.temperature_max);
                    }
                }
                r
            })
            .collect();
        Self { readings }
    }
}

impl FromIterator<SensorReading> for ReadingSet {
    fn from_iter<I: IntoIterator<Item = SensorReading>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::POSITION_TOLERANCE;

    fn sample() -> ReadingSet {
        ReadingSet::new(vec![
            SensorReading::deformation("L_2", Location::Left, 0.5, 0.2),
            SensorReading::deformation("L_1", Location::Left, 0.1, 0.4),
            SensorReading::deformation("R_1", Location::Right, 0.1 + 1e-12, -0.3),
            SensorReading::temperature("T_1", 0.5, 42.0),
        ])
    }

    #[test]
    fn test_stations_group_and_sort() {
        let set = sample();
        let stations = set.stations(POSITION_TOLERANCE);
        assert_eq!(stations.len(), 2, "near-equal positions should collapse");
        assert_eq!(stations[0].position, 0.1);
        assert_eq!(stations[0].readings.len(), 2);
        assert_eq!(stations[1].readings.len(), 2);
    }

    #[test]
    fn test_station_value_by_key() {
        let set = sample();
        let stations = set.stations(POSITION_TOLERANCE);
        assert_eq!(stations[0].value(QuantityKey::deformation(Location::Right)), Some(-0.3));
        assert_eq!(stations[0].value(QuantityKey::TEMPERATURE), None);
        assert_eq!(stations[1].value(QuantityKey::TEMPERATURE), Some(42.0));
    }

    #[test]
    fn test_station_averages_duplicate_gauges() {
        let set = ReadingSet::new(vec![
            SensorReading::deformation("K_1", Location::Circular, 0.2, 1.0),
            SensorReading::deformation("K_2", Location::Circular, 0.2, 3.0),
        ]);
        let stations = set.stations(POSITION_TOLERANCE);
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].value(QuantityKey::deformation(Location::Circular)), Some(2.0));
    }

    #[test]
    fn test_temperature_key_ignores_location() {
        let mut t = SensorReading::temperature("T_9", 0.3, 20.0);
        t.location = Location::Upper;
        assert_eq!(t.key(), QuantityKey::TEMPERATURE);
    }

    #[test]
    fn test_validate_rejects_bad_readings() {
        let dup = ReadingSet::new(vec![
            SensorReading::temperature("T_1", 0.5, 20.0),
            SensorReading::temperature("T_1", 0.6, 21.0),
        ]);
        assert!(matches!(dup.validate(), Err(SynthesisError::InvalidReading { .. })));

        let out_of_range =
            ReadingSet::new(vec![SensorReading::deformation("U", Location::Upper, 1.5, 0.0)]);
        assert!(out_of_range.validate().is_err());

        let nan = ReadingSet::new(vec![SensorReading::deformation("U", Location::Upper, 0.5, f64::NAN)]);
        assert!(nan.validate().is_err());

        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_normalized_for_display() {
        let set = ReadingSet::new(vec![
            SensorReading::deformation("A", Location::Upper, 0.1, 720.0),
            SensorReading::deformation("B", Location::Right, 0.1, -360.0),
            SensorReading::temperature("T", 0.5, 14.0),
        ]);
        let norm = set.normalized_for_display(0.5, &Calibration::default());
        let values: Vec<f64> = norm.readings().iter().map(|r| r.value).collect();
        assert_eq!(values, vec![0.5, -0.25, 20.0]);
        // input is untouched
        assert_eq!(set.readings()[0].value, 720.0);
    }

    #[test]
    fn test_normalized_for_display_tolerates_bad_calibration() {
        let set = ReadingSet::new(vec![SensorReading::temperature("T", 0.5, 50.0)]);
        let inverted = Calibration {
            temperature_min: 80.0,
            temperature_max: 20.0,
            ..Calibration::default()
        };
        let norm = set.normalized_for_display(0.5, &inverted);
        assert_eq!(norm.readings()[0].value, 20.0);

        let nan = Calibration {
            temperature_min: f64::NAN,
            ..Calibration::default()
        };
        let norm = set.normalized_for_display(0.5, &nan);
        assert_eq!(norm.readings()[0].value, 50.0);
    }

    #[test]
    fn test_json_decoding_defaults_location() {
        let json = r#"[
            {"id": "T_3", "kind": "temperature", "longitudinal_position": 0.5, "value": 14.1},
            {"id": "T3_L_1", "kind": "deformation", "location": "left", "longitudinal_position": 0.083, "value": 279.4}
        ]"#;
        let set = ReadingSet::from_json(json).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.readings()[0].location, Location::Center);
        assert_eq!(set.readings()[1].location, Location::Left);
    }
}
