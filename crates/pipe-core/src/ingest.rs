//! Turning raw logger exports into typed readings.
//!
//! Loggers name their channels `<pipe>_<side>_<group>`, e.g. `T3_L_2`, with
//! `K` for ring gauges, `Up`/`R`/`L` for the upper, right and left sides, and
//! `T_<n>` for thermometers. Exported headers append channel details after a
//! space (`T3_L_2 (s/n=, CH6, value)`) and values use a decimal comma.

use tracing::debug;

use crate::error::{Result, SynthesisError};
use crate::reading::{Location, ReadingSet, SensorKind, SensorReading};

/// Name of the timestamp column.
pub const TIME_COLUMN: &str = "Time";

/// A decoded channel label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorLabel {
    pub id: String,
    pub kind: SensorKind,
    pub location: Location,
    /// 1-based index of the gauge group along the pipe.
    pub group: u32,
}

/// Decode a channel label. Returns `None` for the timestamp column and for
/// labels that follow no known pattern.
pub fn parse_label(raw: &str) -> Option<SensorLabel> {
    let id = raw.split_whitespace().next()?;
    if id == TIME_COLUMN {
        return None;
    }
    let group: u32 = id.rsplit('_').next()?.parse().ok()?;

    let (kind, location) = if id.starts_with("T_") {
        (SensorKind::Temperature, Location::Center)
    } else if id.contains("_K_") {
        (SensorKind::Deformation, Location::Circular)
    } else if id.contains("_Up_") {
        (SensorKind::Deformation, Location::Upper)
    } else if id.contains("_R_") {
        (SensorKind::Deformation, Location::Right)
    } else if id.contains("_L_") {
        (SensorKind::Deformation, Location::Left)
    } else {
        return None;
    };

    Some(SensorLabel {
        id: id.to_string(),
        kind,
        location,
        group,
    })
}

/// Where gauge groups sit along a physical pipe.
///
/// Groups are spread evenly between `end_offset_m` from either end;
/// thermometers sit at `temperature_position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorLayout {
    pub pipe_length_m: f64,
    pub end_offset_m: f64,
    pub groups: u32,
    /// Normalized position of every thermometer.
    pub temperature_position: f64,
}

impl Default for SensorLayout {
    fn default() -> Self {
        Self {
            pipe_length_m: 12.0,
            end_offset_m: 1.0,
            groups: 3,
            temperature_position: 0.5,
        }
    }
}

impl SensorLayout {
    /// Normalized position of a 1-based gauge group, clamped to `[0, 1]`.
    pub fn position(&self, group: u32) -> f64 {
        if self.groups <= 1 {
            return 0.5;
        }
        let usable = self.pipe_length_m - 2.0 * self.end_offset_m;
        let step = usable / f64::from(self.groups - 1);
        let metres = self.end_offset_m + f64::from(group.saturating_sub(1)) * step;
        (metres / self.pipe_length_m).clamp(0.0, 1.0)
    }

    /// Place a decoded label with its value.
    pub fn place(&self, label: SensorLabel, value: f64) -> SensorReading {
        match label.kind {
            SensorKind::Temperature => {
                SensorReading::temperature(label.id, self.temperature_position, value)
            }
            SensorKind::Deformation => SensorReading::deformation(
                label.id,
                label.location,
                self.position(label.group),
                value,
            ),
        }
    }
}

/// One row of a logger export.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Raw timestamp text, if the export has a time column.
    pub time: Option<String>,
    pub readings: ReadingSet,
}

/// Parse a decimal-comma number such as `720,4790652`.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse().ok()
}

fn delimiter(header: &str) -> char {
    if header.contains('\t') {
        '\t'
    } else {
        ';'
    }
}

/// Decode one value row against its header row. Columns are separated by
/// tabs or semicolons; unknown columns are skipped.
pub fn parse_sample(header: &str, row: &str, layout: &SensorLayout) -> Result<Sample> {
    let sep = delimiter(header);
    let labels: Vec<&str> = header.split(sep).collect();
    let values: Vec<&str> = row.split(sep).collect();
    if labels.len() != values.len() {
        return Err(SynthesisError::malformed_sample(format!(
            "header has {} columns, row has {}",
            labels.len(),
            values.len()
        )));
    }

    let mut time = None;
    let mut readings = Vec::with_capacity(labels.len());
    for (raw_label, raw_value) in labels.iter().zip(&values) {
        if raw_label.split_whitespace().next() == Some(TIME_COLUMN) {
            time = Some(raw_value.trim().to_string());
            continue;
        }
        let Some(label) = parse_label(raw_label) else {
            debug!("Skipping unrecognised column {raw_label:?}");
            continue;
        };
        let value = parse_decimal(raw_value).ok_or_else(|| {
            SynthesisError::malformed_sample(format!(
                "column {} has non-numeric value {raw_value:?}",
                label.id
            ))
        })?;
        readings.push(layout.place(label, value));
    }

    Ok(Sample {
        time,
        readings: ReadingSet::new(readings),
    })
}

/// Decode the most recent row of a whole export: the first non-empty line is
/// the header, the last non-empty line the latest sample.
pub fn latest_sample(export: &str, layout: &SensorLayout) -> Result<Sample> {
    let mut lines = export.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| SynthesisError::malformed_sample("export is empty"))?;
    let row = lines
        .last()
        .ok_or_else(|| SynthesisError::malformed_sample("export has a header but no rows"))?;
    parse_sample(header, row, layout)
}
