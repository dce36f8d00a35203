//! Loading reading batches and calibration overrides from disk.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use pipe_core::ingest::{latest_sample, SensorLayout};
use pipe_core::{Calibration, ReadingSet};
use tracing::info;

/// How the input file is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// `.json` is a reading array, anything else a logger export
    Auto,
    /// JSON array of readings
    Json,
    /// Tab or semicolon separated logger export; the last row is used
    Logger,
}

/// Pick a concrete format for `path`.
pub fn resolve_format(path: &Path, format: InputFormat) -> InputFormat {
    match format {
        InputFormat::Auto => {
            let is_json = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("json"));
            if is_json {
                InputFormat::Json
            } else {
                InputFormat::Logger
            }
        }
        explicit => explicit,
    }
}

pub fn load_readings(path: &Path, format: InputFormat, layout: &SensorLayout) -> Result<ReadingSet> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let readings = match resolve_format(path, format) {
        InputFormat::Logger => {
            let sample = latest_sample(&text, layout)
                .with_context(|| format!("failed to parse logger export {}", path.display()))?;
            if let Some(time) = &sample.time {
                info!("Using sample taken at {time}");
            }
            sample.readings
        }
        _ => ReadingSet::from_json(&text)
            .with_context(|| format!("failed to parse readings from {}", path.display()))?,
    };

    info!("Loaded {} readings from {}", readings.len(), path.display());
    Ok(readings)
}

/// Defaults, overridden by any fields present in `path`.
pub fn load_calibration(path: Option<&Path>) -> Result<Calibration> {
    let Some(path) = path else {
        return Ok(Calibration::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read calibration {}", path.display()))?;
    parse_calibration(&text).with_context(|| format!("invalid calibration in {}", path.display()))
}

fn parse_calibration(text: &str) -> Result<Calibration> {
    let calibration: Calibration = serde_json::from_str(text)?;
    calibration.validate()?;
    Ok(calibration)
}
