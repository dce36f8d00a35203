//! JSON document handed to renderers.
//!
//! Buffers are flat numeric arrays (`[x0, y0, z0, x1, …]`), never nested
//! records; clients upload them to GPU buffers as they are.

use serde::{Deserialize, Serialize};

use crate::constants::Calibration;
use crate::error::Result;
use crate::hazard::{anchor, Status};
use crate::reading::{Location, ReadingSet, SensorKind};
use crate::{GeometryParameters, Mode, Synthesis};

pub const FORMAT_VERSION: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub version: f64,
    #[serde(rename = "type")]
    pub model_type: String,
    pub mode: Mode,
    pub parameters: GeometryParameters,
}

/// A gauge as drawn by the client: where it sits and how it is doing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireSensor {
    pub id: String,
    pub kind: SensorKind,
    pub location: Location,
    pub position: [f64; 3],
    pub value: f64,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeModel {
    pub metadata: Metadata,
    pub sensors: Vec<WireSensor>,
    pub vertices: Vec<f64>,
    pub normals: Vec<f64>,
    pub colors: Vec<f64>,
    pub indices: Vec<u32>,
}

impl PipeModel {
    /// Package a synthesis result with the inputs that produced it.
    pub fn new(
        synthesis: &Synthesis,
        readings: &ReadingSet,
        geometry: &GeometryParameters,
        mode: Mode,
        calibration: &Calibration,
    ) -> Self {
        let sensors = readings
            .readings()
            .iter()
            .map(|r| WireSensor {
                id: r.id.clone(),
                kind: r.kind,
                location: r.location,
                position: anchor(r, geometry),
                value: r.value,
                status: Status::classify(r.value, geometry.critical_threshold, calibration),
            })
            .collect();

        let mesh = &synthesis.mesh;
        Self {
            metadata: Metadata {
                version: FORMAT_VERSION,
                model_type: "pipe".to_string(),
                mode,
                parameters: *geometry,
            },
            sensors,
            vertices: mesh.flat_vertices().to_vec(),
            normals: mesh.flat_normals().to_vec(),
            colors: mesh.flat_colors().to_vec(),
            indices: mesh.flat_indices().to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
