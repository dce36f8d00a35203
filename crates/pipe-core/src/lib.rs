pub mod angular;
pub mod constants;
pub mod error;
pub mod grid;
pub mod hazard;
pub mod ingest;
pub mod interpolation;
pub mod mesh;
pub mod reading;
pub mod wire;

use serde::{Deserialize, Serialize};
use tracing::info;

pub use constants::Calibration;
pub use error::{Result, SynthesisError};
pub use hazard::{SensorInfo, Status};
pub use mesh::MeshBuffers;
pub use reading::{Location, ReadingSet, SensorKind, SensorReading};

use angular::RingProfile;
use hazard::HazardField;
use interpolation::StationInterpolator;
use mesh::{Ring, TemperatureColoring, VertexColoring};

// ---------------------------------------------------------------------------
// Shared interface types
// ---------------------------------------------------------------------------

/// Physical dimensions of the pipe and the mesh resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryParameters {
    /// Pipe length along the z axis.
    pub length: f64,
    /// Undeformed outer radius.
    pub radius: f64,
    /// Wall thickness; 0 renders a single-walled shell.
    pub wall_thickness: f64,
    /// Vertices per ring (and per wall).
    pub angular_segments: usize,
    /// Intervals of the evenly spaced fill grid between the outermost
    /// stations; `longitudinal_sections + 1` fill positions are merged in.
    pub longitudinal_sections: usize,
    /// Value at which a gauge turns critical.
    pub critical_threshold: f64,
}

impl Default for GeometryParameters {
    fn default() -> Self {
        Self {
            length: 10.0,
            radius: 1.0,
            wall_thickness: 0.1,
            angular_segments: 32,
            longitudinal_sections: constants::DEFAULT_FILL_COUNT - 1,
            critical_threshold: 500.0,
        }
    }
}

impl GeometryParameters {
    pub fn is_double_walled(&self) -> bool {
        self.wall_thickness > 0.0
    }

    /// Number of evenly spaced positions merged into the station grid.
    pub fn fill_count(&self) -> usize {
        self.longitudinal_sections.saturating_add(1)
    }

    fn walls(&self) -> usize {
        if self.is_double_walled() {
            2
        } else {
            1
        }
    }

    /// Upper bound on the vertex count for a batch with `observed_stations`
    /// distinct positions. Rejects meshes whose indices would not fit in
    /// `u32`, naming whichever of rings or ring size dominates.
    pub fn vertex_budget(&self, observed_stations: usize) -> Result<usize> {
        let per_ring = self.angular_segments.saturating_mul(self.walls());
        let rings = self.fill_count().saturating_add(observed_stations);
        match rings.checked_mul(per_ring) {
            Some(n) if n <= u32::MAX as usize => Ok(n),
            _ => {
                let field = if rings >= per_ring {
                    "longitudinal_sections"
                } else {
                    "angular_segments"
                };
                Err(SynthesisError::invalid_geometry(
                    field,
                    format!(
                        "up to {rings} rings of {per_ring} vertices exceed the 32-bit index range"
                    ),
                ))
            }
        }
    }

    /// Reject parameters that would produce a degenerate mesh.
    pub fn validate(&self) -> Result<()> {
        if !(self.length.is_finite() && self.length > 0.0) {
            return Err(SynthesisError::invalid_geometry(
                "length",
                format!("must be positive, got {}", self.length),
            ));
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(SynthesisError::invalid_geometry(
                "radius",
                format!("must be positive, got {}", self.radius),
            ));
        }
        if !(self.wall_thickness.is_finite() && self.wall_thickness >= 0.0) {
            return Err(SynthesisError::invalid_geometry(
                "wall_thickness",
                format!("must be non-negative, got {}", self.wall_thickness),
            ));
        }
        if self.wall_thickness >= self.radius {
            return Err(SynthesisError::invalid_geometry(
                "wall_thickness",
                format!(
                    "must be smaller than the radius {}, got {}",
                    self.radius, self.wall_thickness
                ),
            ));
        }
        if self.angular_segments < 3 {
            return Err(SynthesisError::invalid_geometry(
                "angular_segments",
                format!("must be at least 3, got {}", self.angular_segments),
            ));
        }
        if self.longitudinal_sections < 1 {
            return Err(SynthesisError::invalid_geometry(
                "longitudinal_sections",
                "must be at least 1",
            ));
        }
        if self.longitudinal_sections >= u32::MAX as usize {
            return Err(SynthesisError::invalid_geometry(
                "longitudinal_sections",
                format!("must be below {}, got {}", u32::MAX, self.longitudinal_sections),
            ));
        }
        let per_ring = self.angular_segments.checked_mul(self.walls());
        if per_ring.map_or(true, |n| n > u32::MAX as usize) {
            return Err(SynthesisError::invalid_geometry(
                "angular_segments",
                format!("ring size exceeds the 32-bit index range, got {}", self.angular_segments),
            ));
        }
        if !(self.critical_threshold.is_finite() && self.critical_threshold > 0.0) {
            return Err(SynthesisError::invalid_geometry(
                "critical_threshold",
                format!("must be positive, got {}", self.critical_threshold),
            ));
        }
        Ok(())
    }
}

/// How vertices are coloured. Geometry is the same in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Per-ring temperature ramp.
    #[default]
    AngularSector,
    /// Inverse-distance blend of all gauges against the critical threshold.
    InverseDistanceHazard,
}

/// Result of one synthesis call.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub mesh: MeshBuffers,
    /// Sorted normalized station positions, one per ring.
    pub stations: Vec<f64>,
    /// Field values per ring, parallel to `stations`.
    pub profiles: Vec<RingProfile>,
    /// Per-gauge status, only produced in hazard mode.
    pub sensors: Option<Vec<SensorInfo>>,
}

/// Turn one instant of readings into a coloured pipe mesh.
///
/// Pure function of its inputs: `readings` is only read, and equal inputs
/// give bit-identical buffers. An empty batch is not an error and yields a
/// single undeformed ring.
pub fn synthesize(
    readings: &ReadingSet,
    geometry: &GeometryParameters,
    mode: Mode,
    calibration: &Calibration,
) -> Result<Synthesis> {
    geometry.validate()?;
    calibration.validate()?;
    readings.validate()?;

    let tolerance = calibration.position_tolerance;
    let observed = readings.stations(tolerance);
    geometry.vertex_budget(observed.len())?;
    let positions: Vec<f64> = observed.iter().map(|s| s.position).collect();
    let stations = grid::build(&positions, geometry.fill_count(), tolerance);

    let interpolator = StationInterpolator::new(&observed, tolerance);
    let mut incomplete = 0;
    let profiles: Vec<RingProfile> = stations
        .iter()
        .map(|&p| {
            let sample = interpolator.sample(p);
            incomplete += sample.incomplete;
            RingProfile::from_sample(&sample, calibration)
        })
        .collect();
    if incomplete > 0 {
        info!("{incomplete} quantity lookups lacked a bracketing station; held or defaulted");
    }

    let rings: Vec<Ring> = stations
        .iter()
        .zip(&profiles)
        .map(|(&p, &profile)| Ring {
            z: p * geometry.length,
            profile,
        })
        .collect();

    let (mesh, sensors) = match mode {
        Mode::AngularSector => {
            let coloring = TemperatureColoring {
                calibration: *calibration,
            };
            (mesh::assemble(&rings, geometry, &coloring), None)
        }
        Mode::InverseDistanceHazard => {
            let field = HazardField::new(readings, geometry, calibration);
            let coloring: &dyn VertexColoring = &field;
            let summary =
                hazard::sensor_summary(readings, geometry.critical_threshold, calibration);
            (mesh::assemble(&rings, geometry, coloring), Some(summary))
        }
    };

    info!(
        "Synthesized {:?} mesh: {} readings, {} stations, {} vertices, {} triangles",
        mode,
        readings.len(),
        stations.len(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    Ok(Synthesis {
        mesh,
        stations,
        profiles,
        sensors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry_is_valid() {
        assert!(GeometryParameters::default().validate().is_ok());
        assert_eq!(GeometryParameters::default().fill_count(), 20);
    }

    #[test]
    fn test_rejects_invalid_geometry() {
        let cases = [
            GeometryParameters { angular_segments: 2, ..Default::default() },
            GeometryParameters { radius: 0.0, ..Default::default() },
            GeometryParameters { length: -1.0, ..Default::default() },
            GeometryParameters { wall_thickness: 1.0, ..Default::default() },
            GeometryParameters { wall_thickness: -0.1, ..Default::default() },
            GeometryParameters { longitudinal_sections: 0, ..Default::default() },
            GeometryParameters { critical_threshold: 0.0, ..Default::default() },
            GeometryParameters { length: f64::NAN, ..Default::default() },
        ];
        for geometry in cases {
            let err = synthesize(
                &ReadingSet::default(),
                &geometry,
                Mode::AngularSector,
                &Calibration::default(),
            )
            .unwrap_err();
            assert!(
                matches!(err, SynthesisError::InvalidGeometry { .. }),
                "{geometry:?} gave {err}"
            );
        }
    }

    fn geometry_field(err: SynthesisError) -> &'static str {
        match err {
            SynthesisError::InvalidGeometry { field, .. } => field,
            other => panic!("expected invalid geometry, got {other}"),
        }
    }

    #[test]
    fn test_oversized_mesh_is_rejected_before_generation() {
        let readings = ReadingSet::new(vec![
            SensorReading::deformation("L_1", Location::Left, 0.0, 1.0),
            SensorReading::deformation("L_2", Location::Left, 1.0, 2.0),
        ]);
        let cal = Calibration::default();
        let cases = [
            (
                GeometryParameters { longitudinal_sections: usize::MAX, ..Default::default() },
                "longitudinal_sections",
            ),
            (
                GeometryParameters { angular_segments: usize::MAX, ..Default::default() },
                "angular_segments",
            ),
            (
                GeometryParameters {
                    longitudinal_sections: 1 << 26,
                    angular_segments: 256,
                    ..Default::default()
                },
                "longitudinal_sections",
            ),
            (
                GeometryParameters {
                    longitudinal_sections: 1,
                    angular_segments: 1 << 31,
                    ..Default::default()
                },
                "angular_segments",
            ),
        ];
        for (geometry, expected) in cases {
            let err = synthesize(&readings, &geometry, Mode::AngularSector, &cal).unwrap_err();
            assert_eq!(geometry_field(err), expected, "{geometry:?}");
        }
    }

    #[test]
    fn test_vertex_budget_bounds_the_mesh() {
        let geometry = GeometryParameters {
            angular_segments: 4,
            wall_thickness: 0.0,
            longitudinal_sections: 1,
            ..GeometryParameters::default()
        };
        assert_eq!(geometry.vertex_budget(2).unwrap(), 16);
        assert_eq!(GeometryParameters::default().fill_count(), constants::DEFAULT_FILL_COUNT);
    }

    #[test]
    fn test_empty_batch_gives_single_neutral_ring() {
        let geometry = GeometryParameters::default();
        let out = synthesize(
            &ReadingSet::default(),
            &geometry,
            Mode::AngularSector,
            &Calibration::default(),
        )
        .unwrap();
        assert_eq!(out.stations, vec![0.0]);
        assert_eq!(out.mesh.vertex_count(), geometry.angular_segments * 2);
        assert_eq!(out.mesh.triangle_count(), 0);
        assert!(out.sensors.is_none());
        assert!(out.mesh.colors().iter().all(|c| *c == [0.5, 0.0, 0.5]));
    }

    #[test]
    fn test_hazard_mode_reports_sensors() {
        let readings = ReadingSet::new(vec![
            SensorReading::deformation("U", Location::Upper, 0.2, 450.0),
            SensorReading::temperature("T", 0.5, 30.0),
        ]);
        let out = synthesize(
            &readings,
            &GeometryParameters::default(),
            Mode::InverseDistanceHazard,
            &Calibration::default(),
        )
        .unwrap();
        let sensors = out.sensors.expect("hazard mode must report sensors");
        assert_eq!(sensors.len(), 2);
        assert_eq!(sensors[0].status, Status::Warning);
        assert!(out.mesh.is_well_formed());
    }
}
