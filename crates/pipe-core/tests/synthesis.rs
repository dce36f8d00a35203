use pipe_core::ingest::{latest_sample, SensorLayout};
use pipe_core::interpolation::{Estimate, StationInterpolator};
use pipe_core::reading::QuantityKey;
use pipe_core::{
    synthesize, Calibration, GeometryParameters, Location, Mode, ReadingSet, SensorReading, Status,
};

/// One logger row from a three-group pipe: left, right, upper and ring
/// gauges plus a thermometer.
const EXPORT: &str = "Time\tT3_L_3 (s/n=, CH6, value)\tT3_L_2 (s/n=, CH6, value)\tT3_L_1 (s/n=, CH6, value)\tT3_R_1 (s/n=, CH6, value)\tT3_R_2 (s/n=, CH6, value)\tT3_R_3 (s/n=, CH6, value)\tT3_Up_1 (s/n=, CH7, value)\tT3_Up_2 (s/n=, CH7, value)\tT3_Up_3 (s/n=, CH7, value)\tT3_K_1 (s/n=, CH7, value)\tT3_K_2 (s/n=, CH7, value)\tT2_K_3 (s/n=, CH7, value)\tT_3 (s/n=, CH7, value)
2024-01-01T00:06:09,555\t720,4790652\t336,9241863\t279,4417719\t274,4453808\t291,1124319\t740,2059905\t-146,6366455\t-249,9021305\t-170,2594846\t638,4761851\t472,8626131\t542,7257687\t14,06850088";

fn logged_readings() -> ReadingSet {
    latest_sample(EXPORT, &SensorLayout::default())
        .expect("export parses")
        .readings
}

fn single_wall(segments: usize, sections: usize) -> GeometryParameters {
    GeometryParameters {
        wall_thickness: 0.0,
        angular_segments: segments,
        longitudinal_sections: sections,
        ..GeometryParameters::default()
    }
}

#[test]
fn two_stations_four_segments_one_section() {
    let readings = ReadingSet::new(vec![
        SensorReading::deformation("L_1", Location::Left, 0.0, 10.0),
        SensorReading::deformation("L_2", Location::Left, 1.0, 20.0),
    ]);
    let out = synthesize(
        &readings,
        &single_wall(4, 1),
        Mode::AngularSector,
        &Calibration::default(),
    )
    .unwrap();

    assert_eq!(out.stations, vec![0.0, 1.0]);
    assert_eq!(out.mesh.vertex_count(), 8);
    assert_eq!(out.mesh.triangle_count(), 8);
    assert!(out.mesh.is_well_formed());
}

#[test]
fn midpoint_of_two_stations_interpolates_exactly() {
    let readings = ReadingSet::new(vec![
        SensorReading::deformation("L_1", Location::Left, 0.0, 10.0),
        SensorReading::deformation("L_2", Location::Left, 1.0, 20.0),
    ]);
    let cal = Calibration::default();
    let stations = readings.stations(cal.position_tolerance);
    let interp = StationInterpolator::new(&stations, cal.position_tolerance);
    assert_eq!(
        interp.estimate(QuantityKey::deformation(Location::Left), 0.5),
        Estimate::Interpolated(15.0)
    );

    // the synthesized profile at the 0.5 station agrees
    let out = synthesize(&readings, &single_wall(8, 2), Mode::AngularSector, &cal).unwrap();
    let idx = out.stations.iter().position(|&p| p == 0.5).unwrap();
    assert_eq!(out.profiles[idx].left, 15.0);
}

#[test]
fn repeated_calls_are_bit_identical() {
    let readings = logged_readings();
    let geometry = GeometryParameters::default();
    let cal = Calibration::default();
    for mode in [Mode::AngularSector, Mode::InverseDistanceHazard] {
        let a = synthesize(&readings, &geometry, mode, &cal).unwrap();
        let b = synthesize(&readings, &geometry, mode, &cal).unwrap();
        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(a.mesh.flat_vertices()), bits(b.mesh.flat_vertices()));
        assert_eq!(bits(a.mesh.flat_colors()), bits(b.mesh.flat_colors()));
        assert_eq!(a.mesh.flat_indices(), b.mesh.flat_indices());
    }
}

#[test]
fn concurrent_calls_are_independent() {
    let readings = logged_readings();
    let geometry = GeometryParameters::default();
    let cal = Calibration::default();
    let reference = synthesize(&readings, &geometry, Mode::InverseDistanceHazard, &cal).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    synthesize(&readings, &geometry, Mode::InverseDistanceHazard, &cal).unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), reference);
        }
    });
}

#[test]
fn input_batch_is_not_mutated() {
    let readings = logged_readings();
    let before = readings.clone();
    synthesize(
        &readings,
        &GeometryParameters::default(),
        Mode::InverseDistanceHazard,
        &Calibration::default(),
    )
    .unwrap();
    assert_eq!(readings, before);
}

#[test]
fn topology_closes_for_many_segment_counts() {
    let readings = logged_readings().normalized_for_display(0.5, &Calibration::default());
    for segments in 3..=40 {
        for wall in [0.0, 0.1] {
            let geometry = GeometryParameters {
                wall_thickness: wall,
                angular_segments: segments,
                longitudinal_sections: 4,
                ..GeometryParameters::default()
            };
            let out = synthesize(
                &readings,
                &geometry,
                Mode::AngularSector,
                &Calibration::default(),
            )
            .unwrap();
            let mesh = &out.mesh;
            assert!(mesh.is_well_formed(), "segments={segments} wall={wall}");

            let walls = if wall > 0.0 { 2 } else { 1 };
            assert_eq!(
                mesh.vertex_count(),
                out.stations.len() * segments * walls,
                "segments={segments} wall={wall}"
            );
            assert_eq!(
                mesh.triangle_count(),
                (out.stations.len() - 1) * segments * 2 * walls,
                "segments={segments} wall={wall}"
            );

            // the last quad of the first ring reaches back to segment 0
            let last = (segments - 1) * 2 * walls;
            assert_eq!(mesh.indices()[last][1], 0, "segments={segments} wall={wall}");
        }
    }
}

#[test]
fn logged_sample_synthesizes_in_both_modes() {
    let cal = Calibration::default();
    let readings = logged_readings().normalized_for_display(0.5, &cal);
    let geometry = GeometryParameters {
        length: 12.0,
        ..GeometryParameters::default()
    };

    let angular = synthesize(&readings, &geometry, Mode::AngularSector, &cal).unwrap();
    assert!(angular.sensors.is_none());
    // the thermometer clamps to 20 °C, so every ring is pure blue
    assert!(angular.mesh.colors().iter().all(|c| *c == [0.0, 0.0, 1.0]));
    assert!((angular.stations[0] - 1.0 / 12.0).abs() < 1e-12);

    let raw = logged_readings();
    let hazard = synthesize(&raw, &geometry, Mode::InverseDistanceHazard, &cal).unwrap();
    let sensors = hazard.sensors.expect("hazard mode reports sensors");
    assert_eq!(sensors.len(), raw.len());
    let status_of = |id: &str| sensors.iter().find(|s| s.id == id).unwrap().status;
    assert_eq!(status_of("T3_L_3"), Status::Critical);
    assert_eq!(status_of("T2_K_3"), Status::Critical);
    assert_eq!(status_of("T3_K_2"), Status::Warning);
    assert_eq!(status_of("T3_Up_2"), Status::Normal);
    assert!(hazard.mesh.is_well_formed());
    assert_eq!(hazard.mesh.vertex_count(), angular.mesh.vertex_count());
}

#[test]
fn forecast_frame_renders_like_observed_frame() {
    // a forecast frame is just another reading batch with the same ids
    let observed = ReadingSet::new(vec![
        SensorReading::deformation("T3_R_1", Location::Right, 0.2, 0.1),
        SensorReading::temperature("T_3", 0.5, 40.0),
    ]);
    let forecast: ReadingSet = observed
        .readings()
        .iter()
        .cloned()
        .map(|mut r| {
            r.value *= 1.5;
            r
        })
        .collect();
    let geometry = GeometryParameters::default();
    let cal = Calibration::default();
    let a = synthesize(&observed, &geometry, Mode::AngularSector, &cal).unwrap();
    let b = synthesize(&forecast, &geometry, Mode::AngularSector, &cal).unwrap();
    assert_eq!(a.stations, b.stations);
    assert_eq!(a.mesh.indices(), b.mesh.indices());
    assert_ne!(a.mesh.colors(), b.mesh.colors());
}

#[test]
fn single_station_batch_emits_one_ring() {
    let readings = ReadingSet::new(vec![SensorReading::deformation(
        "U",
        Location::Upper,
        0.4,
        0.2,
    )]);
    let out = synthesize(
        &readings,
        &single_wall(16, 10),
        Mode::AngularSector,
        &Calibration::default(),
    )
    .unwrap();
    assert_eq!(out.stations, vec![0.4]);
    assert_eq!(out.mesh.vertex_count(), 16);
    assert_eq!(out.mesh.triangle_count(), 0);
    // θ = 0 vertex bulges by the upper deformation
    assert!((out.mesh.vertices()[0][0] - 1.2).abs() < 1e-12);
    assert!((out.mesh.vertices()[0][2] - 4.0).abs() < 1e-12);
}
