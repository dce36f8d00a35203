// egui control panel: geometry sliders, colouring mode, sensor table.

use egui::Color32;
use pipe_core::{GeometryParameters, Mode, SensorInfo, Status};

use crate::mesh_view::OrbitCamera;

/// Extra UI-only state that doesn't belong in GeometryParameters.
pub struct UiState {
    pub camera: OrbitCamera,
    /// Rescale deformations for display before synthesis.
    pub normalize: bool,
    /// Peak deformation after rescaling, in radius units.
    pub max_deflection: f64,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            camera: OrbitCamera::default(),
            normalize: true,
            max_deflection: 0.3,
        }
    }
}

pub fn status_color(status: Status) -> Color32 {
    match status {
        Status::Normal => Color32::from_rgb(60, 200, 90),
        Status::Warning => Color32::from_rgb(240, 200, 40),
        Status::Critical => Color32::from_rgb(230, 50, 40),
    }
}

/// Draw the right-side control panel. Returns `true` if anything changed
/// that requires the mesh to be synthesized again.
pub fn draw_controls(
    ctx: &egui::Context,
    geometry: &mut GeometryParameters,
    mode: &mut Mode,
    ui_state: &mut UiState,
    sensors: &[SensorInfo],
    last_error: Option<&str>,
) -> bool {
    let mut changed = false;

    egui::SidePanel::right("controls")
        .min_width(280.0)
        .show(ctx, |ui| {
            ui.heading("Pipe Geometry");
            ui.separator();

            ui.label("Length (m)");
            changed |= ui
                .add(egui::Slider::new(&mut geometry.length, 1.0..=50.0))
                .changed();

            ui.label("Radius (m)");
            changed |= ui
                .add(egui::Slider::new(&mut geometry.radius, 0.1..=5.0))
                .changed();

            ui.label("Wall Thickness (m)");
            let max_wall = geometry.radius * 0.9;
            changed |= ui
                .add(egui::Slider::new(&mut geometry.wall_thickness, 0.0..=max_wall))
                .changed();

            ui.label("Angular Segments");
            changed |= ui
                .add(egui::Slider::new(&mut geometry.angular_segments, 3..=128))
                .changed();

            ui.label("Longitudinal Sections");
            changed |= ui
                .add(egui::Slider::new(&mut geometry.longitudinal_sections, 1..=100))
                .changed();

            ui.label("Critical Threshold");
            changed |= ui
                .add(egui::Slider::new(&mut geometry.critical_threshold, 10.0..=2000.0))
                .changed();

            ui.separator();

            // --- Colouring ---
            ui.label("Colouring");
            changed |= ui
                .radio_value(mode, Mode::AngularSector, "Temperature by ring")
                .changed();
            changed |= ui
                .radio_value(mode, Mode::InverseDistanceHazard, "Hazard by gauge distance")
                .changed();

            ui.separator();

            // --- Display ---
            changed |= ui
                .checkbox(&mut ui_state.normalize, "Normalize deformation")
                .changed();
            ui.add_enabled_ui(ui_state.normalize, |ui| {
                ui.label("Peak Deflection (× radius)");
                changed |= ui
                    .add(egui::Slider::new(&mut ui_state.max_deflection, 0.05..=0.9))
                    .changed();
            });
            if ui.button("Reset View").clicked() {
                ui_state.camera = OrbitCamera::default();
            }

            if let Some(err) = last_error {
                ui.separator();
                ui.colored_label(Color32::RED, err);
            }

            ui.separator();

            // --- Sensors ---
            ui.heading("Sensors");
            egui::ScrollArea::vertical().show(ui, |ui| {
                egui::Grid::new("sensor_table")
                    .striped(true)
                    .show(ui, |ui| {
                        for sensor in sensors {
                            ui.label(&sensor.id);
                            ui.label(&sensor.label);
                            ui.label(format!("{:.2}", sensor.latest_value));
                            ui.colored_label(
                                status_color(sensor.status),
                                format!("{:?}", sensor.status),
                            );
                            ui.end_row();
                        }
                    });
            });
        });

    changed
}
