// Viewer window: owns the reading batch and re-synthesizes the pipe when a control changes.

use std::borrow::Cow;
use std::cell::Cell;

use egui_winit_vulkano::{Gui, GuiConfig};
use pipe_core::hazard::{anchor, sensor_summary};
use pipe_core::{
    synthesize, Calibration, GeometryParameters, Mode, ReadingSet, SensorInfo, SensorKind,
    Synthesis,
};
use tracing::{debug, error, warn};
use vulkano::sync::GpuFuture;
use winit::{
    application::ApplicationHandler, event::WindowEvent, event_loop::ActiveEventLoop,
    window::WindowId,
};

use crate::mesh_view::{self, Marker};
use crate::{plot_view, renderer::Renderer, ui, ui::UiState};

/// Everything the viewer needs to show one sampled instant.
#[derive(Debug, Clone)]
pub struct ViewerInput {
    pub readings: ReadingSet,
    pub geometry: GeometryParameters,
    pub mode: Mode,
    pub calibration: Calibration,
    /// Start with display normalization on, at this peak (× radius).
    pub max_deflection: Option<f64>,
}

pub struct App {
    renderer: Option<Renderer>,
    gui: Option<Gui>,
    readings: ReadingSet,
    calibration: Calibration,
    geometry: GeometryParameters,
    mode: Mode,
    ui_state: UiState,
    synthesis: Option<Synthesis>,
    sensors: Vec<SensorInfo>,
    markers: Vec<Marker>,
    last_error: Option<String>,
}

impl App {
    pub fn new(input: ViewerInput) -> Self {
        let mut ui_state = UiState::default();
        match input.max_deflection {
            Some(peak) => ui_state.max_deflection = peak,
            None => ui_state.normalize = false,
        }

        let mut app = Self {
            renderer: None,
            gui: None,
            readings: input.readings,
            calibration: input.calibration,
            geometry: input.geometry,
            mode: input.mode,
            ui_state,
            synthesis: None,
            sensors: Vec::new(),
            markers: Vec::new(),
            last_error: None,
        };
        app.resynthesize();
        app
    }

    /// Rebuild the mesh from the current parameters. On failure the previous
    /// mesh stays on screen and the error is shown in the control panel.
    fn resynthesize(&mut self) {
        let display = if self.ui_state.normalize {
            let peak = self.ui_state.max_deflection * self.geometry.radius;
            Cow::Owned(self.readings.normalized_for_display(peak, &self.calibration))
        } else {
            Cow::Borrowed(&self.readings)
        };

        // status always reflects raw gauge values
        self.sensors = sensor_summary(
            &self.readings,
            self.geometry.critical_threshold,
            &self.calibration,
        );
        self.markers = self
            .readings
            .readings()
            .iter()
            .zip(&self.sensors)
            .filter(|(r, _)| r.kind != SensorKind::Temperature)
            .map(|(r, info)| Marker {
                id: r.id.clone(),
                anchor: anchor(r, &self.geometry),
                status: info.status,
            })
            .collect();

        match synthesize(&display, &self.geometry, self.mode, &self.calibration) {
            Ok(synthesis) => {
                debug!(
                    "Viewer mesh rebuilt: {} vertices",
                    synthesis.mesh.vertex_count()
                );
                self.synthesis = Some(synthesis);
                self.last_error = None;
            }
            Err(e) => {
                warn!("Synthesis failed: {e}");
                self.last_error = Some(e.to_string());
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        let renderer = match Renderer::new(event_loop) {
            Ok(r) => r,
            Err(e) => {
                error!("{e}");
                event_loop.exit();
                return;
            }
        };

        let gui = Gui::new(
            event_loop,
            renderer.surface.clone(),
            renderer.queue.clone(),
            renderer.swapchain_format(),
            GuiConfig {
                is_overlay: false,
                ..Default::default()
            },
        );

        // Request the very first frame.
        renderer.window.request_redraw();
        self.renderer = Some(renderer);
        self.gui = Some(gui);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gui) = self.gui.as_mut() {
            gui.update(&event);
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(_) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.recreate_swapchain = true;
                }
            }
            WindowEvent::RedrawRequested => {
                self.render_frame();
                return;
            }
            _ => {}
        }

        // Any input / resize event means egui state may have changed.
        if let Some(renderer) = self.renderer.as_ref() {
            renderer.window.request_redraw();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Only repaint in response to window events so the loop sleeps when idle.
    }
}

impl App {
    fn render_frame(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        let Some((image_index, acquire_future)) = renderer.begin_frame() else {
            return;
        };
        let before_future = renderer.take_previous_frame_end().join(acquire_future);

        let changed = Cell::new(false);
        {
            let Some(gui) = self.gui.as_mut() else {
                return;
            };
            let geometry = &mut self.geometry;
            let mode = &mut self.mode;
            let ui_state = &mut self.ui_state;
            let synthesis = self.synthesis.as_ref();
            let sensors = &self.sensors;
            let markers = &self.markers;
            let last_error = self.last_error.as_deref();

            gui.immediate_ui(|gui| {
                let ctx = gui.context();
                let c = ui::draw_controls(&ctx, geometry, mode, ui_state, sensors, last_error);
                plot_view::draw_profile_plot(&ctx, synthesis, geometry.length);
                mesh_view::draw_mesh(&ctx, synthesis, geometry, markers, &mut ui_state.camera);
                changed.set(c);
            });
        }

        if changed.get() {
            self.resynthesize();
            // The views were drawn from the old mesh; show the new one right away.
            if let Some(r) = self.renderer.as_ref() {
                r.window.request_redraw();
            }
        }

        let Some(renderer) = self.renderer.as_ref() else {
            return;
        };
        let image_view = renderer.image_views[image_index as usize].clone();
        let Some(gui) = self.gui.as_mut() else {
            return;
        };
        let after_future = gui.draw_on_image(before_future, image_view);

        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        let final_future = renderer.present(after_future, image_index);
        renderer.end_frame(final_future);
    }
}
