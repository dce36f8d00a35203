//! Orbiting 3D view of the synthesized shell, painted with egui.
//!
//! The projection is orthographic. egui has no depth buffer, so triangles are
//! handed to the painter sorted back to front.

use std::f32::consts::FRAC_PI_2;

use egui::epaint::{Vertex, WHITE_UV};
use egui::{Color32, Mesh, Pos2, Rect, Sense, Shape, Stroke};
use pipe_core::{GeometryParameters, Status, Synthesis};

use crate::ui::status_color;

/// Light direction in view space, towards the viewer and slightly above.
const LIGHT: [f32; 3] = [-0.28, 0.48, -0.83];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    /// Rotation about the vertical screen axis (radians).
    pub yaw: f32,
    /// Rotation about the horizontal screen axis (radians).
    pub pitch: f32,
    pub zoom: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            yaw: 0.5,
            pitch: 0.3,
            zoom: 1.0,
        }
    }
}

impl OrbitCamera {
    /// Rotate a world direction into view space.
    ///
    /// View x runs along the pipe axis, view y is up (the θ = 0 side of the
    /// pipe before rotation) and view z points away from the viewer.
    pub fn rotate(&self, v: [f32; 3]) -> [f32; 3] {
        let (x, y, z) = (v[2], v[0], v[1]);
        let (sy, cy) = self.yaw.sin_cos();
        let x1 = x * cy - z * sy;
        let z1 = x * sy + z * cy;
        let (sp, cp) = self.pitch.sin_cos();
        let y2 = y * cp - z1 * sp;
        let z2 = y * sp + z1 * cp;
        [x1, y2, z2]
    }

    /// World point to view space, orbiting around `centre`.
    pub fn to_view(&self, p: [f64; 3], centre: [f64; 3]) -> [f32; 3] {
        self.rotate([
            (p[0] - centre[0]) as f32,
            (p[1] - centre[1]) as f32,
            (p[2] - centre[2]) as f32,
        ])
    }

    pub fn orbit(&mut self, delta: egui::Vec2) {
        self.yaw += delta.x * 0.01;
        self.pitch = (self.pitch + delta.y * 0.01).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    pub fn zoom_by(&mut self, scroll: f32) {
        self.zoom = (self.zoom * (1.0 + scroll * 0.002)).clamp(0.2, 10.0);
    }
}

/// A gauge anchor drawn over the shell.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: String,
    pub anchor: [f64; 3],
    pub status: Status,
}

/// Screen mapping for one frame.
struct Projection {
    camera: OrbitCamera,
    centre: [f64; 3],
    origin: Pos2,
    scale: f32,
}

impl Projection {
    fn new(camera: OrbitCamera, geometry: &GeometryParameters, rect: Rect) -> Self {
        let span = geometry.length.max(2.0 * geometry.radius) as f32 * 1.15;
        let scale = camera.zoom * (rect.width() / span).min(rect.height() / (4.0 * geometry.radius as f32));
        Self {
            camera,
            centre: [0.0, 0.0, geometry.length / 2.0],
            origin: rect.center(),
            scale,
        }
    }

    fn screen(&self, view: [f32; 3]) -> Pos2 {
        self.origin + egui::vec2(view[0] * self.scale, -view[1] * self.scale)
    }
}

/// Flattened triangle indices ordered farthest first.
pub fn back_to_front(indices: &[[u32; 3]], view: &[[f32; 3]]) -> Vec<u32> {
    let depth = |t: &[u32; 3]| t.iter().map(|&i| view[i as usize][2]).sum::<f32>();
    let mut sorted = indices.to_vec();
    sorted.sort_by(|a, b| depth(b).total_cmp(&depth(a)));
    sorted.into_iter().flatten().collect()
}

fn shade(normal: [f32; 3]) -> f32 {
    let lambert = normal[0] * LIGHT[0] + normal[1] * LIGHT[1] + normal[2] * LIGHT[2];
    0.35 + 0.65 * lambert.max(0.0)
}

fn to_color32(rgb: [f64; 3], shade: f32) -> Color32 {
    let channel = |c: f64| (c.clamp(0.0, 1.0) as f32 * shade * 255.0).round() as u8;
    Color32::from_rgb(channel(rgb[0]), channel(rgb[1]), channel(rgb[2]))
}

fn paint_shell(painter: &egui::Painter, synthesis: &Synthesis, projection: &Projection) {
    let mesh = &synthesis.mesh;
    let view: Vec<[f32; 3]> = mesh
        .vertices()
        .iter()
        .map(|&v| projection.camera.to_view(v, projection.centre))
        .collect();

    let vertices = view
        .iter()
        .zip(mesh.normals())
        .zip(mesh.colors())
        .map(|((&v, n), &c)| {
            let n = projection.camera.rotate([n[0] as f32, n[1] as f32, n[2] as f32]);
            Vertex {
                pos: projection.screen(v),
                uv: WHITE_UV,
                color: to_color32(c, shade(n)),
            }
        })
        .collect();
    painter.add(Shape::mesh(Mesh {
        indices: back_to_front(mesh.indices(), &view),
        vertices,
        ..Default::default()
    }));
}

fn paint_markers(painter: &egui::Painter, markers: &[Marker], projection: &Projection) {
    for marker in markers {
        let view = projection.camera.to_view(marker.anchor, projection.centre);
        let pos = projection.screen(view);
        painter.circle(
            pos,
            5.0,
            status_color(marker.status),
            Stroke::new(1.0, Color32::BLACK),
        );
        painter.text(
            pos + egui::vec2(7.0, -7.0),
            egui::Align2::LEFT_BOTTOM,
            &marker.id,
            egui::FontId::proportional(11.0),
            Color32::LIGHT_GRAY,
        );
    }
}

/// Draw the shell in the central panel. Drag to orbit, scroll to zoom.
pub fn draw_mesh(
    ctx: &egui::Context,
    synthesis: Option<&Synthesis>,
    geometry: &GeometryParameters,
    markers: &[Marker],
    camera: &mut OrbitCamera,
) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Pipe Shell");

        let Some(synthesis) = synthesis else {
            ui.label("No mesh synthesized yet.");
            return;
        };

        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::drag());
        if response.dragged() {
            camera.orbit(response.drag_delta());
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                camera.zoom_by(scroll);
            }
        }

        let projection = Projection::new(*camera, geometry, response.rect);
        paint_shell(&painter, synthesis, &projection);
        paint_markers(&painter, markers, &projection);
    });
}
