//! Triangulated pipe shell.
//!
//! Vertex layout, for ring `i` and segment `j` of `S`:
//!
//! ```text
//! single wall:  index = i·S + j
//! double wall:  index = 2·(i·S + j)      outer
//!               index = 2·(i·S + j) + 1  inner
//! ```
//!
//! Normals are the flat radial directions `(cos θ, sin θ, 0)`, negated on
//! the inner wall. They ignore the slope the deformation introduces along
//! the axis; that is accepted for shading a pipe whose bulge is small
//! compared to its length.

use std::f64::consts::TAU;

use serde::Serialize;
use tracing::warn;

use crate::angular::RingProfile;
use crate::constants::Calibration;
use crate::hazard::HazardField;
use crate::GeometryParameters;

/// Colours one vertex. The two implementations are the two visualization
/// modes; the assembler is shared.
pub trait VertexColoring {
    fn vertex_color(&self, ring: &RingProfile, vertex: [f64; 3]) -> [f64; 3];
}

/// Per-ring temperature ramp.
pub struct TemperatureColoring {
    pub calibration: Calibration,
}

impl VertexColoring for TemperatureColoring {
    fn vertex_color(&self, ring: &RingProfile, _vertex: [f64; 3]) -> [f64; 3] {
        ring.color(&self.calibration)
    }
}

impl VertexColoring for HazardField<'_> {
    fn vertex_color(&self, _ring: &RingProfile, vertex: [f64; 3]) -> [f64; 3] {
        self.color(vertex)
    }
}

/// One ring of vertices: its axial coordinate and the field values there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ring {
    pub z: f64,
    pub profile: RingProfile,
}

/// Renderable buffers. `vertices`, `normals` and `colors` are parallel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshBuffers {
    vertices: Vec<[f64; 3]>,
    normals: Vec<[f64; 3]>,
    colors: Vec<[f64; 3]>,
    indices: Vec<[u32; 3]>,
}

impl MeshBuffers {
    pub fn vertices(&self) -> &[[f64; 3]] {
        &self.vertices
    }

    pub fn normals(&self) -> &[[f64; 3]] {
        &self.normals
    }

    pub fn colors(&self) -> &[[f64; 3]] {
        &self.colors
    }

    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// `x0 y0 z0 x1 y1 z1 …`
    pub fn flat_vertices(&self) -> &[f64] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn flat_normals(&self) -> &[f64] {
        bytemuck::cast_slice(&self.normals)
    }

    pub fn flat_colors(&self) -> &[f64] {
        bytemuck::cast_slice(&self.colors)
    }

    pub fn flat_indices(&self) -> &[u32] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Check the buffer invariants: parallel lengths, colour channels in
    /// `[0, 1]`, and triangles of three distinct in-range vertices.
    pub fn is_well_formed(&self) -> bool {
        let n = self.vertices.len();
        self.normals.len() == n
            && self.colors.len() == n
            && self
                .colors
                .iter()
                .flatten()
                .all(|c| (0.0..=1.0).contains(c))
            && self.indices.iter().all(|t| {
                t.iter().all(|&i| (i as usize) < n) && t[0] != t[1] && t[1] != t[2] && t[0] != t[2]
            })
    }
}

/// Build the shell for `rings` (sorted along the axis).
///
/// The caller guarantees `geometry` is valid and that the vertex count fits
/// in `u32`.
pub fn assemble(
    rings: &[Ring],
    geometry: &GeometryParameters,
    coloring: &dyn VertexColoring,
) -> MeshBuffers {
    let segments = geometry.angular_segments;
    let double_wall = geometry.is_double_walled();
    let walls = if double_wall { 2 } else { 1 };
    let vertex_count = rings.len() * segments * walls;

    let mut vertices = Vec::with_capacity(vertex_count);
    let mut normals = Vec::with_capacity(vertex_count);
    let mut colors = Vec::with_capacity(vertex_count);

    let mut collapsed = 0usize;
    for ring in rings {
        for j in 0..segments {
            let theta = TAU * j as f64 / segments as f64;
            let (sin, cos) = theta.sin_cos();
            let outer_r = ring.profile.radius(geometry.radius, theta);

            let outer = [outer_r * cos, outer_r * sin, ring.z];
            vertices.push(outer);
            normals.push([cos, sin, 0.0]);
            colors.push(coloring.vertex_color(&ring.profile, outer));

            if double_wall {
                let inner_r = outer_r - geometry.wall_thickness;
                if inner_r <= 0.0 {
                    collapsed += 1;
                }
                let inner = [inner_r * cos, inner_r * sin, ring.z];
                vertices.push(inner);
                normals.push([-cos, -sin, 0.0]);
                colors.push(coloring.vertex_color(&ring.profile, inner));
            }
        }
    }
    if collapsed > 0 {
        warn!("{collapsed} inner-wall vertices have a non-positive radius; deformation exceeds the wall clearance");
    }

    let index = |ring: usize, segment: usize, wall: usize| -> u32 {
        ((ring * segments + segment % segments) * walls + wall) as u32
    };

    let quads = rings.len().saturating_sub(1) * segments;
    let mut indices = Vec::with_capacity(quads * 2 * walls);
    for i in 0..rings.len().saturating_sub(1) {
        for j in 0..segments {
            let (i0, i1, i2, i3) = (
                index(i, j, 0),
                index(i, j + 1, 0),
                index(i + 1, j + 1, 0),
                index(i + 1, j, 0),
            );
            indices.push([i0, i1, i2]);
            indices.push([i0, i2, i3]);

            if double_wall {
                let (k0, k1, k2, k3) = (
                    index(i, j, 1),
                    index(i, j + 1, 1),
                    index(i + 1, j + 1, 1),
                    index(i + 1, j, 1),
                );
                indices.push([k0, k2, k1]);
                indices.push([k0, k3, k2]);
            }
        }
    }

    MeshBuffers {
        vertices,
        normals,
        colors,
        indices,
    }
}
