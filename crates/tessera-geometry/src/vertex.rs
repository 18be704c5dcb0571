//! Vertex formats for assembled meshes.
//!
//! Both formats are `Pod` so meshes can be uploaded to a vertex buffer
//! without conversion.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// Vertex for filled geometry.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct FillVertex {
    /// Position in shape space
    pub position: [f32; 2],
    /// Winding number of the component the vertex was emitted for
    pub winding: i32,
    /// 1.0 on the component boundary, 0.0 inside
    pub boundary: f32,
}

impl FillVertex {
    /// Fill vertex flagged as on or off the component boundary.
    pub fn new(position: Vec2, winding: i32, on_boundary: bool) -> Self {
        Self {
            position: position.to_array(),
            winding,
            boundary: if on_boundary { 1.0 } else { 0.0 },
        }
    }
}

/// Vertex for stroked geometry.
///
/// Keeps the centre-line position and the unscaled offset next to the
/// expanded position, so a shader can re-expand for a different width.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct StrokeVertex {
    /// Expanded position, `center + radius * offset`
    pub position: [f32; 2],
    /// Position on the outline
    pub center: [f32; 2],
    /// Offset direction before scaling by the radius
    pub offset: [f32; 2],
}

impl StrokeVertex {
    /// Create a stroke vertex for the given radius.
    pub fn new(center: Vec2, offset: Vec2, radius: f32) -> Self {
        Self {
            position: (center + offset * radius).to_array(),
            center: center.to_array(),
            offset: offset.to_array(),
        }
    }
}

/// Triangle mesh produced by fill or stroke assembly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TessellatedMesh<V> {
    /// Vertices, shared between triangles of one component or stroke part
    pub vertices: Vec<V>,
    /// Counter-clockwise triangle list
    pub indices: Vec<u32>,
}

impl<V> TessellatedMesh<V> {
    /// Empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Wrap existing vertex and index buffers.
    pub fn from_data(vertices: Vec<V>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// True if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of indices.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append vertices and triangle indices local to them.
    pub fn append(&mut self, vertices: impl IntoIterator<Item = V>, indices: &[u32]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(vertices);
        self.indices.extend(indices.iter().map(|i| i + base));
    }

    /// Remove all vertices and triangles, keeping the allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }
}
