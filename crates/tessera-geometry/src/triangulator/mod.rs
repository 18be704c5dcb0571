//! Winding-aware triangulation of tessellated shapes.
//!
//! The tessellated outlines are turned into a planar arrangement (every
//! crossing becomes a vertex), its faces are ear-clipped and labelled with
//! their winding number, and the triangles are grouped per winding number.
//! Any fill rule can then be applied by choosing which groups to draw.
//!
//! All triangles index a single point table laid out as:
//!
//! | range                         | contents                                |
//! |-------------------------------|-----------------------------------------|
//! | `0..points.len()`             | tessellated outline points              |
//! | next 4                        | corners of the padded bounding box      |
//! | next `induced_points.len()`   | contour crossings                       |
//! | next `split_points.len()`     | points added by the split triangulation |

mod arrangement;
mod component;
mod ear_clip;
mod faces;

pub use component::{BoundaryEdge, FilledComponent};

use crate::{BoundingBox, CurvePoint, TessellatedShape};
use arrangement::{Arrangement, Contour};
use glam::{DVec2, Vec2};
use std::collections::BTreeMap;
use tessera_core::profiling::profile_function;

/// Relative tolerance for snapping crossings onto existing vertices.
const SNAP_TOLERANCE: f64 = 1e-9;

/// Identifies the contour an arrangement edge came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContourId {
    /// The outline with this index.
    Outline(usize),
    /// The padded bounding box.
    Bounding,
}

/// A tessellated outline point in the point table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangulationPoint {
    /// The tessellated point.
    pub point: CurvePoint,
    /// Outline the point belongs to.
    pub outline_id: usize,
    /// Edge the point was sampled on.
    pub edge_id: usize,
}

impl TriangulationPoint {
    /// Position of the point.
    pub fn position(&self) -> Vec2 {
        self.point.position
    }
}

/// A point defined as a convex combination of earlier points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InducedPoint {
    /// Resolved position.
    pub position: Vec2,
    sources: [(u32, f32); 4],
    source_count: u8,
}

impl InducedPoint {
    pub(crate) fn new(position: Vec2, sources: &[(u32, f32)]) -> Self {
        debug_assert!(!sources.is_empty() && sources.len() <= 4);
        let mut packed = [(0, 0.0); 4];
        packed[..sources.len()].copy_from_slice(sources);
        Self {
            position,
            sources: packed,
            source_count: sources.len() as u8,
        }
    }

    /// Point table indices and weights; the weights sum to one.
    pub fn sources(&self) -> &[(u32, f32)] {
        &self.sources[..self.source_count as usize]
    }
}

/// A point created by splitting an edge or a triangle.
pub type SplitPoint = InducedPoint;

/// Section of the point table an index falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    /// Tessellated outline point.
    Original,
    /// Bounding box corner.
    Unbounded,
    /// Contour crossing.
    Induced,
    /// Split triangulation point.
    Split,
}

/// Triangles of a shape grouped by winding number.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangulation {
    points: Vec<TriangulationPoint>,
    unbounded_points: [Vec2; 4],
    induced_points: Vec<InducedPoint>,
    split_points: Vec<SplitPoint>,
    components: BTreeMap<i32, FilledComponent>,
    winding_zero_bounded: Option<FilledComponent>,
    winding_zero_unbounded: FilledComponent,
}

impl Triangulation {
    /// Triangulate every outline of `shape`.
    ///
    /// Self-intersections and overlapping outlines are resolved, never
    /// rejected; zero-length edges are tolerated.
    pub fn build(shape: &TessellatedShape) -> Self {
        profile_function!();

        let mut points = Vec::new();
        let mut contours = Vec::new();
        for outline in shape.outlines() {
            let start = points.len() as u32;
            points.extend(outline.polygon().map(|point| TriangulationPoint {
                point: *point,
                outline_id: outline.outline_id(),
                edge_id: 0,
            }));
            // Attribute each point to the edge that produced it.
            let mut k = start as usize;
            for edge in outline.edges() {
                for _ in 1..edge.points().len() {
                    points[k].edge_id = edge.edge_id();
                    k += 1;
                }
            }
            let end = points.len() as u32;
            if end > start {
                contours.push(Contour {
                    id: ContourId::Outline(outline.outline_id()),
                    vertices: (start..end).collect(),
                });
            }
        }

        let unbounded_points = padded_box(&shape.bounds(), &points);
        let base = points.len() as u32;
        contours.push(Contour {
            id: ContourId::Bounding,
            vertices: vec![base, base + 1, base + 2, base + 3],
        });
        contours.push(Contour {
            id: ContourId::Bounding,
            vertices: vec![base, base + 3, base + 2, base + 1],
        });

        let positions: Vec<DVec2> = points
            .iter()
            .map(|p| p.position().as_dvec2())
            .chain(unbounded_points.iter().map(|p| p.as_dvec2()))
            .collect();
        let extent = (unbounded_points[2] - unbounded_points[0]).as_dvec2().length();
        let arrangement = Arrangement::build(positions, &contours, extent * SNAP_TOLERANCE);

        let triangles = faces::triangulate(&arrangement);
        let split_base = arrangement.positions.len() as u32;
        let classified = component::classify(&arrangement, &triangles, split_base);

        let triangulation = Self {
            points,
            unbounded_points,
            induced_points: arrangement.induced,
            split_points: classified.split_points,
            components: classified.components,
            winding_zero_bounded: classified.winding_zero_bounded,
            winding_zero_unbounded: classified.winding_zero_unbounded,
        };
        tracing::debug!(
            "Triangulated {} points ({} induced, {} split) into {} triangles over windings {:?}",
            triangulation.points.len(),
            triangulation.induced_points.len(),
            triangulation.split_points.len(),
            triangulation.triangle_count(),
            triangulation.components.keys().collect::<Vec<_>>()
        );
        triangulation
    }

    /// Tessellated outline points.
    pub fn points(&self) -> &[TriangulationPoint] {
        &self.points
    }

    /// Corners of the padded bounding box, counter-clockwise.
    pub fn unbounded_points(&self) -> &[Vec2; 4] {
        &self.unbounded_points
    }

    /// Points created at contour crossings.
    pub fn induced_points(&self) -> &[InducedPoint] {
        &self.induced_points
    }

    /// Points created by the split triangulation.
    pub fn split_points(&self) -> &[SplitPoint] {
        &self.split_points
    }

    /// Total size of the point table.
    pub fn point_count(&self) -> usize {
        self.points.len() + 4 + self.induced_points.len() + self.split_points.len()
    }

    /// Section of the point table `index` belongs to.
    ///
    /// # Panics
    /// If `index` is outside the point table.
    pub fn point_kind(&self, index: u32) -> PointKind {
        let mut i = index as usize;
        if i < self.points.len() {
            return PointKind::Original;
        }
        i -= self.points.len();
        if i < 4 {
            return PointKind::Unbounded;
        }
        i -= 4;
        if i < self.induced_points.len() {
            return PointKind::Induced;
        }
        i -= self.induced_points.len();
        assert!(
            i < self.split_points.len(),
            "point index {} out of range ({} points)",
            index,
            self.point_count()
        );
        PointKind::Split
    }

    /// Position of a point table entry.
    ///
    /// # Panics
    /// If `index` is outside the point table.
    pub fn position(&self, index: u32) -> Vec2 {
        let mut i = index as usize;
        if i < self.points.len() {
            return self.points[i].position();
        }
        i -= self.points.len();
        if i < 4 {
            return self.unbounded_points[i];
        }
        i -= 4;
        if i < self.induced_points.len() {
            return self.induced_points[i].position;
        }
        i -= self.induced_points.len();
        assert!(
            i < self.split_points.len(),
            "point index {} out of range ({} points)",
            index,
            self.point_count()
        );
        self.split_points[i].position
    }

    /// Positions of the whole point table, in index order.
    pub fn positions(&self) -> Vec<Vec2> {
        self.points
            .iter()
            .map(TriangulationPoint::position)
            .chain(self.unbounded_points.iter().copied())
            .chain(self.induced_points.iter().map(|p| p.position))
            .chain(self.split_points.iter().map(|p| p.position))
            .collect()
    }

    /// Components with a non-zero winding number.
    pub fn components(&self) -> &BTreeMap<i32, FilledComponent> {
        &self.components
    }

    /// Component with the given winding number.
    ///
    /// Winding zero refers to the bounded winding-zero region.
    pub fn component(&self, winding: i32) -> Option<&FilledComponent> {
        if winding == 0 {
            self.winding_zero_bounded.as_ref()
        } else {
            self.components.get(&winding)
        }
    }

    /// Winding-zero triangles enclosed by the shape (holes).
    pub fn winding_zero_bounded(&self) -> Option<&FilledComponent> {
        self.winding_zero_bounded.as_ref()
    }

    /// Winding-zero triangles between the shape and the bounding box.
    pub fn winding_zero_unbounded(&self) -> &FilledComponent {
        &self.winding_zero_unbounded
    }

    /// Every component, winding-zero ones first.
    pub fn all_components(&self) -> impl Iterator<Item = &FilledComponent> + '_ {
        std::iter::once(&self.winding_zero_unbounded)
            .chain(self.winding_zero_bounded.iter())
            .chain(self.components.values())
    }

    /// Total number of triangles over all components.
    pub fn triangle_count(&self) -> usize {
        self.all_components().map(FilledComponent::triangle_count).sum()
    }
}

fn padded_box(bounds: &BoundingBox, points: &[TriangulationPoint]) -> [Vec2; 4] {
    let bounds = if bounds.is_empty() {
        BoundingBox::from_points(points.iter().map(TriangulationPoint::position))
    } else {
        *bounds
    };
    if bounds.is_empty() {
        return BoundingBox::new(Vec2::splat(-1.0), Vec2::ONE).corners();
    }
    let size = bounds.size();
    let padding = size.x.max(size.y) * 0.125;
    let padding = if padding > 0.0 { padding } else { 1.0 };
    bounds.inflate(padding).corners()
}
