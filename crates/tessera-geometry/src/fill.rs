//! Fill rules and fill mesh assembly.
//!
//! A fill rule decides, from a winding number alone, whether a region is
//! inside the shape. The triangulation already groups triangles by winding
//! number, so filling is a matter of selecting components.

use crate::{FillVertex, FilledComponent, TessellatedMesh, Triangulation};
use std::fmt;
use std::sync::Arc;
use tessera_core::alloc::{HashMap, HashSet};
use tessera_core::profiling::profile_function;

/// Predicate deciding which winding numbers are filled.
#[derive(Clone, Default)]
pub enum FillRule {
    /// Filled where the winding number is non-zero.
    #[default]
    NonZero,
    /// Filled where the winding number is odd.
    OddEven,
    /// Filled where at least two contours overlap, `|w| >= 2`.
    AtLeastTwo,
    /// Filled where the winding number is positive.
    Positive,
    /// Filled where the winding number is negative.
    Negative,
    /// User predicate.
    Custom(Arc<dyn Fn(i32) -> bool + Send + Sync>),
}

impl FillRule {
    /// Wrap a closure as a fill rule.
    pub fn custom(f: impl Fn(i32) -> bool + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// True if regions with `winding` are filled.
    pub fn is_filled(&self, winding: i32) -> bool {
        match self {
            FillRule::NonZero => winding != 0,
            FillRule::OddEven => winding % 2 != 0,
            FillRule::AtLeastTwo => winding.unsigned_abs() >= 2,
            FillRule::Positive => winding > 0,
            FillRule::Negative => winding < 0,
            FillRule::Custom(f) => f(winding),
        }
    }
}

impl fmt::Debug for FillRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillRule::NonZero => f.write_str("NonZero"),
            FillRule::OddEven => f.write_str("OddEven"),
            FillRule::AtLeastTwo => f.write_str("AtLeastTwo"),
            FillRule::Positive => f.write_str("Positive"),
            FillRule::Negative => f.write_str("Negative"),
            FillRule::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Components of `triangulation` selected by `rule`.
///
/// Winding-zero components are included when the rule accepts zero.
pub fn filled_components<'a>(
    triangulation: &'a Triangulation,
    rule: &'a FillRule,
) -> impl Iterator<Item = &'a FilledComponent> + 'a {
    triangulation
        .all_components()
        .filter(move |component| rule.is_filled(component.winding()))
}

/// Assemble the fill mesh for `rule`.
///
/// With `anti_aliased` the split triangulation is used, so no triangle has
/// all three corners on the boundary and the per-vertex boundary flag can be
/// interpolated into a fringe.
pub fn fill_mesh(
    triangulation: &Triangulation,
    rule: &FillRule,
    anti_aliased: bool,
) -> TessellatedMesh<FillVertex> {
    profile_function!();

    let mut mesh = TessellatedMesh::new();
    for component in filled_components(triangulation, rule) {
        let boundary: HashSet<u32> = component
            .boundary_edges()
            .iter()
            .flat_map(|e| [e.start, e.end])
            .collect();
        let source = if anti_aliased {
            component.split_indices()
        } else {
            component.indices()
        };

        // Vertices are shared within a component, never across components.
        let mut remap: HashMap<u32, u32> = HashMap::new();
        let mut vertices = Vec::new();
        let mut indices = Vec::with_capacity(source.len());
        for &index in source {
            let local = *remap.entry(index).or_insert_with(|| {
                vertices.push(FillVertex::new(
                    triangulation.position(index),
                    component.winding(),
                    boundary.contains(&index),
                ));
                (vertices.len() - 1) as u32
            });
            indices.push(local);
        }
        mesh.append(vertices, &indices);
    }

    tracing::debug!(
        "Fill mesh ({:?}, anti-aliased: {}): {} vertices, {} triangles",
        rule,
        anti_aliased,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    mesh
}
