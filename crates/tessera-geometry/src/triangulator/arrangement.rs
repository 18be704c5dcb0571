//! Planar arrangement of the shape's contours.
//!
//! Contour segments are intersected pairwise and split at every crossing and
//! touching vertex, so the resulting edges only meet at shared endpoints. Each
//! undirected edge records how many contours cross it in each direction.

use super::{ContourId, InducedPoint};
use glam::DVec2;
use std::collections::BTreeMap;
use tessera_core::alloc::HashMap;

/// A closed loop of point table indices.
pub(super) struct Contour {
    pub id: ContourId,
    pub vertices: Vec<u32>,
}

/// Undirected arrangement edge.
#[derive(Debug, Clone, Default)]
pub(super) struct EdgeInfo {
    /// Net number of contour crossings in the `min → max` direction.
    pub count: i32,
    /// Contours that contributed to this edge, in first-seen order.
    pub contours: Vec<ContourId>,
}

impl EdgeInfo {
    pub fn touches_bounding_box(&self) -> bool {
        self.contours.contains(&ContourId::Bounding)
    }
}

pub(super) struct Arrangement {
    /// Positions of every point table entry so far (original, unbounded, induced).
    pub positions: Vec<DVec2>,
    pub induced: Vec<InducedPoint>,
    /// Keyed by `(min, max)` vertex pair.
    pub edges: BTreeMap<(u32, u32), EdgeInfo>,
    pub tolerance: f64,
}

#[cfg(test)]
impl Arrangement {
    /// Net directed crossing count of `from → to`.
    pub fn directed_count(&self, from: u32, to: u32) -> i32 {
        let key = edge_key(from, to);
        let count = self.edges.get(&key).map_or(0, |e| e.count);
        if from < to { count } else { -count }
    }
}

pub(super) fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}

struct Segment {
    a: u32,
    b: u32,
    contour: ContourId,
    min: DVec2,
    max: DVec2,
}

struct Intersector {
    positions: Vec<DVec2>,
    induced: Vec<InducedPoint>,
    induced_base: u32,
    grid: HashMap<(i64, i64), Vec<u32>>,
    cell: f64,
    tolerance: f64,
    splits: Vec<Vec<(f64, u32)>>,
}

impl Intersector {
    fn cell_of(&self, p: DVec2) -> (i64, i64) {
        ((p.x / self.cell).floor() as i64, (p.y / self.cell).floor() as i64)
    }

    fn register(&mut self, id: u32) {
        let cell = self.cell_of(self.positions[id as usize]);
        self.grid.entry(cell).or_default().push(id);
    }

    fn find_near(&self, p: DVec2) -> Option<u32> {
        let (cx, cy) = self.cell_of(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(ids) = self.grid.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &id in ids {
                    if self.positions[id as usize].distance(p) <= self.tolerance {
                        return Some(id);
                    }
                }
            }
        }
        None
    }

    /// Parameter of `p` along `seg` if it touches the segment's interior.
    fn touch_parameter(&self, seg: &Segment, p: u32) -> Option<f64> {
        let a = self.positions[seg.a as usize];
        let d = self.positions[seg.b as usize] - a;
        let length = d.length();
        let w = self.positions[p as usize] - a;
        let t = w.dot(d) / (length * length);
        if t * length <= self.tolerance || (1.0 - t) * length <= self.tolerance {
            return None;
        }
        if (w.perp_dot(d) / length).abs() > self.tolerance {
            return None;
        }
        Some(t)
    }

    fn intersect(&mut self, segments: &[Segment], i: usize, j: usize) {
        for (target, other) in [(i, j), (j, i)] {
            let seg = &segments[target];
            for p in [segments[other].a, segments[other].b] {
                if p == seg.a || p == seg.b {
                    continue;
                }
                if let Some(t) = self.touch_parameter(seg, p) {
                    self.splits[target].push((t, p));
                }
            }
        }

        let (s1, s2) = (&segments[i], &segments[j]);
        if s1.a == s2.a || s1.a == s2.b || s1.b == s2.a || s1.b == s2.b {
            return;
        }

        let a1 = self.positions[s1.a as usize];
        let a2 = self.positions[s2.a as usize];
        let d1 = self.positions[s1.b as usize] - a1;
        let d2 = self.positions[s2.b as usize] - a2;
        let (l1, l2) = (d1.length(), d2.length());
        let denom = d1.perp_dot(d2);
        if denom.abs() <= 1e-12 * l1 * l2 {
            return;
        }

        let w = a2 - a1;
        let s = w.perp_dot(d2) / denom;
        let u = w.perp_dot(d1) / denom;
        let tol = self.tolerance;
        if s * l1 <= tol || (1.0 - s) * l1 <= tol || u * l2 <= tol || (1.0 - u) * l2 <= tol {
            return;
        }

        let position = a1 + d1 * s;
        let id = match self.find_near(position) {
            Some(id) => id,
            None => {
                let id = self.induced_base + self.induced.len() as u32;
                self.induced.push(InducedPoint::new(
                    position.as_vec2(),
                    &[
                        (s1.a, ((1.0 - s) * 0.5) as f32),
                        (s1.b, (s * 0.5) as f32),
                        (s2.a, ((1.0 - u) * 0.5) as f32),
                        (s2.b, (u * 0.5) as f32),
                    ],
                ));
                self.positions.push(position);
                self.register(id);
                id
            }
        };
        self.splits[i].push((s, id));
        self.splits[j].push((u, id));
    }
}

impl Arrangement {
    /// Build the arrangement of `contours` over the point table `positions`.
    ///
    /// Points at bit-identical positions are merged onto the first index;
    /// crossings closer than `tolerance` to an existing vertex reuse it.
    pub fn build(positions: Vec<DVec2>, contours: &[Contour], tolerance: f64) -> Self {
        let table_len = positions.len() as u32;

        let mut canonical: Vec<u32> = (0..table_len).collect();
        let mut seen: HashMap<(u64, u64), u32> = HashMap::new();
        for (i, p) in positions.iter().enumerate() {
            // Adding zero folds -0.0 into 0.0.
            let key = ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits());
            canonical[i] = *seen.entry(key).or_insert(i as u32);
        }

        let mut segments = Vec::new();
        for contour in contours {
            let n = contour.vertices.len();
            if n < 2 {
                continue;
            }
            for k in 0..n {
                let a = canonical[contour.vertices[k] as usize];
                let b = canonical[contour.vertices[(k + 1) % n] as usize];
                if a == b {
                    continue;
                }
                let (pa, pb) = (positions[a as usize], positions[b as usize]);
                segments.push(Segment {
                    a,
                    b,
                    contour: contour.id,
                    min: pa.min(pb),
                    max: pa.max(pb),
                });
            }
        }

        let mut intersector = Intersector {
            positions,
            induced: Vec::new(),
            induced_base: table_len,
            grid: HashMap::new(),
            cell: tolerance * 4.0,
            tolerance,
            splits: vec![Vec::new(); segments.len()],
        };
        for id in 0..table_len {
            if canonical[id as usize] == id {
                intersector.register(id);
            }
        }

        let mut order: Vec<usize> = (0..segments.len()).collect();
        order.sort_by(|&i, &j| segments[i].min.x.total_cmp(&segments[j].min.x));
        for (k, &i) in order.iter().enumerate() {
            for &j in &order[k + 1..] {
                if segments[j].min.x > segments[i].max.x + tolerance {
                    break;
                }
                if segments[j].min.y > segments[i].max.y + tolerance
                    || segments[j].max.y < segments[i].min.y - tolerance
                {
                    continue;
                }
                intersector.intersect(&segments, i, j);
            }
        }

        let mut edges: BTreeMap<(u32, u32), EdgeInfo> = BTreeMap::new();
        for (segment, mut splits) in segments.iter().zip(intersector.splits) {
            splits.sort_by(|x, y| x.0.total_cmp(&y.0));
            let mut prev = segment.a;
            for v in splits.iter().map(|&(_, v)| v).chain(std::iter::once(segment.b)) {
                if v == prev {
                    continue;
                }
                let info = edges.entry(edge_key(prev, v)).or_default();
                info.count += if prev < v { 1 } else { -1 };
                if !info.contours.contains(&segment.contour) {
                    info.contours.push(segment.contour);
                }
                prev = v;
            }
        }

        tracing::trace!(
            "Arrangement: {} segments, {} induced points, {} edges",
            segments.len(),
            intersector.induced.len(),
            edges.len()
        );

        Self {
            positions: intersector.positions,
            induced: intersector.induced,
            edges,
            tolerance,
        }
    }
}
