//! Face extraction and winding propagation over the arrangement.

use super::arrangement::Arrangement;
use super::ear_clip;
use glam::DVec2;
use std::collections::VecDeque;
use tessera_core::alloc::HashMap;

/// Index of the face outside every contour.
const UNBOUNDED_FACE: usize = 0;

/// A triangle together with the winding number of the face it fills.
pub(super) struct WoundTriangle {
    pub vertices: [u32; 3],
    pub winding: i32,
}

struct HalfEdges {
    from: Vec<u32>,
    to: Vec<u32>,
    /// Net crossing count of each half-edge in its own direction.
    count: Vec<i32>,
    /// Outgoing half-edges per vertex, sorted counter-clockwise by angle.
    outgoing: Vec<Vec<usize>>,
    /// Position of each half-edge in its origin's `outgoing` list.
    slot: Vec<usize>,
}

impl HalfEdges {
    fn build(arr: &Arrangement) -> Self {
        let vertex_count = arr.positions.len();
        let edges = prune_dangling(arr, vertex_count);

        let mut from = Vec::with_capacity(edges.len() * 2);
        let mut to = Vec::with_capacity(edges.len() * 2);
        let mut count = Vec::with_capacity(edges.len() * 2);
        for &(a, b, c) in &edges {
            from.extend_from_slice(&[a, b]);
            to.extend_from_slice(&[b, a]);
            count.extend_from_slice(&[c, -c]);
        }

        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); vertex_count];
        for h in 0..from.len() {
            outgoing[from[h] as usize].push(h);
        }
        let angle = |h: usize| {
            let d = arr.positions[to[h] as usize] - arr.positions[from[h] as usize];
            d.y.atan2(d.x)
        };
        let mut slot = vec![0; from.len()];
        for list in &mut outgoing {
            list.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
            for (k, &h) in list.iter().enumerate() {
                slot[h] = k;
            }
        }

        Self {
            from,
            to,
            count,
            outgoing,
            slot,
        }
    }

    fn len(&self) -> usize {
        self.from.len()
    }

    /// Next half-edge around the face on the left of `h`.
    fn next(&self, h: usize) -> usize {
        let twin = h ^ 1;
        let list = &self.outgoing[self.to[h] as usize];
        let k = self.slot[twin];
        list[(k + list.len() - 1) % list.len()]
    }
}

/// Edges of the arrangement as `(min, max, count)`, without dangling trees.
///
/// A vertex of degree one always carries a zero-count edge (contours are
/// closed), so removing such edges never changes any winding number.
fn prune_dangling(arr: &Arrangement, vertex_count: usize) -> Vec<(u32, u32, i32)> {
    let edges: Vec<(u32, u32, i32)> = arr.edges.iter().map(|(&(a, b), e)| (a, b, e.count)).collect();
    let mut alive = vec![true; edges.len()];
    let mut incident: Vec<Vec<usize>> = vec![Vec::new(); vertex_count];
    let mut degree = vec![0usize; vertex_count];
    for (k, &(a, b, _)) in edges.iter().enumerate() {
        incident[a as usize].push(k);
        incident[b as usize].push(k);
        degree[a as usize] += 1;
        degree[b as usize] += 1;
    }

    let mut queue: Vec<usize> = (0..vertex_count).filter(|&v| degree[v] == 1).collect();
    while let Some(v) = queue.pop() {
        if degree[v] != 1 {
            continue;
        }
        let Some(&k) = incident[v].iter().find(|&&k| alive[k]) else {
            continue;
        };
        alive[k] = false;
        let (a, b, _) = edges[k];
        let other = (if a as usize == v { b } else { a }) as usize;
        degree[v] -= 1;
        degree[other] -= 1;
        if degree[other] == 1 {
            queue.push(other);
        }
    }

    edges
        .into_iter()
        .zip(alive)
        .filter_map(|(e, alive)| alive.then_some(e))
        .collect()
}

struct Cycle {
    half_edges: Vec<usize>,
    area: f64,
}

fn trace_cycles(he: &HalfEdges, positions: &[DVec2]) -> Vec<Cycle> {
    let mut visited = vec![false; he.len()];
    let mut cycles = Vec::new();
    for start in 0..he.len() {
        if visited[start] {
            continue;
        }
        let mut half_edges = Vec::new();
        let mut area = 0.0;
        let mut h = start;
        while !visited[h] {
            visited[h] = true;
            half_edges.push(h);
            let p = positions[he.from[h] as usize];
            let q = positions[he.to[h] as usize];
            area += p.perp_dot(q);
            h = he.next(h);
        }
        cycles.push(Cycle {
            half_edges,
            area: area * 0.5,
        });
    }
    cycles
}

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

/// Even-odd point-in-polygon test.
fn polygon_contains(polygon: &[DVec2], p: DVec2) -> bool {
    let mut inside = false;
    let n = polygon.len();
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Split a closed vertex walk at repeated vertices into simple rings.
///
/// Rings of fewer than three vertices are dropped.
fn simple_rings(walk: &[u32]) -> Vec<Vec<u32>> {
    let mut rings = Vec::new();
    let mut stack: Vec<u32> = Vec::with_capacity(walk.len());
    let mut depth: HashMap<u32, usize> = HashMap::new();
    for &v in walk {
        if let Some(at) = depth.get(&v).copied() {
            let mut ring = vec![v];
            for id in stack.drain(at + 1..) {
                depth.remove(&id);
                ring.push(id);
            }
            rings.push(ring);
        } else {
            depth.insert(v, stack.len());
            stack.push(v);
        }
    }
    rings.push(stack);
    rings.retain(|ring| ring.len() >= 3);
    rings
}

fn signed_area(positions: &[DVec2], ring: &[u32]) -> f64 {
    let n = ring.len();
    (0..n)
        .map(|i| positions[ring[i] as usize].perp_dot(positions[ring[(i + 1) % n] as usize]))
        .sum::<f64>()
        * 0.5
}

/// Index of the smallest outer ring enclosing `hole`, or of the largest ring
/// if none does.
fn containing_ring(positions: &[DVec2], outers: &[(f64, Vec<u32>)], hole: &[u32]) -> usize {
    let largest = (0..outers.len())
        .max_by(|&a, &b| outers[a].0.total_cmp(&outers[b].0))
        .unwrap_or(0);
    if outers.len() == 1 {
        return largest;
    }
    outers
        .iter()
        .enumerate()
        .filter(|(_, (_, outer))| {
            hole.iter().find(|id| !outer.contains(id)).is_some_and(|&sample| {
                let polygon: Vec<DVec2> = outer.iter().map(|&id| positions[id as usize]).collect();
                polygon_contains(&polygon, positions[sample as usize])
            })
        })
        .min_by(|(_, a), (_, b)| a.0.total_cmp(&b.0))
        .map_or(largest, |(k, _)| k)
}

struct Face {
    outer: usize,
    holes: Vec<usize>,
}

/// Split the arrangement into faces, compute their winding numbers and
/// ear-clip each bounded face.
pub(super) fn triangulate(arr: &Arrangement) -> Vec<WoundTriangle> {
    let he = HalfEdges::build(arr);
    let cycles = trace_cycles(&he, &arr.positions);
    let zero_area = arr.tolerance * arr.tolerance;

    let mut components = DisjointSet::new(arr.positions.len());
    for h in (0..he.len()).step_by(2) {
        components.union(he.from[h] as usize, he.to[h] as usize);
    }

    // Face 0 is unbounded; every positive cycle bounds a face of its own.
    let mut faces: Vec<Face> = vec![Face {
        outer: usize::MAX,
        holes: Vec::new(),
    }];
    let mut cycle_face: Vec<Option<usize>> = vec![None; cycles.len()];
    let mut positive: Vec<(usize, usize, Vec<DVec2>)> = Vec::new();
    for (c, cycle) in cycles.iter().enumerate() {
        if cycle.area > zero_area {
            cycle_face[c] = Some(faces.len());
            faces.push(Face {
                outer: c,
                holes: Vec::new(),
            });
            let root = components.find(he.from[cycle.half_edges[0]] as usize);
            let polygon = cycle
                .half_edges
                .iter()
                .map(|&h| arr.positions[he.from[h] as usize])
                .collect();
            positive.push((c, root, polygon));
        }
    }

    for (c, cycle) in cycles.iter().enumerate() {
        if cycle.area >= -zero_area {
            continue;
        }
        let vertex = he.from[cycle.half_edges[0]] as usize;
        let root = components.find(vertex);
        let sample = arr.positions[vertex];
        let container = positive
            .iter()
            .filter(|(_, r, polygon)| *r != root && polygon_contains(polygon, sample))
            .min_by(|a, b| cycles[a.0].area.total_cmp(&cycles[b.0].area))
            .map(|(p, _, _)| cycle_face[*p].unwrap_or(UNBOUNDED_FACE))
            .unwrap_or(UNBOUNDED_FACE);
        cycle_face[c] = Some(container);
        if container != UNBOUNDED_FACE {
            faces[container].holes.push(c);
        }
    }

    let mut face_half_edges: Vec<Vec<usize>> = vec![Vec::new(); faces.len()];
    let mut half_face: Vec<Option<usize>> = vec![None; he.len()];
    for (c, cycle) in cycles.iter().enumerate() {
        if let Some(face) = cycle_face[c] {
            for &h in &cycle.half_edges {
                half_face[h] = Some(face);
                face_half_edges[face].push(h);
            }
        }
    }

    // w(left of h) = w(right of h) + count(h)
    let mut winding: Vec<Option<i32>> = vec![None; faces.len()];
    winding[UNBOUNDED_FACE] = Some(0);
    let mut queue = VecDeque::from([UNBOUNDED_FACE]);
    while let Some(face) = queue.pop_front() {
        let w = winding[face].unwrap_or(0);
        for &h in &face_half_edges[face] {
            if let Some(other) = half_face[h ^ 1] {
                if winding[other].is_none() {
                    winding[other] = Some(w - he.count[h]);
                    queue.push_back(other);
                }
            }
        }
    }

    let mut triangles = Vec::new();
    for (f, face) in faces.iter().enumerate().skip(1) {
        let winding = winding[f].unwrap_or_else(|| {
            tracing::warn!("Face {} is unreachable from the unbounded face", f);
            0
        });

        // Cycles touching themselves are split into simple rings first.
        let mut outers: Vec<(f64, Vec<u32>)> = Vec::new();
        let mut holes: Vec<Vec<u32>> = Vec::new();
        for c in std::iter::once(face.outer).chain(face.holes.iter().copied()) {
            let ring: Vec<u32> = cycles[c].half_edges.iter().map(|&h| he.from[h]).collect();
            for simple in simple_rings(&ring) {
                let area = signed_area(&arr.positions, &simple);
                if area > zero_area {
                    outers.push((area, simple));
                } else if area < -zero_area {
                    holes.push(simple);
                }
            }
        }
        if outers.is_empty() {
            tracing::trace!("Face {} has no area", f);
            continue;
        }

        let mut assigned: Vec<Vec<Vec<u32>>> = vec![Vec::new(); outers.len()];
        for hole in holes {
            let k = containing_ring(&arr.positions, &outers, &hole);
            assigned[k].push(hole);
        }
        for ((_, outer), holes) in outers.iter().zip(&assigned) {
            triangles.extend(
                ear_clip::triangulate_face(&arr.positions, outer, holes)
                    .into_iter()
                    .map(|vertices| WoundTriangle { vertices, winding }),
            );
        }
    }

    tracing::trace!(
        "Traced {} cycles into {} faces, {} triangles",
        cycles.len(),
        faces.len(),
        triangles.len()
    );
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_contains() {
        let square = [
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.0),
        ];
        assert!(polygon_contains(&square, DVec2::new(0.5, 0.5)));
        assert!(!polygon_contains(&square, DVec2::new(1.5, 0.5)));
    }

    #[test]
    fn test_disjoint_set() {
        let mut set = DisjointSet::new(4);
        set.union(0, 1);
        set.union(2, 3);
        assert_eq!(set.find(0), set.find(1));
        assert_ne!(set.find(1), set.find(2));
    }

    #[test]
    fn test_pinched_walk_splits_into_rings() {
        // Two loops through vertex 0, then a two-vertex spur at 4.
        let rings = simple_rings(&[0, 1, 2, 0, 3, 4, 5, 4]);
        assert_eq!(rings, vec![vec![0, 1, 2], vec![0, 3, 4]]);
    }

    #[test]
    fn test_signed_area_follows_orientation() {
        let positions = [DVec2::ZERO, DVec2::X, DVec2::ONE, DVec2::Y];
        assert_eq!(signed_area(&positions, &[0, 1, 2, 3]), 1.0);
        assert_eq!(signed_area(&positions, &[0, 3, 2, 1]), -1.0);
    }
}
