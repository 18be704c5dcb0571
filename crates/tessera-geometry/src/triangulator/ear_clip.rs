//! Ear clipping of a face with holes.
//!
//! Holes are joined to the outer boundary first, producing a single weakly
//! simple polygon in which joining vertices appear more than once. A hole that
//! already shares a vertex with the boundary is spliced in at that vertex;
//! any other hole is bridged from its rightmost vertex. Every vertex of the
//! input survives in the output triangles unless it is a collinear vertex
//! that blocks clipping, so neighbouring faces stay conforming along their
//! shared edges.

use glam::DVec2;
use tessera_core::alloc::HashSet;

/// Relative cross product below which a corner counts as collinear.
const FLAT_TOLERANCE: f64 = 1e-12;

fn cross(o: DVec2, a: DVec2, b: DVec2) -> f64 {
    (a - o).perp_dot(b - o)
}

/// Triangulate a counter-clockwise `outer` boundary with clockwise `holes`.
///
/// Every ring must be simple on its own; rings may touch at shared vertices.
/// Returned triangles are counter-clockwise and index into `positions`.
pub(super) fn triangulate_face(positions: &[DVec2], outer: &[u32], holes: &[Vec<u32>]) -> Vec<[u32; 3]> {
    let polygon = join_holes(positions, outer.to_vec(), holes);
    clip(positions, polygon)
}

fn rightmost(positions: &[DVec2], ring: &[u32]) -> usize {
    ring.iter()
        .enumerate()
        .max_by(|a, b| positions[*a.1 as usize].x.total_cmp(&positions[*b.1 as usize].x))
        .map_or(0, |(i, _)| i)
}

fn join_holes(positions: &[DVec2], mut polygon: Vec<u32>, holes: &[Vec<u32>]) -> Vec<u32> {
    let mut pending: Vec<&[u32]> = holes
        .iter()
        .filter(|h| h.len() >= 3)
        .map(Vec::as_slice)
        .collect();

    while !pending.is_empty() {
        let on_polygon: HashSet<u32> = polygon.iter().copied().collect();
        let touching = pending.iter().enumerate().find_map(|(k, hole)| {
            hole.iter()
                .position(|id| on_polygon.contains(id))
                .map(|j| (k, j))
        });
        polygon = match touching {
            Some((k, j)) => {
                let hole = pending.swap_remove(k);
                splice(positions, &polygon, hole, j)
            }
            None => {
                let right_x = |hole: &[u32]| positions[hole[rightmost(positions, hole)] as usize].x;
                let k = (0..pending.len())
                    .max_by(|&a, &b| right_x(pending[a]).total_cmp(&right_x(pending[b])))
                    .unwrap_or(0);
                let hole = pending.swap_remove(k);
                bridge(positions, &polygon, hole, &pending)
            }
        };
    }
    polygon
}

/// Insert `hole` at the polygon vertex it shares with `hole[j]`.
fn splice(positions: &[DVec2], polygon: &[u32], hole: &[u32], j: usize) -> Vec<u32> {
    let pos = |id: u32| positions[id as usize];
    let shared = hole[j];
    let k = hole.len();
    let neighbors = [pos(hole[(j + 1) % k]), pos(hole[(j + k - 1) % k])];

    // The shared vertex may occur several times; pick the occurrence whose
    // interior wedge holds the hole.
    let n = polygon.len();
    let at = (0..n)
        .filter(|&i| polygon[i] == shared)
        .max_by_key(|&i| {
            let prev = pos(polygon[(i + n - 1) % n]);
            let next = pos(polygon[(i + 1) % n]);
            neighbors
                .iter()
                .filter(|&&target| locally_inside(prev, pos(shared), next, target))
                .count()
        })
        .unwrap_or(0);

    let mut merged = Vec::with_capacity(n + k);
    merged.extend_from_slice(&polygon[..=at]);
    merged.extend_from_slice(&hole[j + 1..]);
    merged.extend_from_slice(&hole[..=j]);
    merged.extend_from_slice(&polygon[at + 1..]);
    merged
}

/// Connect `hole` to the polygon with a two-way bridge from its rightmost
/// vertex.
fn bridge(positions: &[DVec2], polygon: &[u32], hole: &[u32], others: &[&[u32]]) -> Vec<u32> {
    let pos = |id: u32| positions[id as usize];
    let m = rightmost(positions, hole);
    let m_id = hole[m];
    let m_pos = pos(m_id);

    let mut candidates: Vec<usize> = (0..polygon.len()).collect();
    candidates.sort_by(|&a, &b| {
        pos(polygon[a])
            .distance_squared(m_pos)
            .total_cmp(&pos(polygon[b]).distance_squared(m_pos))
    });

    let n = polygon.len();
    let rings: Vec<&[u32]> = std::iter::once(polygon)
        .chain(std::iter::once(hole))
        .chain(others.iter().copied())
        .collect();
    let unblocked = |c: usize| !blocked(positions, &rings, polygon[c], m_id);
    let visible = candidates
        .iter()
        .copied()
        .find(|&c| {
            let prev = pos(polygon[(c + n - 1) % n]);
            let next = pos(polygon[(c + 1) % n]);
            locally_inside(prev, pos(polygon[c]), next, m_pos) && unblocked(c)
        })
        .or_else(|| candidates.iter().copied().find(|&c| unblocked(c)));
    let bridge = match visible {
        Some(c) => c,
        None => {
            tracing::warn!("No visible bridge for hole at {:?}, using nearest vertex", m_pos);
            candidates[0]
        }
    };

    let mut merged = Vec::with_capacity(n + hole.len() + 2);
    merged.extend_from_slice(&polygon[..=bridge]);
    merged.extend_from_slice(&hole[m..]);
    merged.extend_from_slice(&hole[..m]);
    merged.push(m_id);
    merged.push(polygon[bridge]);
    merged.extend_from_slice(&polygon[bridge + 1..]);
    merged
}

/// True if the direction from `p` to `target` enters the polygon interior at
/// vertex `p`.
fn locally_inside(prev: DVec2, p: DVec2, next: DVec2, target: DVec2) -> bool {
    if cross(prev, p, next) >= 0.0 {
        cross(prev, p, target) > 0.0 && cross(p, next, target) > 0.0
    } else {
        cross(prev, p, target) > 0.0 || cross(p, next, target) > 0.0
    }
}

/// True if the bridge `a → b` crosses or touches any ring edge.
fn blocked(positions: &[DVec2], rings: &[&[u32]], a: u32, b: u32) -> bool {
    let pa = positions[a as usize];
    let pb = positions[b as usize];
    for ring in rings {
        let n = ring.len();
        for i in 0..n {
            let (u, v) = (ring[i], ring[(i + 1) % n]);
            if u == a || u == b || v == a || v == b {
                continue;
            }
            let (pu, pv) = (positions[u as usize], positions[v as usize]);
            let o1 = cross(pa, pb, pu);
            let o2 = cross(pa, pb, pv);
            let o3 = cross(pu, pv, pa);
            let o4 = cross(pu, pv, pb);
            if o1 * o2 < 0.0 && o3 * o4 < 0.0 {
                return true;
            }
            if o1 == 0.0 && on_segment(pa, pb, pu) {
                return true;
            }
        }
    }
    false
}

fn on_segment(a: DVec2, b: DVec2, p: DVec2) -> bool {
    let d = b - a;
    let t = (p - a).dot(d);
    t > 0.0 && t < d.length_squared()
}

fn is_ear(positions: &[DVec2], ring: &[u32], i: usize) -> bool {
    let n = ring.len();
    let ids = [ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]];
    let [a, b, c] = ids.map(|id| positions[id as usize]);
    if cross(a, b, c) <= 0.0 {
        return false;
    }
    ring.iter().enumerate().all(|(k, &id)| {
        if id == ids[1] && k != i {
            // Another occurrence of the tip must not send an edge into the ear.
            let inward = |x: u32| {
                let p = positions[x as usize];
                cross(a, b, p) > 0.0 && cross(b, c, p) > 0.0
            };
            return !inward(ring[(k + n - 1) % n]) && !inward(ring[(k + 1) % n]);
        }
        if ids.contains(&id) {
            return true;
        }
        let p = positions[id as usize];
        !(cross(a, b, p) >= 0.0 && cross(b, c, p) >= 0.0 && cross(c, a, p) >= 0.0)
    })
}

/// Drop consecutive repeats and zero-width spikes `a → b → a`.
fn tidy_ring(ring: &mut Vec<u32>) {
    loop {
        ring.dedup();
        while ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        let n = ring.len();
        if n < 3 {
            return;
        }
        match (0..n).find(|&k| ring[(k + n - 1) % n] == ring[(k + 1) % n]) {
            Some(k) => {
                ring.remove(k);
            }
            None => return,
        }
    }
}

/// A vertex whose removal leaves the enclosed area unchanged: its corner is
/// collinear, or it is the tip of a zero-width spike.
fn flattest_vertex(positions: &[DVec2], ring: &[u32]) -> Option<usize> {
    let n = ring.len();
    (0..n)
        .filter_map(|i| {
            let [a, b, c] = [ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]]
                .map(|id| positions[id as usize]);
            let scale = (b - a).length() * (c - b).length();
            let flatness = cross(a, b, c).abs();
            (flatness <= scale * FLAT_TOLERANCE).then_some((i, flatness))
        })
        .min_by(|x, y| x.1.total_cmp(&y.1))
        .map(|(i, _)| i)
}

fn clip(positions: &[DVec2], mut ring: Vec<u32>) -> Vec<[u32; 3]> {
    tidy_ring(&mut ring);
    let mut triangles = Vec::with_capacity(ring.len().saturating_sub(2));
    let mut i = 0;
    let mut stalled = 0;

    while ring.len() > 3 {
        let n = ring.len();
        if is_ear(positions, &ring, i) {
            triangles.push([ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]]);
            ring.remove(i);
            tidy_ring(&mut ring);
            let last = ring.len().saturating_sub(1);
            i = if i == 0 { last } else { (i - 1).min(last) };
            stalled = 0;
            continue;
        }

        i = (i + 1) % n;
        stalled += 1;
        if stalled >= n {
            let Some(k) = flattest_vertex(positions, &ring) else {
                tracing::warn!(
                    "Ear clipping stalled with {} vertices left, leaving them untriangulated",
                    n
                );
                return triangles;
            };
            tracing::trace!("Dropping collinear vertex {} to unblock ear clipping", ring[k]);
            ring.remove(k);
            tidy_ring(&mut ring);
            i = 0;
            stalled = 0;
        }
    }

    if let &[a, b, c] = ring.as_slice() {
        if cross(positions[a as usize], positions[b as usize], positions[c as usize]) > 0.0 {
            triangles.push([a, b, c]);
        }
    }
    triangles
}
